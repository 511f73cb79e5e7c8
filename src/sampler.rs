use std::{
    fmt::Display,
    fs,
    io::{Read, Seek},
    path::Path,
};

use rand::{rngs::ThreadRng, Rng};
use tracing::{debug, trace, warn};

use crate::{algorithm::Algorithm, error::Error, index::Index, source::Source, Result};

/// Non-fatal conditions raised while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Zero lines were requested. One line is returned instead.
    ZeroCount,
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCount => write!(f, "requested 0 lines, returning 1"),
        }
    }
}

/// Draws random lines from a seekable source without reading it into memory.
///
/// Lines are drawn with replacement, so a batch may contain the same line more than once. The
/// sampler owns the source and moves its read position on every draw, which is why all drawing
/// methods need `&mut self`.
#[derive(Debug)]
pub struct RandomLine<R: Read + Seek = fs::File, G: Rng = ThreadRng> {
    source: Source<R>,
    algorithm: Algorithm,
    /// Only built for `Algorithm::Uniform`
    index: Option<Index>,
    rng: G,
    warning: Option<Warning>,
}

impl RandomLine<fs::File, ThreadRng> {
    /// Open the file at `path` and sample it using the thread local random number generator.
    ///
    /// Returns an error if the path is empty, the file can't be read or holds no bytes.
    pub fn open<P: AsRef<Path>>(path: P, algorithm: Algorithm) -> Result<Self> {
        Self::open_with_rng(path, algorithm, rand::thread_rng())
    }
}

impl<G: Rng> RandomLine<fs::File, G> {
    /// Open the file at `path` and sample it using `rng`.
    pub fn open_with_rng<P: AsRef<Path>>(path: P, algorithm: Algorithm, rng: G) -> Result<Self> {
        Self::new(Source::open(path)?, algorithm, rng)
    }
}

impl<R: Read + Seek, G: Rng> RandomLine<R, G> {
    /// Create a new sampler over `source`. For `Algorithm::Uniform` the whole source gets indexed
    /// right away.
    ///
    /// Returns `Error::EmptyFile` if the source holds no bytes.
    pub fn new(mut source: Source<R>, algorithm: Algorithm, rng: G) -> Result<Self> {
        if source.is_empty() {
            return Err(Error::EmptyFile);
        }

        let index = match algorithm {
            Algorithm::Fast => None,
            Algorithm::Uniform => {
                let index = Index::build(&mut source)?;
                // The size is only a snapshot, the data itself might be gone by now
                if index.is_empty() {
                    return Err(Error::EmptyFile);
                }
                debug!(lines = index.len(), bytes = source.size(), "built line index");
                Some(index)
            }
        };

        Ok(Self {
            source,
            algorithm,
            index,
            rng,
            warning: None,
        })
    }

    /// Create a new sampler from a plain reader. The size is determined by seeking to its end.
    pub fn from_reader(reader: R, algorithm: Algorithm, rng: G) -> Result<Self> {
        Self::new(Source::from_reader(reader)?, algorithm, rng)
    }

    /// Draws a single line, omitting its line delimiter.
    pub fn next_line(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_random_line(&mut buf)?;
        Ok(buf)
    }

    /// Draws `count` lines with replacement, in the order they were drawn. A `count` of 0 is
    /// treated as 1 and raises `Warning::ZeroCount`.
    ///
    /// Returns an error without any lines if a single draw fails.
    pub fn next_n(&mut self, count: usize) -> Result<Vec<Vec<u8>>> {
        let count = self.check_count(count);
        (0..count).map(|_| self.next_line()).collect()
    }

    /// Like `next_line` but decodes the line as UTF-8.
    pub fn next_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.next_line()?)?)
    }

    /// Like `next_n` but decodes every line as UTF-8.
    pub fn next_n_strings(&mut self, count: usize) -> Result<Vec<String>> {
        let count = self.check_count(count);
        (0..count).map(|_| self.next_string()).collect()
    }

    /// Returns an endless iterator of random lines.
    #[inline]
    pub fn iter(&mut self) -> Samples<'_, R, G> {
        Samples { sampler: self }
    }

    /// Returns and clears the last warning raised by this sampler.
    #[inline]
    pub fn take_warning(&mut self) -> Option<Warning> {
        self.warning.take()
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The amount of lines. Only known for `Algorithm::Uniform`.
    #[inline]
    pub fn line_count(&self) -> Option<usize> {
        self.index.as_ref().map(|i| i.len())
    }

    #[inline]
    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// The size in bytes of the source at the time the sampler got created.
    #[inline]
    pub fn size(&self) -> u64 {
        self.source.size()
    }

    /// Consumes the sampler and returns the source.
    pub fn into_source(self) -> Source<R> {
        self.source
    }

    fn check_count(&mut self, count: usize) -> usize {
        if count > 0 {
            return count;
        }

        warn!("{}", Warning::ZeroCount);
        self.warning = Some(Warning::ZeroCount);
        1
    }

    fn read_random_line(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        match self.algorithm {
            Algorithm::Fast => self.read_fast(buf),
            Algorithm::Uniform => self.read_uniform(buf),
        }
    }

    /// Seeks to a random byte, throws away the rest of the line found there and reads the next
    /// one. If the skipped line was the last one, the first line is read instead.
    fn read_fast(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        let offset = self.rng.gen_range(0..self.source.size());
        trace!(offset, "fast draw");

        self.source.seek(offset)?;
        self.source.skip_line()?;

        if self.source.at_eof()? {
            self.source.seek(0)?;
        }

        self.source.read_line(buf)?;
        Ok(())
    }

    fn read_uniform(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        // Always set for Algorithm::Uniform
        let index = match self.index.as_ref() {
            Some(index) => index,
            None => return Err(Error::InvalidArgument("missing line index".to_owned())),
        };

        let line = self.rng.gen_range(0..index.len());
        let offset = index.get(line)?;
        trace!(line, offset, "uniform draw");

        self.source.seek(offset)?;
        self.source.read_line(buf)?;
        Ok(())
    }
}

/// Endless iterator over random lines, created by `RandomLine::iter`.
pub struct Samples<'a, R: Read + Seek, G: Rng> {
    sampler: &'a mut RandomLine<R, G>,
}

impl<'a, R: Read + Seek, G: Rng> Iterator for Samples<'a, R, G> {
    type Item = Result<Vec<u8>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sampler.next_line())
    }
}

/// Parses a textual line count. Negative and non-integer values are rejected.
pub fn parse_count(s: &str) -> Result<usize> {
    let s = s.trim();

    s.parse::<usize>().map_err(|_| {
        if s.parse::<i64>().is_ok() {
            Error::InvalidArgument(format!("count must not be negative, got {}", s))
        } else {
            Error::InvalidArgument(format!("count must be an integer, got '{}'", s))
        }
    })
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        io::{self, Cursor, SeekFrom},
    };

    use itertools::Itertools;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const GREEK: &str = "alpha\nbeta\ngamma\n";

    fn sampler(
        data: &'static str,
        algorithm: Algorithm,
    ) -> RandomLine<Cursor<&'static str>, StdRng> {
        RandomLine::new(
            Source::from_bytes(data),
            algorithm,
            StdRng::seed_from_u64(0x5eed),
        )
        .unwrap()
    }

    fn counts<R: Read + Seek, G: Rng>(
        sampler: &mut RandomLine<R, G>,
        draws: usize,
    ) -> HashMap<String, usize> {
        sampler
            .next_n_strings(draws)
            .unwrap()
            .into_iter()
            .counts()
    }

    #[test]
    fn test_uniform_frequencies() {
        let mut sampler = sampler(GREEK, Algorithm::Uniform);
        assert_eq!(sampler.line_count(), Some(3));

        let counts = counts(&mut sampler, 3000);
        assert_eq!(counts.len(), 3);

        for line in &["alpha", "beta", "gamma"] {
            let n = counts[*line];
            assert!((900..=1100).contains(&n), "{} drawn {} times", line, n);
        }
    }

    #[test]
    fn test_uniform_skewed_lengths() {
        // Line length must not matter in uniform mode
        let data = "a\nbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\nc\n";
        let mut sampler = sampler(data, Algorithm::Uniform);
        let counts = counts(&mut sampler, 6000);

        for n in counts.values() {
            assert!((1800..=2200).contains(n), "{:?}", counts);
        }
    }

    #[test]
    fn test_fast_bias() {
        // "a\n" is 2 bytes and "bbbbbbbbb\n" 10 bytes. Landing anywhere in a line returns the
        // following one, so "a" (after the wrap around) gets 10/12 of all draws.
        let mut sampler = sampler("a\nbbbbbbbbb\n", Algorithm::Fast);
        assert_eq!(sampler.line_count(), None);

        let counts = counts(&mut sampler, 12000);
        let a = counts["a"];
        let b = counts["bbbbbbbbb"];

        assert_eq!(a + b, 12000);
        assert!((9700..=10300).contains(&a), "{:?}", counts);
        assert!((1700..=2300).contains(&b), "{:?}", counts);
    }

    #[test]
    fn test_fast_reaches_every_line() {
        let mut sampler = sampler(GREEK, Algorithm::Fast);
        let counts = counts(&mut sampler, 3000);
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|n| *n > 0));
    }

    #[test]
    fn test_single_line() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            for data in &["onlyline", "onlyline\n", "onlyline\r\n"] {
                let mut sampler = sampler(*data, *algo);
                for _ in 0..50 {
                    assert_eq!(sampler.next_line().unwrap(), b"onlyline");
                }
            }
        }
    }

    #[test]
    fn test_no_trailing_new_line() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            let mut sampler = sampler("alpha\nbeta\ngamma", *algo);
            let counts = counts(&mut sampler, 600);
            assert_eq!(
                counts.keys().sorted().collect::<Vec<_>>(),
                vec!["alpha", "beta", "gamma"]
            );
        }
    }

    #[test]
    fn test_count() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            let mut sampler = sampler(GREEK, *algo);

            let lines = sampler.next_n(3).unwrap();
            assert_eq!(lines.len(), 3);
            for line in &lines {
                assert!(GREEK.lines().any(|l| l.as_bytes() == line.as_slice()));
            }
            assert_eq!(sampler.take_warning(), None);
        }
    }

    #[test]
    fn test_with_replacement() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            let mut sampler = sampler(GREEK, *algo);
            let lines = sampler.next_n(10).unwrap();
            // More draws than lines
            let unique: HashSet<_> = lines.iter().collect();
            assert!(unique.len() < lines.len());
        }
    }

    #[test]
    fn test_zero_count() {
        let mut sampler = sampler(GREEK, Algorithm::Uniform);

        let lines = sampler.next_n(0).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(sampler.take_warning(), Some(Warning::ZeroCount));
        assert_eq!(sampler.take_warning(), None);

        assert_eq!(sampler.next_n_strings(0).unwrap().len(), 1);
        assert_eq!(sampler.take_warning(), Some(Warning::ZeroCount));
    }

    #[test]
    fn test_empty() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            let res = RandomLine::new(Source::from_bytes(""), *algo, StdRng::seed_from_u64(1));
            assert!(matches!(res, Err(Error::EmptyFile)));
        }
    }

    #[test]
    fn test_stale_size() {
        // A size claiming data which isn't there
        let source = Source::new(Cursor::new(Vec::new()), 10);
        let res = RandomLine::new(source, Algorithm::Uniform, StdRng::seed_from_u64(1));
        assert!(matches!(res, Err(Error::EmptyFile)));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        for algo in &[Algorithm::Fast, Algorithm::Uniform] {
            let mut a = sampler(GREEK, *algo);
            let mut b = sampler(GREEK, *algo);
            assert_eq!(a.next_n(20).unwrap(), b.next_n(20).unwrap());
        }
    }

    #[test]
    fn test_iter() {
        let mut sampler = sampler(GREEK, Algorithm::Fast);
        let lines: Vec<_> = sampler.iter().take(5).collect::<Result<_>>().unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_invalid_utf8() {
        let source = Source::from_bytes(vec![0xff, 0xfe, b'\n']);
        let mut sampler =
            RandomLine::new(source, Algorithm::Uniform, StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(sampler.next_string(), Err(Error::UTF8Error)));
        assert_eq!(sampler.next_line().unwrap(), vec![0xff, 0xfe]);
    }

    /// A reader which fails once it has been read from `reads_left` times
    struct FailingReader {
        inner: Cursor<Vec<u8>>,
        reads_left: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reads_left == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "medium gone"));
            }
            self.reads_left -= 1;
            self.inner.read(buf)
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_read_error_aborts_batch() {
        let reader = FailingReader {
            inner: Cursor::new(GREEK.as_bytes().to_vec()),
            reads_left: 3,
        };

        let mut sampler =
            RandomLine::from_reader(reader, Algorithm::Fast, StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(sampler.next_n(100), Err(Error::Io(_))));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3").unwrap(), 3);
        assert_eq!(parse_count(" 0 ").unwrap(), 0);
        assert!(matches!(parse_count("-1"), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_count("1.5"), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_count("many"), Err(Error::InvalidArgument(_))));
    }
}
