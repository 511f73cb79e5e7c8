use std::{
    fs,
    io::{prelude::*, BufReader, Cursor, SeekFrom},
    path::Path,
};

use crate::{error::Error, Result};

/// A wrapper around `BufReader<R>` which keeps track of the current offset and the total size of
/// the underlying data. The size is captured once and never refreshed.
#[derive(Debug)]
pub struct Source<R: Read + Seek> {
    reader: BufReader<R>,
    size: u64,
    curr_pos: u64,
}

impl<R: Read + Seek> Source<R> {
    /// Creates a new `Source` from a reader positioned at its start and the total amount of bytes
    /// it holds.
    #[inline]
    pub fn new(reader: R, size: u64) -> Source<R> {
        Self {
            reader: BufReader::new(reader),
            size,
            curr_pos: 0,
        }
    }

    /// Creates a new `Source` and determines its size by seeking to the end of `reader`.
    pub fn from_reader(mut reader: R) -> Result<Source<R>> {
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self::new(reader, size))
    }

    /// Moves the read position to `offset`.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.curr_pos = self.reader.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Reads from the current position until the end of the line into `buf`, omitting the `\n`
    /// and a `\r` right before it. Returns the amount of bytes consumed, which is 0 only at EOF.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let start = buf.len();
        let n = self.reader.read_until(b'\n', buf)?;
        self.curr_pos += n as u64;

        // Pop last \n if existing
        if buf.len() > start && buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.len() > start && buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        Ok(n)
    }

    /// Consumes everything up to and including the next `\n` without keeping it. Returns the
    /// amount of bytes consumed.
    pub fn skip_line(&mut self) -> Result<usize> {
        let mut skipped = 0;

        loop {
            let (found, used) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    break;
                }

                match available.iter().position(|b| *b == b'\n') {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };

            self.reader.consume(used);
            skipped += used;

            if found {
                break;
            }
        }

        self.curr_pos += skipped as u64;
        Ok(skipped)
    }

    /// Returns `true` if no more bytes can be read from the current position.
    #[inline]
    pub fn at_eof(&mut self) -> Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    /// The current read position
    #[inline(always)]
    pub fn tell(&self) -> u64 {
        self.curr_pos
    }

    /// The size in bytes as it was when the source got created
    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns `true` if the source holds no bytes at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Unwraps the underlying reader. Buffered but unread data is lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl Source<fs::File> {
    /// Opens the file at `path` for reading.
    ///
    /// Returns an error if `path` is empty or the file can't be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Source<fs::File>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("missing filename".to_owned()));
        }

        let file = fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self::new(file, size))
    }
}

impl<T: AsRef<[u8]>> Source<Cursor<T>> {
    /// Creates a `Source` over in-memory data.
    #[inline]
    pub fn from_bytes(data: T) -> Source<Cursor<T>> {
        let size = data.as_ref().len() as u64;
        Self::new(Cursor::new(data), size)
    }
}
