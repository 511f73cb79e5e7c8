use std::io::{Read, Seek};

use crate::{error::Error, source::Source, Result};

/// Contains an in-memory line-index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    /// Maps line to seek position in order to seek efficiently. The index within the Vec represents
    /// the line-index in the file
    inner: Vec<u64>,
}

impl Index {
    /// Create a new Index
    pub fn new(line: Vec<u64>) -> Index {
        Self { inner: line }
    }

    /// Build a new index for text within `source` by reading it once from the beginning. A last
    /// line without trailing `\n` gets an entry as well. The source is left at offset 0.
    pub fn build<R: Read + Seek>(source: &mut Source<R>) -> Result<Self> {
        source.seek(0)?;

        let mut line_index: Vec<u64> = Vec::new();

        while !source.at_eof()? {
            line_index.push(source.tell());
            source.skip_line()?;
        }

        source.seek(0)?;

        Ok(Self { inner: line_index })
    }

    /// Get the Index value
    #[inline]
    pub fn get(&self, pos: usize) -> Result<u64> {
        self.inner.get(pos).copied().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "line {} out of bounds for {} lines",
                pos,
                self.inner.len()
            ))
        })
    }

    /// Returns the amount of items of the index. On a properly built index, this represents the
    /// amount of lines in the file.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the index is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The offsets in file order
    #[inline]
    pub fn offsets(&self) -> &[u64] {
        &self.inner
    }
}
