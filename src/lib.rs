//!A simple library to draw random lines from large files without reading them into memory
//!
//! Two algorithms are available. `Algorithm::Fast` seeks to a random byte and returns the line
//! following it, which favours lines placed after long lines. `Algorithm::Uniform` builds a line
//! index once and picks every line with the same probability.

/// The line selection strategies
pub mod algorithm;
pub mod error;
/// The index of line offsets
pub mod index;
/// The sampler
pub mod sampler;
/// A seekable reader which knows its size and position
pub mod source;

pub use algorithm::Algorithm;
pub use error::Error;
pub use index::Index;
pub use sampler::{parse_count, RandomLine, Samples, Warning};
pub use source::Source;

pub type Result<T> = std::result::Result<T, error::Error>;
