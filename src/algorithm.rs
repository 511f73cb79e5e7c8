use std::{fmt::Display, str::FromStr};

use crate::error::Error;

/// The strategy used to pick lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Seeks to a random byte and returns the line after it. Needs no preprocessing but a line is
    /// picked with a probability proportional to the length of the line before it, the first line
    /// following the last one.
    Fast,
    /// Indexes all lines once and picks each with the same probability.
    Uniform,
}

impl Default for Algorithm {
    #[inline]
    fn default() -> Self {
        Self::Fast
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("fast") {
            Ok(Self::Fast)
        } else if s.eq_ignore_ascii_case("uniform") {
            Ok(Self::Uniform)
        } else {
            Err(Error::InvalidArgument(format!("unknown algorithm '{}'", s)))
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Uniform => write!(f, "uniform"),
        }
    }
}
