use std::{fmt::Display, string::FromUtf8Error};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Missing path, unknown algorithm name or a count that isn't a non-negative integer
    InvalidArgument(String),
    /// The source has no bytes to sample from
    EmptyFile,
    UTF8Error,
}

impl Error {
    /// Returns `true` for errors caused by bad input from the caller rather than by the medium.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::EmptyFile)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Self {
        Self::UTF8Error
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::EmptyFile => write!(f, "invalid argument: file is empty"),
            Self::UTF8Error => write!(f, "line is not valid UTF-8"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::EmptyFile.is_invalid_argument());
        assert!(Error::InvalidArgument("x".into()).is_invalid_argument());

        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_invalid_argument());
        assert!(std::error::Error::source(&io).is_some());
        assert_eq!(io.to_string(), "I/O error: gone");
    }
}
