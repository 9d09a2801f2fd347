//! Error types for the crate.

use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// The given character is not a valid symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSymbol(pub char);

impl Display for InvalidSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid symbol: {:?}", self.0)
    }
}

impl std::error::Error for InvalidSymbol {}

/// Invalid data was passed to initialize a matrix or a background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidData;

impl Display for InvalidData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid data")
    }
}

impl std::error::Error for InvalidData {}

/// A user-facing error raised while loading inputs or configuring a scan.
#[derive(Clone, Debug)]
pub enum Error {
    InvalidSymbol(char),
    InvalidData(Option<String>),
    /// A line of a background file could not be parsed.
    Parse {
        line: usize,
        text: String,
    },
    /// A background frequency outside of `(0, 1]`.
    IllegalFrequency {
        letter: char,
        frequency: f64,
    },
    /// A letter that does not belong to the alphabet.
    UnknownLetter {
        line: usize,
        letter: char,
    },
    DuplicateLetter(char),
    MissingLetter(char),
    /// Conflicting or out-of-range options.
    InvalidConfig(String),
    Io(Arc<std::io::Error>),
}

impl From<InvalidSymbol> for Error {
    fn from(error: InvalidSymbol) -> Self {
        Error::InvalidSymbol(error.0)
    }
}

impl From<InvalidData> for Error {
    fn from(_error: InvalidData) -> Self {
        Error::InvalidData(None)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(Arc::new(error))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidSymbol(c) => write!(f, "invalid symbol: {:?}", c),
            Error::InvalidData(None) => f.write_str("invalid data"),
            Error::InvalidData(Some(x)) => write!(f, "invalid data: {}", x),
            Error::Parse { line, text } => {
                write!(f, "failed to parse background on line {}: {:?}", line, text)
            }
            Error::IllegalFrequency { letter, frequency } => write!(
                f,
                "illegal probability for letter {}: {} (expected a value in (0, 1])",
                letter, frequency
            ),
            Error::UnknownLetter { line, letter } => {
                write!(f, "unknown letter {:?} on line {}", letter, line)
            }
            Error::DuplicateLetter(c) => write!(f, "letter {} given more than once", c),
            Error::MissingLetter(c) => write!(f, "no frequency given for letter {}", c),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
