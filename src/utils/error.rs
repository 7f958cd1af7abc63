use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug)]
pub enum RawError {
    IoError(io::Error),
    UnsupportedFormat(String),
    InvalidDimensions { width: u32, height: u32 },
    InvalidLayout(String),
    Custom(String),
}

impl Error for RawError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RawError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for RawError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RawError::IoError(err) => write!(f, "I/O error: {}", err),
            RawError::UnsupportedFormat(format) => write!(f, "Unsupported pixel format: {}", format),
            RawError::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            RawError::InvalidLayout(msg) => write!(f, "Invalid image layout: {}", msg),
            RawError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<io::Error> for RawError {
    fn from(error: io::Error) -> Self {
        RawError::IoError(error)
    }
}

// Result type alias for decode operations
pub type RawResult<T> = Result<T, RawError>;
