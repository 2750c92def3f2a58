use std::{
    collections::TryReserveError,
    error::Error,
    fmt::{self, Display},
    io,
};

use rayon::ThreadPoolBuildError;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, RpropErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum RpropErr {
    Alloc {
        what: &'static str,
        len: usize,
        source: TryReserveError,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidConfig(String),
    Parse(serde_json::Error),
    Io(io::Error),
    ThreadPool(ThreadPoolBuildError),
}

impl Display for RpropErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc { what, len, source } => {
                write!(f, "failed to allocate {what} for {len} features: {source}")
            }
            Self::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "size mismatch in {what}: got {got} values, expected {expected}"
            ),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::ThreadPool(e) => write!(f, "failed to build the update thread pool: {e}"),
        }
    }
}

impl Error for RpropErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpropErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<io::Error> for RpropErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ThreadPoolBuildError> for RpropErr {
    fn from(value: ThreadPoolBuildError) -> Self {
        Self::ThreadPool(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<RpropErr> for io::Error {
    fn from(value: RpropErr) -> Self {
        match value {
            RpropErr::Io(e) => e,
            RpropErr::Parse(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            RpropErr::InvalidConfig(_) => io::Error::new(io::ErrorKind::InvalidInput, value),
            RpropErr::Alloc { .. } => io::Error::new(io::ErrorKind::OutOfMemory, value),
            other => io::Error::other(other),
        }
    }
}
