//! Error types for verified boot operations

use core::fmt;

/// Result type for verified boot operations
pub type IoResult<T> = core::result::Result<T, AvbIoError>;

/// Failures an operation can report to the verification engine.
///
/// This set is closed. The engine has its own codes for internal failures,
/// none of which are produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvbIoError {
    /// Device I/O failed, or a request was malformed
    Io,

    /// Allocation failed while preparing the request
    OutOfMemory,

    /// Label did not resolve to a partition
    NoSuchPartition,

    /// Offset or length falls outside the partition
    RangeOutsidePartition,
}

impl fmt::Display for AvbIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::NoSuchPartition => write!(f, "No such partition"),
            Self::RangeOutsidePartition => write!(f, "Range outside partition"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AvbIoError {}

/// Status codes as numbered by the verification engine.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvbIoResult {
    Ok = 0,
    ErrorOom = 1,
    ErrorIo = 2,
    ErrorNoSuchPartition = 3,
    ErrorRangeOutsidePartition = 4,
}

impl AvbIoResult {
    /// Collapse an operation result into its status code
    pub fn from_result<T>(result: &IoResult<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => (*e).into(),
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl From<AvbIoError> for AvbIoResult {
    fn from(err: AvbIoError) -> Self {
        match err {
            AvbIoError::Io => Self::ErrorIo,
            AvbIoError::OutOfMemory => Self::ErrorOom,
            AvbIoError::NoSuchPartition => Self::ErrorNoSuchPartition,
            AvbIoError::RangeOutsidePartition => Self::ErrorRangeOutsidePartition,
        }
    }
}
