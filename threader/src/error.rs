use super::*;

/// Why a request was rejected.
///
/// None of these are fatal to the caller; they are always handed back inside
/// [`CancellationResult::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid or stale thread handle: {}", os_message(.code))]
    InvalidHandle { code: i32 },

    #[error("Not permitted to cancel thread: {}", os_message(.code))]
    PermissionDenied { code: i32 },

    #[error("Thread cancellation failed: {}", os_message(.code))]
    Os { code: i32 },

    #[error("Thread handle belongs to process {pid}")]
    ForeignProcess { pid: u32 },

    #[error("{api} threads cannot be cancelled this way on this platform")]
    Unsupported { api: Api },

    #[error("Forced thread termination is disabled")]
    ForcedTerminationDisallowed,

    #[error("Refusing to cancel the calling thread")]
    CallingThread,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The handle does not refer to a thread that can be reached.
    InvalidHandle,
    /// The caller lacks the privilege to stop the thread.
    PermissionDenied,
    /// Any other failure reported by the OS.
    Os,
    /// The request was refused before reaching the OS.
    Refused,
}

impl Error {
    /// Classifies a raw error code returned by the platform thread API.
    pub fn from_os_code(code: i32) -> Self {
        match sys::classify(code) {
            ErrorKind::InvalidHandle => Error::InvalidHandle { code },
            ErrorKind::PermissionDenied => Error::PermissionDenied { code },
            _ => Error::Os { code },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHandle { .. } | Error::ForeignProcess { .. } => ErrorKind::InvalidHandle,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::Os { .. } => ErrorKind::Os,
            Error::Unsupported { .. }
            | Error::ForcedTerminationDisallowed
            | Error::CallingThread => ErrorKind::Refused,
        }
    }

    /// The platform diagnostic code, if the OS was consulted.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::InvalidHandle { code }
            | Error::PermissionDenied { code }
            | Error::Os { code } => Some(*code),
            _ => None,
        }
    }
}

fn os_message(code: &i32) -> std::io::Error {
    std::io::Error::from_raw_os_error(*code)
}
