//! Raw calls into the platform thread API.
//!
//! Every function here reports failure as the platform's raw error code;
//! classification into [`Error`](crate::Error) happens in the callers.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::*;

#[cfg(not(any(unix, windows)))]
compile_error!("No thread cancellation facility is known for the target platform");
