use crate::{Api, ErrorKind};

#[cfg(not(target_os = "android"))]
unsafe extern "C" {
    fn pthread_cancel(thread: libc::pthread_t) -> libc::c_int;
}

// Bionic never implemented pthread cancellation
pub(crate) const PTHREAD_CANCEL_AVAILABLE: bool = cfg!(not(target_os = "android"));

pub(crate) fn current() -> (Api, usize) {
    (Api::Pthread, unsafe { libc::pthread_self() } as usize)
}

pub(crate) fn is_current(api: Api, raw: usize) -> bool {
    api == Api::Pthread && current().1 == raw
}

/// Marks `raw` for cancellation at its next cancellation point.
///
/// # Safety
///
/// The target unwinds when it acts on the request. It must not be running
/// Rust frames that own destructors or sit under `catch_unwind` at that point.
#[cfg(not(target_os = "android"))]
pub(crate) unsafe fn cancel(raw: usize) -> Result<(), i32> {
    match unsafe { pthread_cancel(raw as libc::pthread_t) } {
        0 => Ok(()),
        code => Err(code),
    }
}

pub(crate) fn classify(code: i32) -> ErrorKind {
    match code {
        libc::ESRCH => ErrorKind::InvalidHandle,
        libc::EPERM | libc::EACCES => ErrorKind::PermissionDenied,
        _ => ErrorKind::Os,
    }
}
