//! C ABI for requesting thread cancellation from an embedding runtime.
//!
//! The host passes the thread identifier it already has: a `pthread_t` on
//! Unix, or a thread id on Windows. Settings are read once, on first use, from
//! the file named by `THREADER_CONFIG_FILE` and from `THREADER_*` environment
//! variables.

use std::{
    ffi::{c_int, c_ulong},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::OnceLock,
};
use threader::{CancellationResult, CancellationService, Semantics, ThreadHandle};
use tracing::error;

pub mod settings;

/// Outcome of a request, as seen across the C boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreaderStatus {
    Rejected = 0,
    Accepted = 1,
}

struct State {
    service: CancellationService,
    configured: bool,
}

static STATE: OnceLock<State> = OnceLock::new();

fn state() -> &'static State {
    STATE.get_or_init(|| {
        match settings::load().and_then(|s| settings::init_logger(&s).map(|()| s)) {
            Ok(settings) => State {
                service: CancellationService::new(settings.cancellation()),
                configured: true,
            },
            Err(e) => {
                error!("Invalid threader settings, using defaults: {e}");
                State {
                    service: CancellationService::new(settings::Settings::default().cancellation()),
                    configured: false,
                }
            }
        }
    })
}

/// Converts a result to its C status, storing the OS code in `os_error`.
///
/// # Safety
///
/// `os_error` must be null or valid for a single `i32` write.
unsafe fn status(result: &CancellationResult, os_error: *mut i32) -> ThreaderStatus {
    if !os_error.is_null() {
        unsafe { os_error.write(result.os_code().unwrap_or(0)) };
    }
    if result.is_accepted() {
        ThreaderStatus::Accepted
    } else {
        ThreaderStatus::Rejected
    }
}

/// Loads settings and installs logging if not done already.
///
/// Returns `0` on success, or `-1` if the settings were invalid and defaults
/// are in use.
#[unsafe(no_mangle)]
pub extern "C" fn threader_init() -> c_int {
    if state().configured { 0 } else { -1 }
}

/// Returns `0` if requests on this platform are cooperative, `1` if they
/// forcibly terminate the target.
#[unsafe(no_mangle)]
pub extern "C" fn threader_semantics() -> c_int {
    match CancellationService::native_semantics() {
        Semantics::Cooperative => 0,
        Semantics::Forced => 1,
    }
}

/// Requests that the thread identified by `ident` stop.
///
/// If `os_error` is not null, the OS diagnostic code of a rejection is written
/// to it, or `0` when there is none.
///
/// # Safety
///
/// `ident` must identify a thread of this process whose state nobody relies
/// upon once it stops; see `threader::CancellationService::request_cancellation`.
/// `os_error` must be null or valid for a single `i32` write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn threader_cancel(ident: usize, os_error: *mut i32) -> ThreaderStatus {
    let handle = ThreadHandle::native(ident);
    match catch_unwind(AssertUnwindSafe(|| unsafe {
        state().service.request_cancellation(&handle)
    })) {
        Ok(result) => unsafe { status(&result, os_error) },
        Err(_) => {
            error!("Panic while cancelling thread {handle}");
            if !os_error.is_null() {
                unsafe { os_error.write(0) };
            }
            ThreaderStatus::Rejected
        }
    }
}

/// The original `killThread` entry point: returns nonzero if the request was
/// accepted, `0` otherwise.
///
/// # Safety
///
/// As for [`threader_cancel`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn threader_kill_thread(ident: c_ulong) -> c_int {
    (unsafe { threader_cancel(ident as usize, std::ptr::null_mut()) }) as c_int
}
