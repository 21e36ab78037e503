use crate::{Api, ErrorKind};
use winapi::{
    shared::{
        minwindef::FALSE,
        winerror::{
            ERROR_ACCESS_DENIED, ERROR_INVALID_HANDLE, ERROR_INVALID_PARAMETER, ERROR_NOT_SUPPORTED,
        },
    },
    um::{
        errhandlingapi::GetLastError,
        handleapi::CloseHandle,
        processthreadsapi::{GetCurrentThreadId, GetThreadId, OpenThread, TerminateThread},
        winnt::{HANDLE, THREAD_TERMINATE},
    },
};

pub(crate) const PTHREAD_CANCEL_AVAILABLE: bool = false;

pub(crate) fn current() -> (Api, usize) {
    (Api::Win32ThreadId, unsafe { GetCurrentThreadId() } as usize)
}

pub(crate) fn is_current(api: Api, raw: usize) -> bool {
    let current = unsafe { GetCurrentThreadId() };
    match api {
        Api::Win32ThreadId => raw == current as usize,
        // Returns 0 for handles without query access, which can't be ours
        Api::Win32Handle => {
            let id = unsafe { GetThreadId(raw as HANDLE) };
            id != 0 && id == current
        }
        Api::Pthread => false,
    }
}

/// Halts the thread immediately.
///
/// # Safety
///
/// The target gets no chance to release locks or finish writes to shared
/// state; nothing it touched may be relied upon afterwards.
pub(crate) unsafe fn terminate(api: Api, raw: usize, exit_code: u32) -> Result<(), i32> {
    match api {
        Api::Win32Handle => unsafe { terminate_handle(raw as HANDLE, exit_code) },
        Api::Win32ThreadId => {
            let id = u32::try_from(raw).map_err(|_| ERROR_INVALID_PARAMETER as i32)?;
            let handle = unsafe { OpenThread(THREAD_TERMINATE, FALSE, id) };
            if handle.is_null() {
                return Err(last_error());
            }
            let r = unsafe { terminate_handle(handle, exit_code) };
            unsafe { CloseHandle(handle) };
            r
        }
        Api::Pthread => Err(ERROR_NOT_SUPPORTED as i32),
    }
}

unsafe fn terminate_handle(handle: HANDLE, exit_code: u32) -> Result<(), i32> {
    if unsafe { TerminateThread(handle, exit_code) } != 0 {
        Ok(())
    } else {
        Err(last_error())
    }
}

fn last_error() -> i32 {
    (unsafe { GetLastError() }) as i32
}

pub(crate) fn classify(code: i32) -> ErrorKind {
    match code as u32 {
        ERROR_INVALID_HANDLE | ERROR_INVALID_PARAMETER => ErrorKind::InvalidHandle,
        ERROR_ACCESS_DENIED => ErrorKind::PermissionDenied,
        _ => ErrorKind::Os,
    }
}
