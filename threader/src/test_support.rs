//! Raw OS threads for exercising cancellation.
//!
//! Targets are started directly with `pthread_create`/`CreateThread` so that
//! cancelling them never unwinds through the `catch_unwind` wrapper of
//! `std::thread`. Their bodies hold no values with destructors.
//!
//! On Unix, cancellation is delivered as a forced unwind. Every frame between
//! the cancellation point and the thread start must allow unwinding, so
//! bodies are `Body` (`extern "C-unwind"`) and call cancellation points
//! through the `C-unwind` declarations below. A plain `extern "C"` frame on
//! the stack aborts the whole test process instead of stopping the thread.

use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

/// State shared between a test and its target thread.
///
/// Leaked so that a target that is never stopped can't outlive it.
#[derive(Default)]
pub(crate) struct Shared {
    pub counter: AtomicUsize,
    ready: AtomicBool,
    stop: AtomicBool,
    #[cfg(unix)]
    mutex: RawMutex,
    #[cfg(unix)]
    key: AtomicUsize,
    #[cfg(windows)]
    pub lock: std::sync::Mutex<()>,
}

impl Shared {
    pub fn leak() -> &'static Self {
        Box::leak(Box::default())
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn wait_ready(&self, timeout: Duration) -> bool {
        wait_until(timeout, || self.ready.load(Ordering::SeqCst))
    }

    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

pub(crate) fn wait_until(timeout: Duration, f: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while !f() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    true
}

#[cfg(unix)]
pub(crate) use self::unix::*;

#[cfg(unix)]
mod unix {
    use super::*;
    use core::{cell::UnsafeCell, mem::MaybeUninit, ptr};
    use libc::{c_int, c_uint, c_void};

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    pub(crate) const PTHREAD_CANCELED: usize = 1;
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    pub(crate) const PTHREAD_CANCELED: usize = usize::MAX;

    #[cfg(target_os = "linux")]
    pub(crate) const PTHREAD_CANCEL_ENABLE: c_int = 0;
    #[cfg(target_os = "linux")]
    pub(crate) const PTHREAD_CANCEL_DISABLE: c_int = 1;

    #[cfg(target_os = "linux")]
    unsafe extern "C" {
        pub(crate) fn pthread_setcancelstate(state: c_int, old: *mut c_int) -> c_int;
    }

    // Cancellation points; they unwind when the calling thread is cancelled
    unsafe extern "C-unwind" {
        pub(crate) fn pause() -> c_int;
        pub(crate) fn usleep(usec: c_uint) -> c_int;
        pub(crate) fn pthread_testcancel();
    }

    /// The body of a cancellable target.
    pub(crate) type Body = extern "C-unwind" fn(*mut c_void) -> *mut c_void;

    pub(crate) struct RawMutex(UnsafeCell<libc::pthread_mutex_t>);

    impl Default for RawMutex {
        fn default() -> Self {
            Self(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER))
        }
    }

    // The cell is only ever handed to pthread_mutex_* as a raw pointer
    unsafe impl Sync for RawMutex {}

    impl Shared {
        pub fn mutex(&self) -> *mut libc::pthread_mutex_t {
            self.mutex.0.get()
        }

        pub fn create_key(&self, destructor: unsafe extern "C" fn(*mut c_void)) {
            let mut key = 0;
            assert_eq!(
                unsafe { libc::pthread_key_create(&mut key, Some(destructor)) },
                0
            );
            self.key.store(key as usize, Ordering::SeqCst);
        }

        pub fn key(&self) -> libc::pthread_key_t {
            self.key.load(Ordering::SeqCst) as libc::pthread_key_t
        }

        pub fn delete_key(&self) {
            unsafe { libc::pthread_key_delete(self.key()) };
        }
    }

    pub(crate) fn spawn(body: Body, shared: &'static Shared) -> libc::pthread_t {
        // libc declares the start routine as "C"; the two ABIs only differ in
        // whether unwinding out of the callee is permitted
        let start: extern "C" fn(*mut c_void) -> *mut c_void =
            unsafe { core::mem::transmute(body) };
        let mut thread = MaybeUninit::<libc::pthread_t>::uninit();
        let r = unsafe {
            libc::pthread_create(
                thread.as_mut_ptr(),
                ptr::null(),
                start,
                shared as *const Shared as *mut c_void,
            )
        };
        assert_eq!(r, 0, "pthread_create failed");
        unsafe { thread.assume_init() }
    }

    /// Joins `thread` from a helper, returning its exit value unless it
    /// fails to finish in time.
    pub(crate) fn join_within(thread: libc::pthread_t, timeout: Duration) -> Option<usize> {
        let raw = thread as usize;
        let (tx, rx) = flume::bounded(1);
        std::thread::spawn(move || {
            let mut value = ptr::null_mut();
            let r = unsafe { libc::pthread_join(raw as libc::pthread_t, &mut value) };
            let _ = tx.send((r, value as usize));
        });
        let (r, value) = rx.recv_timeout(timeout).ok()?;
        assert_eq!(r, 0, "pthread_join failed");
        Some(value)
    }
}

#[cfg(windows)]
pub(crate) use self::windows::*;

#[cfg(windows)]
mod windows {
    use super::*;
    use std::os::windows::io::RawHandle;
    use winapi::{
        shared::minwindef::DWORD,
        um::{
            handleapi::CloseHandle,
            minwinbase::STILL_ACTIVE,
            processthreadsapi::{CreateThread, GetExitCodeThread},
            synchapi::WaitForSingleObject,
            winbase::WAIT_OBJECT_0,
            winnt::{HANDLE, PVOID},
        },
    };

    /// An owned Win32 thread handle.
    pub(crate) struct Worker {
        pub handle: RawHandle,
        pub id: u32,
    }

    impl Worker {
        pub fn wait_exit(&self, timeout: Duration) -> bool {
            let millis = timeout.as_millis().try_into().unwrap_or(DWORD::MAX - 1);
            unsafe { WaitForSingleObject(self.handle as HANDLE, millis) == WAIT_OBJECT_0 }
        }

        pub fn exit_code(&self) -> Option<u32> {
            let mut code = 0;
            if unsafe { GetExitCodeThread(self.handle as HANDLE, &mut code) } == 0
                || code == STILL_ACTIVE
            {
                None
            } else {
                Some(code)
            }
        }
    }

    impl Drop for Worker {
        fn drop(&mut self) {
            unsafe { CloseHandle(self.handle as HANDLE) };
        }
    }

    pub(crate) fn spawn(
        body: unsafe extern "system" fn(PVOID) -> DWORD,
        shared: &'static Shared,
    ) -> Worker {
        let mut id = 0;
        let handle = unsafe {
            CreateThread(
                core::ptr::null_mut(),
                0,
                Some(body),
                shared as *const Shared as PVOID,
                0,
                &mut id,
            )
        };
        assert!(!handle.is_null(), "CreateThread failed");
        Worker {
            handle: handle as RawHandle,
            id,
        }
    }
}
