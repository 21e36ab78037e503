//! Typed references to OS threads.
//!
//! A [`ThreadHandle`] never owns the thread it names. It records which
//! facility the raw value came from and which process created it, so that a
//! value cannot silently be used against the wrong API or the wrong process.

use super::*;
use core::fmt;

/// The facility a [`ThreadHandle`] value was obtained from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Api {
    /// A POSIX `pthread_t`.
    Pthread,
    /// A Win32 thread `HANDLE`, borrowed from whoever opened it.
    Win32Handle,
    /// A Win32 thread id, as returned by `GetCurrentThreadId`.
    Win32ThreadId,
}

impl Api {
    /// The API that a host runtime's native thread identifier belongs to.
    ///
    /// On Windows runtimes identify threads by id, everywhere else by `pthread_t`.
    pub const fn native() -> Self {
        if cfg!(windows) {
            Api::Win32ThreadId
        } else {
            Api::Pthread
        }
    }

    /// The guarantee a request made through this API carries.
    pub const fn semantics(self) -> Semantics {
        match self {
            Api::Pthread => Semantics::Cooperative,
            Api::Win32Handle | Api::Win32ThreadId => Semantics::Forced,
        }
    }

    /// Returns `true` if requests through this API can be issued on the
    /// current platform.
    pub const fn is_available(self) -> bool {
        match self {
            Api::Pthread => sys::PTHREAD_CANCEL_AVAILABLE,
            Api::Win32Handle | Api::Win32ThreadId => cfg!(windows),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Api::Pthread => "pthread",
            Api::Win32Handle => "Win32 handle",
            Api::Win32ThreadId => "Win32 thread id",
        })
    }
}

/// What an accepted request actually promises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Semantics {
    /// The target is marked for cancellation and stops at its next
    /// cancellation point, if it ever reaches one.
    Cooperative,
    /// The target is halted immediately without running any cleanup.
    Forced,
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Semantics::Cooperative => "cooperative",
            Semantics::Forced => "forced",
        })
    }
}

/// An opaque, non-owning reference to an OS thread.
///
/// The referenced thread may have exited by the time the handle is used;
/// nothing here keeps it alive or checks that it still exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreadHandle {
    api: Api,
    raw: usize,
    pid: u32,
}

impl ThreadHandle {
    /// Reassembles a handle from its parts.
    ///
    /// Use this for handles that have crossed a process or serialization
    /// boundary. A `pid` other than the current process makes every request
    /// through the handle fail with [`Error::ForeignProcess`].
    pub const fn from_raw_parts(api: Api, raw: usize, pid: u32) -> Self {
        Self { api, raw, pid }
    }

    /// Wraps the thread identifier a host runtime reports for the current
    /// platform, e.g. a `pthread_t` on Unix or a thread id on Windows.
    pub fn native(ident: usize) -> Self {
        Self::from_raw_parts(Api::native(), ident, std::process::id())
    }

    /// A handle to the calling thread.
    pub fn current() -> Self {
        let (api, raw) = sys::current();
        Self::from_raw_parts(api, raw, std::process::id())
    }

    #[cfg(unix)]
    pub fn from_pthread(thread: libc::pthread_t) -> Self {
        Self::from_raw_parts(Api::Pthread, thread as usize, std::process::id())
    }

    /// Borrows a Win32 thread `HANDLE`.
    ///
    /// The handle must stay open for as long as requests are made through it.
    #[cfg(windows)]
    pub fn from_raw_handle(handle: std::os::windows::io::RawHandle) -> Self {
        Self::from_raw_parts(Api::Win32Handle, handle as usize, std::process::id())
    }

    #[cfg(windows)]
    pub fn from_thread_id(id: u32) -> Self {
        Self::from_raw_parts(Api::Win32ThreadId, id as usize, std::process::id())
    }

    /// References the OS thread behind a [`std::thread::JoinHandle`].
    ///
    /// The `JoinHandle` keeps ownership; joining it after a successful
    /// request is only meaningful for cooperative cancellation, and only if
    /// the thread body tolerated being unwound.
    #[cfg(unix)]
    pub fn from_join_handle<T>(thread: &std::thread::JoinHandle<T>) -> Self {
        use std::os::unix::thread::JoinHandleExt;
        Self::from_pthread(thread.as_pthread_t())
    }

    /// References the OS thread behind a [`std::thread::JoinHandle`].
    ///
    /// The `JoinHandle` keeps ownership of the underlying `HANDLE`, and must
    /// outlive every request made through the returned value.
    #[cfg(windows)]
    pub fn from_join_handle<T>(thread: &std::thread::JoinHandle<T>) -> Self {
        use std::os::windows::io::AsRawHandle;
        Self::from_raw_handle(thread.as_raw_handle())
    }

    pub fn api(&self) -> Api {
        self.api
    }

    /// The platform-native value, widened to `usize`.
    pub fn raw(&self) -> usize {
        self.raw
    }

    /// The id of the process the handle was created in.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn semantics(&self) -> Semantics {
        self.api.semantics()
    }

    /// Returns `true` if the handle was created in the current process.
    pub fn is_local(&self) -> bool {
        self.pid == std::process::id()
    }
}

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#x} (pid {})", self.api, self.raw, self.pid)
    }
}
