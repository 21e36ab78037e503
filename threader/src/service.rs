//! Requests to stop running OS threads.
//!
//! [`CancellationService`] is stateless apart from its [`Config`]. Each request
//! is a single, non-blocking call into the OS that returns as soon as the
//! request is registered or refused. The service never waits for the target to
//! stop, and there is no ordering between a request returning and the target
//! ceasing execution.
//!
//! # Hazards
//!
//! The target thread's own state is mutated underneath it by every accepted
//! request:
//!
//! - With [`Semantics::Cooperative`], the target unwinds from its next
//!   cancellation point. Cleanup handlers and thread-specific data destructors
//!   run, but locks taken without a cleanup handler stay locked.
//! - With [`Semantics::Forced`], the target stops on whatever instruction it is
//!   executing. Nothing is released, and data it was halfway through writing
//!   stays half-written.
//!
//! This is why every request method is `unsafe`.

use super::*;
use tracing::{debug, trace};

#[cfg(feature = "instrument")]
use tracing::instrument;

/// Issues cancellation requests against [`ThreadHandle`]s.
#[derive(Clone, Debug, Default)]
pub struct CancellationService {
    config: Config,
}

impl CancellationService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The semantics requests against native handles get on this platform.
    pub const fn native_semantics() -> Semantics {
        Api::native().semantics()
    }

    /// Requests that the thread behind `handle` stop, using whichever
    /// mechanism its [`Api`] provides.
    ///
    /// Before the OS is consulted the request is refused if the handle belongs
    /// to another process, if its API is unavailable on this platform, if it
    /// needs forced termination and [`Config::allow_forced_termination`] is
    /// unset, or if it names the calling thread.
    ///
    /// # Safety
    ///
    /// For [`Semantics::Cooperative`] handles, the target unwinds when it
    /// reaches a cancellation point. It must not be running Rust frames that
    /// own values with destructors, or frames under `catch_unwind` (which
    /// includes every closure passed to `std::thread::spawn`), at that point.
    ///
    /// Every frame on the target's stack at the cancellation point must also
    /// permit unwinding. A Rust frame with a non-unwinding ABI, such as any
    /// `extern "C" fn` or a call through a plain `extern "C"` declaration,
    /// makes the unwind fail and aborts the whole process. Thread bodies and
    /// the declarations of the cancellation points they call must use
    /// `extern "C-unwind"`.
    ///
    /// For [`Semantics::Forced`] handles, the target must not own or borrow
    /// anything that is observed after it stops: its locks stay held and any
    /// write in progress is abandoned. Borrowed data in a scoped thread is
    /// left in whatever state it was in.
    #[cfg_attr(feature = "instrument", instrument(skip(self)))]
    pub unsafe fn request_cancellation(&self, handle: &ThreadHandle) -> CancellationResult {
        let result = self.preflight(handle).and_then(|()| match handle.semantics() {
            Semantics::Cooperative => unsafe { self.cancel(handle) },
            Semantics::Forced => unsafe { self.terminate(handle) },
        });
        report(handle, result.map(|()| handle.semantics()))
    }

    /// Marks the thread for cancellation at its next cancellation point.
    ///
    /// Handles that only support forced termination are refused with
    /// [`Error::Unsupported`].
    ///
    /// # Safety
    ///
    /// See [`request_cancellation`](Self::request_cancellation).
    pub unsafe fn request_cooperative(&self, handle: &ThreadHandle) -> CancellationResult {
        if handle.semantics() != Semantics::Cooperative {
            return report(handle, Err(Error::Unsupported { api: handle.api() }));
        }
        unsafe { self.request_cancellation(handle) }
    }

    /// Halts the thread immediately, wherever it is.
    ///
    /// Handles that only support cooperative cancellation are refused with
    /// [`Error::Unsupported`].
    ///
    /// # Safety
    ///
    /// See [`request_cancellation`](Self::request_cancellation).
    pub unsafe fn force_terminate(&self, handle: &ThreadHandle) -> CancellationResult {
        if handle.semantics() != Semantics::Forced {
            return report(handle, Err(Error::Unsupported { api: handle.api() }));
        }
        unsafe { self.request_cancellation(handle) }
    }

    fn preflight(&self, handle: &ThreadHandle) -> Result<(), Error> {
        if !handle.is_local() {
            return Err(Error::ForeignProcess { pid: handle.pid() });
        }
        if !handle.api().is_available() {
            return Err(Error::Unsupported { api: handle.api() });
        }
        if handle.semantics() == Semantics::Forced && !self.config.allow_forced_termination {
            return Err(Error::ForcedTerminationDisallowed);
        }
        if sys::is_current(handle.api(), handle.raw()) {
            return Err(Error::CallingThread);
        }
        Ok(())
    }

    #[cfg(all(unix, not(target_os = "android")))]
    unsafe fn cancel(&self, handle: &ThreadHandle) -> Result<(), Error> {
        unsafe { sys::cancel(handle.raw()) }.map_err(Error::from_os_code)
    }

    #[cfg(not(all(unix, not(target_os = "android"))))]
    unsafe fn cancel(&self, handle: &ThreadHandle) -> Result<(), Error> {
        Err(Error::Unsupported { api: handle.api() })
    }

    #[cfg(windows)]
    unsafe fn terminate(&self, handle: &ThreadHandle) -> Result<(), Error> {
        tracing::warn!("Forcibly terminating thread {handle}");
        unsafe { sys::terminate(handle.api(), handle.raw(), self.config.exit_code) }
            .map_err(Error::from_os_code)
    }

    #[cfg(not(windows))]
    unsafe fn terminate(&self, handle: &ThreadHandle) -> Result<(), Error> {
        Err(Error::Unsupported { api: handle.api() })
    }
}

fn report(handle: &ThreadHandle, result: Result<Semantics, Error>) -> CancellationResult {
    match &result {
        Ok(semantics) => trace!("Request to stop thread {handle} accepted ({semantics})"),
        Err(e) => debug!("Request to stop thread {handle} rejected: {e}"),
    }
    result.into()
}
