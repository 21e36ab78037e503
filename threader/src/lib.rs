//! Typed, cross-platform requests to cancel or terminate running OS threads.
//!
//! This crate provides [`CancellationService`], which asks the operating system
//! to stop a thread identified by a [`ThreadHandle`] and reports whether the
//! request was accepted.
//!
//! # Semantics
//!
//! The guarantee behind an accepted request depends on where the handle came
//! from, and is always reported as a [`Semantics`] value:
//!
//! - **Cooperative** (`pthread_cancel`): the target is only marked for
//!   cancellation, and stops at its next cancellation point. A thread that
//!   never reaches one keeps running.
//! - **Forced** (`TerminateThread`): the target is halted wherever it is.
//!   Locks it holds stay held, destructors never run, and any shared state it
//!   was mutating is left half-written.
//!
//! Acceptance never means the thread has stopped. Callers that need to know
//! must join the thread through whatever lifecycle handle they own.
//!
//! # Example
//!
//! ```no_run
//! use threader::{CancellationService, Config, ThreadHandle};
//!
//! fn stop(ident: usize) {
//!     let service = CancellationService::new(Config::default());
//!     let handle = ThreadHandle::native(ident);
//!
//!     // SAFETY: the caller vouches that `ident` names a thread whose state
//!     // nobody observes once it stops.
//!     match unsafe { service.request_cancellation(&handle) }.into_result() {
//!         Ok(semantics) => println!("Request accepted ({semantics})"),
//!         Err(e) => eprintln!("Thread could not be cancelled: {e}"),
//!     }
//! }
//! ```

mod sys;

pub mod config;
pub mod error;
pub mod handle;
pub mod result;
pub mod service;

pub use config::Config;
pub use error::{Error, ErrorKind};
pub use handle::{Api, Semantics, ThreadHandle};
pub use result::CancellationResult;
pub use service::CancellationService;

#[cfg(test)]
mod test_support;
