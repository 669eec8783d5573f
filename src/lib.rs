//! A headless resize-throttling and scroll-compensation engine for embedded
//! content viewers.
//!
//! For embedding helpers (a viewer shell and a simple scroll model), see the
//! `reflow-adapter` crate.
//!
//! An embedded rendering surface (a web view, a document renderer) reports
//! bursty, occasionally self-triggered size changes while content loads and
//! reflows. This crate implements the timing/decision engine that keeps the
//! viewport visually stable under that noise:
//!
//! - [`Throttle`] coalesces a burst of signals into at most one deferred
//!   action per quiet window, bounded above by a maximum wait.
//! - [`Reflow`] classifies each notification (apply / defer / suppress) and,
//!   on a genuine content-height change, schedules a delayed, damped scroll
//!   adjustment against the scroll container.
//!
//! It is UI-agnostic and owns no threads or timers. The embedding layer
//! provides:
//! - a monotonic [`Clock`] ([`MonotonicClock`] in production, [`ManualClock`]
//!   for deterministic sessions)
//! - a [`Scheduler`] running delayed callbacks on the embedder's logical
//!   thread (or the pumpable [`TaskQueue`])
//! - a [`ScrollHost`] exposing the current scroll offset and relative scrolls
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod clock;
mod host;
mod options;
mod reflow;
mod scheduler;
mod throttle;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use host::ScrollHost;
pub use options::{ReflowOptions, SurfaceCallback};
pub use reflow::Reflow;
pub use scheduler::{Scheduler, Task, TaskId, TaskQueue};
pub use throttle::Throttle;
pub use types::{Compensation, CompensationPolicy, ReflowDecision, ReflowState, SizeChange};

use std::sync::{Mutex, MutexGuard, PoisonError};

// All mutation happens on one logical thread; a poisoned lock only means a
// panic already unwound through it, and the guarded state must stay readable
// for teardown and diagnostics.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
