use std::cmp;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::lock;
use crate::{Clock, Scheduler, Task, TaskId};

#[derive(Clone, Copy, Debug)]
struct Pending {
    first_event_ms: u64,
    fire_at_ms: u64,
    task: TaskId,
}

/// Coalesces a stream of event signals into at most one deferred action per
/// quiet window, bounded above by a maximum wait.
///
/// Each burst of events spaced less than `min_interval_ms` apart produces
/// exactly one fire, `min_interval_ms` after the last event of the burst,
/// clamped to `max_interval_ms` after the first event so that continuous
/// event pressure cannot starve the action.
///
/// The action runs synchronously from the scheduler's callback, on the same
/// logical thread that calls [`Throttle::on_event`]. Dropping the throttle
/// cancels a pending fire; a scheduler that cannot cancel still cannot fire
/// into freed state, because the scheduled task only holds a weak reference
/// back to the throttle.
pub struct Throttle {
    name: &'static str,
    min_interval_ms: u64,
    max_interval_ms: u64,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    action: Arc<dyn Fn() + Send + Sync>,
    pending: Arc<Mutex<Option<Pending>>>,
}

impl Throttle {
    pub fn new(
        name: &'static str,
        min_interval_ms: u64,
        max_interval_ms: u64,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        debug_assert!(
            min_interval_ms <= max_interval_ms,
            "Throttle: min_interval_ms ({min_interval_ms}) > max_interval_ms ({max_interval_ms})"
        );
        Self {
            name,
            min_interval_ms,
            max_interval_ms,
            clock,
            scheduler,
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Signals one raw event.
    ///
    /// Arms the deferred action when idle. When a fire is already pending, it
    /// is re-targeted (never duplicated) to `now + min_interval`, clamped to
    /// `first_event + max_interval`.
    pub fn on_event(&self) {
        let now_ms = self.clock.now_ms();
        let mut pending = lock(&self.pending);
        match pending.as_mut() {
            None => {
                let fire_at_ms = now_ms.saturating_add(self.min_interval_ms);
                let task = self.scheduler.schedule(self.min_interval_ms, self.fire_task());
                rtrace!(throttle = self.name, fire_at_ms, "armed");
                *pending = Some(Pending {
                    first_event_ms: now_ms,
                    fire_at_ms,
                    task,
                });
            }
            Some(p) => {
                let cap = p.first_event_ms.saturating_add(self.max_interval_ms);
                let fire_at_ms = cmp::min(now_ms.saturating_add(self.min_interval_ms), cap);
                if fire_at_ms == p.fire_at_ms {
                    return;
                }
                self.scheduler.cancel(p.task);
                p.fire_at_ms = fire_at_ms;
                p.task = self
                    .scheduler
                    .schedule(fire_at_ms.saturating_sub(now_ms), self.fire_task());
                rtrace!(throttle = self.name, fire_at_ms, "extended");
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    /// When the pending action will fire, if one is armed.
    pub fn fire_at_ms(&self) -> Option<u64> {
        lock(&self.pending).map(|p| p.fire_at_ms)
    }

    /// Cancels the pending fire, if any.
    pub fn cancel(&self) {
        if let Some(p) = lock(&self.pending).take() {
            self.scheduler.cancel(p.task);
            rtrace!(throttle = self.name, "cancelled");
        }
    }

    fn fire_task(&self) -> Task {
        let pending = Arc::downgrade(&self.pending);
        let action = Arc::clone(&self.action);
        Box::new(move || {
            let Some(pending) = pending.upgrade() else {
                return;
            };
            // A cancelled or re-targeted fire must not run the action twice.
            if lock(&pending).take().is_none() {
                return;
            }
            action();
        })
    }
}

impl Drop for Throttle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Throttle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("name", &self.name)
            .field("min_interval_ms", &self.min_interval_ms)
            .field("max_interval_ms", &self.max_interval_ms)
            .field("pending", &*lock(&self.pending))
            .finish_non_exhaustive()
    }
}
