use std::fmt;
use std::sync::{Arc, Mutex};

use crate::Clock;
use crate::lock;

/// A unit of deferred work, run once on the logical thread.
pub type Task = Box<dyn FnOnce() + Send>;

/// Opaque handle to a scheduled task, usable for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// The delayed-callback capability.
///
/// `schedule` runs `task` once, at least `delay_ms` after the call, on the
/// same logical thread that drives the engine. Tasks scheduled from the same
/// instant with delays `d1 < d2` must run in that relative order.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay_ms: u64, task: Task) -> TaskId;

    /// Cancels a previously scheduled task.
    ///
    /// Returns `false` when the task already ran or was already cancelled.
    fn cancel(&self, id: TaskId) -> bool;
}

struct Entry {
    id: u64,
    due_ms: u64,
    task: Task,
}

#[derive(Default)]
struct QueueInner {
    entries: Vec<Entry>,
    next_id: u64,
}

impl QueueInner {
    // Earliest deadline wins; submission order breaks ties (ids ascend).
    fn pop_due(&mut self, now_ms: u64) -> Option<Task> {
        let best = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;
        Some(self.entries.remove(best).task)
    }
}

/// A deterministic, manually pumped [`Scheduler`].
///
/// Real UI event loops implement [`Scheduler`] directly over their own timer
/// facility; `TaskQueue` is the in-crate implementation for tests, demos, and
/// embeddings that drive a frame/tick loop themselves. [`TaskQueue::run_due`]
/// executes every task whose deadline has passed against the injected
/// [`Clock`], releasing the internal lock while a task runs so tasks may
/// schedule further tasks.
pub struct TaskQueue {
    clock: Arc<dyn Clock>,
    inner: Mutex<QueueInner>,
}

impl TaskQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(QueueInner::default()),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deadline of the next task to run, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        lock(&self.inner).entries.iter().map(|e| e.due_ms).min()
    }

    /// Runs every task that is due, in `(deadline, submission order)` order.
    ///
    /// Returns the number of tasks run. A task scheduled with zero delay from
    /// inside another task is itself due and runs in the same pump.
    pub fn run_due(&self) -> usize {
        let mut ran = 0usize;
        loop {
            let now_ms = self.clock.now_ms();
            let Some(task) = lock(&self.inner).pop_due(now_ms) else {
                break;
            };
            task();
            ran += 1;
        }
        if ran > 0 {
            rtrace!(ran, "TaskQueue::run_due");
        }
        ran
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, delay_ms: u64, task: Task) -> TaskId {
        let due_ms = self.clock.now_ms().saturating_add(delay_ms);
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry { id, due_ms, task });
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) -> bool {
        let mut inner = lock(&self.inner);
        let Some(pos) = inner.entries.iter().position(|e| e.id == id.0) else {
            return false;
        };
        inner.entries.remove(pos);
        true
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("TaskQueue")
            .field("pending", &inner.entries.len())
            .field("next_id", &inner.next_id)
            .finish_non_exhaustive()
    }
}
