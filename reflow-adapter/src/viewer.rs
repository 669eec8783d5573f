use std::fmt;
use std::sync::Arc;

use reflow::{
    Clock, MonotonicClock, Reflow, ReflowDecision, ReflowOptions, Scheduler, ScrollHost,
    SizeChange, TaskQueue,
};

use crate::ScrollModel;

/// A framework-neutral viewer shell around a [`Reflow`] engine.
///
/// This is the composition root a UI-toolkit wrapper drives instead of
/// subclassing a widget:
///
/// - forward the embedded surface's raw size changes to
///   [`Viewer::on_size_change`]
/// - call [`Viewer::pump`] from the frame/timer loop so deferred replays and
///   scroll compensations run on the embedder's logical thread
/// - read (or seed) the [`ScrollModel`]; embeddings with a real scroll
///   container wire [`Reflow`] to it directly instead
pub struct Viewer {
    clock: Arc<dyn Clock>,
    queue: Arc<TaskQueue>,
    scroll: Arc<ScrollModel>,
    engine: Reflow,
}

impl Viewer {
    /// Builds a viewer on the production clock.
    pub fn new(options: ReflowOptions) -> Self {
        Self::with_clock(options, Arc::new(MonotonicClock::new()))
    }

    /// Builds a viewer on an explicit clock, e.g. [`reflow::ManualClock`] for
    /// a fully deterministic session.
    pub fn with_clock(options: ReflowOptions, clock: Arc<dyn Clock>) -> Self {
        let queue = Arc::new(TaskQueue::new(Arc::clone(&clock)));
        let scroll = Arc::new(ScrollModel::new());
        let engine = Reflow::new(
            options,
            Arc::clone(&clock),
            queue.clone() as Arc<dyn Scheduler>,
            scroll.clone() as Arc<dyn ScrollHost>,
        );
        Self {
            clock,
            queue,
            scroll,
            engine,
        }
    }

    /// Forwards one raw size-change notification from the embedded surface.
    pub fn on_size_change(
        &self,
        width: u32,
        height: u32,
        old_width: u32,
        old_height: u32,
    ) -> ReflowDecision {
        self.engine.on_size_change(SizeChange {
            width,
            height,
            old_width,
            old_height,
        })
    }

    /// Runs all deferred work that has come due. Call from the frame loop.
    ///
    /// Returns the number of tasks run.
    pub fn pump(&self) -> usize {
        self.queue.run_due()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn engine(&self) -> &Reflow {
        &self.engine
    }

    pub fn scroll(&self) -> &ScrollModel {
        &self.scroll
    }

    /// The viewer's task queue, for introspection (e.g. the next deadline).
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("now_ms", &self.clock.now_ms())
            .field("queue", &self.queue)
            .field("scroll", &self.scroll)
            .field("engine", &self.engine)
            .finish()
    }
}
