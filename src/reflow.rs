use std::fmt;
use std::sync::{Arc, Mutex};

use crate::lock;
use crate::{
    Clock, Compensation, ReflowDecision, ReflowOptions, ReflowState, Scheduler, ScrollHost,
    SizeChange, Throttle,
};

#[derive(Debug, Default)]
struct State {
    real_width: u32,
    real_height: u32,
    ignore_next: bool,
    last_size_change_ms: Option<u64>,
}

// Everything a deferred replay needs to reach after the engine handed the
// throttle its action.
struct Shared {
    options: ReflowOptions,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    host: Arc<dyn ScrollHost>,
    state: Mutex<State>,
}

/// The resize decision engine of a scrollable content viewer.
///
/// `Reflow` consumes raw size-change notifications from an embedded rendering
/// surface, filters the echoes its own compensation can trigger, coalesces
/// bursts through a [`Throttle`], and, on a genuine content-height change,
/// schedules a delayed, damped scroll adjustment against the [`ScrollHost`]
/// so the visible viewport does not jump.
///
/// This type holds no UI objects and owns no threads: time comes from the
/// injected [`Clock`] and every deferred step runs through the injected
/// [`Scheduler`] on the embedder's logical thread. A UI-surface wrapper calls
/// into the engine (composition), it never subclasses it.
pub struct Reflow {
    shared: Arc<Shared>,
    throttle: Throttle,
}

impl Reflow {
    /// Creates an engine wired to its collaborators.
    ///
    /// The scroll host is required up front: the very first notification can
    /// already schedule a compensation, so there is no meaningful "not yet
    /// attached" state to represent.
    pub fn new(
        options: ReflowOptions,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        host: Arc<dyn ScrollHost>,
    ) -> Self {
        let shared = Arc::new(Shared {
            options,
            clock: Arc::clone(&clock),
            scheduler: Arc::clone(&scheduler),
            host,
            state: Mutex::new(State::default()),
        });
        let replay = Arc::downgrade(&shared);
        let throttle = Throttle::new(
            "reflow",
            shared.options.min_resize_interval_ms,
            shared.options.max_resize_interval_ms,
            clock,
            scheduler,
            move || {
                if let Some(shared) = replay.upgrade() {
                    Shared::perform_size_change_delayed(&shared);
                }
            },
        );
        Self { shared, throttle }
    }

    pub fn options(&self) -> &ReflowOptions {
        &self.shared.options
    }

    /// Feeds one raw size-change notification and returns what was done with
    /// it.
    ///
    /// A notification arriving within `min_resize_interval_ms` of the last
    /// applied transition is coalesced into the throttle; if it additionally
    /// follows a deferred replay (the echo case), it is dropped outright. A
    /// notification after a sufficiently quiet period is applied immediately.
    pub fn on_size_change(&self, change: SizeChange) -> ReflowDecision {
        let now_ms = self.shared.clock.now_ms();
        let recently_sized;
        {
            let mut state = lock(&self.shared.state);
            state.real_width = change.width;
            state.real_height = change.height;
            recently_sized = state.last_size_change_ms.is_some_and(|t| {
                now_ms.saturating_sub(t) < self.shared.options.min_resize_interval_ms
            });

            // A replay is known to be able to trigger one more notification
            // right away. If it lands inside the re-fire window, drop it on
            // the floor.
            if state.ignore_next {
                state.ignore_next = false;
                if recently_sized {
                    rwarn!(
                        width = change.width,
                        height = change.height,
                        "suppressing echoed size change"
                    );
                    return ReflowDecision::Suppressed;
                }
            }
        }

        if recently_sized {
            self.throttle.on_event();
            ReflowDecision::Deferred
        } else {
            // It has been quiet long enough - the normal path.
            Shared::perform_size_change(&self.shared, change.old_width, change.old_height);
            ReflowDecision::Applied
        }
    }

    /// Latest observed surface dimensions.
    pub fn real_size(&self) -> (u32, u32) {
        let state = lock(&self.shared.state);
        (state.real_width, state.real_height)
    }

    /// When the last transition was forwarded to the surface.
    pub fn last_size_change_ms(&self) -> Option<u64> {
        lock(&self.shared.state).last_size_change_ms
    }

    /// Whether a coalesced replay is pending in the throttle.
    pub fn is_deferring(&self) -> bool {
        self.throttle.is_pending()
    }

    /// Returns a lightweight snapshot of the engine's bookkeeping.
    pub fn state(&self) -> ReflowState {
        let state = lock(&self.shared.state);
        ReflowState {
            real_width: state.real_width,
            real_height: state.real_height,
            ignore_next: state.ignore_next,
            last_size_change_ms: state.last_size_change_ms,
            deferring: self.throttle.is_pending(),
        }
    }

    /// Cancels a pending deferred replay, if any.
    ///
    /// Already-scheduled compensations are fire-and-forget and lapse on their
    /// own when the host goes away.
    pub fn cancel(&self) {
        self.throttle.cancel();
    }
}

impl Shared {
    fn perform_size_change_delayed(shared: &Arc<Shared>) {
        let (width, height) = {
            let mut state = lock(&shared.state);
            state.ignore_next = true;
            (state.real_width, state.real_height)
        };
        // Replay against the live size: the surface is re-notified with the
        // latest dimensions, and no height delta remains to compensate.
        Self::perform_size_change(shared, width, height);
    }

    fn perform_size_change(shared: &Arc<Shared>, old_width: u32, old_height: u32) {
        let (width, height) = {
            let state = lock(&shared.state);
            (state.real_width, state.real_height)
        };

        if let Some(notify) = &shared.options.notify_surface {
            notify(SizeChange {
                width,
                height,
                old_width,
                old_height,
            });
        }
        lock(&shared.state).last_size_change_ms = Some(shared.clock.now_ms());

        if height == old_height {
            return;
        }

        let compensation = Compensation {
            scroll_y: shared.host.scroll_offset(),
            height_delta: height as i64 - old_height as i64,
        };
        let policy = shared.options.compensation_policy;
        let host = Arc::downgrade(&shared.host);
        shared.scheduler.schedule(
            shared.options.compensation_delay_ms,
            Box::new(move || {
                // The host may be torn down before the delay elapses; the
                // adjustment is polish, not correctness, so it lapses.
                let Some(host) = host.upgrade() else {
                    return;
                };
                if let Some(dy) = compensation.scroll_delta(policy) {
                    rdebug!(
                        scroll_y = compensation.scroll_y,
                        height_delta = compensation.height_delta,
                        dy,
                        "applying scroll compensation"
                    );
                    host.scroll_by(0, dy);
                }
            }),
        );
    }
}

impl fmt::Debug for Reflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflow")
            .field("options", &self.shared.options)
            .field("state", &*lock(&self.shared.state))
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}
