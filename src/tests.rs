use crate::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn fixture() -> (Arc<ManualClock>, Arc<TaskQueue>) {
    let clock = Arc::new(ManualClock::new(0));
    let queue = Arc::new(TaskQueue::new(clock.clone() as Arc<dyn Clock>));
    (clock, queue)
}

#[derive(Default)]
struct RecordingHost {
    offset: Mutex<i32>,
    scrolls: Mutex<Vec<(i32, i32)>>,
}

impl RecordingHost {
    fn with_offset(offset: i32) -> Self {
        Self {
            offset: Mutex::new(offset),
            scrolls: Mutex::new(Vec::new()),
        }
    }

    fn scrolls(&self) -> Vec<(i32, i32)> {
        lock(&self.scrolls).clone()
    }
}

impl ScrollHost for RecordingHost {
    fn scroll_offset(&self) -> i32 {
        *lock(&self.offset)
    }

    fn scroll_by(&self, dx: i32, dy: i32) {
        *lock(&self.offset) += dy;
        lock(&self.scrolls).push((dx, dy));
    }
}

fn change(width: u32, height: u32, old_width: u32, old_height: u32) -> SizeChange {
    SizeChange {
        width,
        height,
        old_width,
        old_height,
    }
}

// --- clock ---

#[test]
fn manual_clock_advances_and_never_rewinds() {
    let clock = ManualClock::new(10);
    assert_eq!(clock.now_ms(), 10);
    assert_eq!(clock.advance(5), 15);
    clock.set_ms(100);
    assert_eq!(clock.now_ms(), 100);
    clock.set_ms(50);
    assert_eq!(clock.now_ms(), 100);
}

#[test]
fn monotonic_clock_is_nondecreasing() {
    let clock = MonotonicClock::new();
    let a = clock.now_ms();
    let b = clock.now_ms();
    assert!(b >= a);
}

// --- task queue ---

#[test]
fn nothing_runs_before_its_deadline() {
    let (clock, queue) = fixture();
    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);
    queue.schedule(10, Box::new(move || {
        r.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(queue.run_due(), 0);
    clock.set_ms(9);
    assert_eq!(queue.run_due(), 0);
    clock.set_ms(10);
    assert_eq!(queue.run_due(), 1);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert!(queue.is_empty());
}

#[test]
fn due_tasks_run_in_deadline_then_submission_order() {
    let (clock, queue) = fixture();
    let order = Arc::new(Mutex::new(Vec::new()));
    for (delay, tag) in [(50u64, 'a'), (10, 'b'), (10, 'c')] {
        let order = Arc::clone(&order);
        queue.schedule(delay, Box::new(move || {
            lock(&order).push(tag);
        }));
    }

    clock.set_ms(100);
    assert_eq!(queue.run_due(), 3);
    assert_eq!(*lock(&order), vec!['b', 'c', 'a']);
}

#[test]
fn cancel_removes_a_pending_task() {
    let (clock, queue) = fixture();
    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);
    let id = queue.schedule(10, Box::new(move || {
        r.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(queue.cancel(id));
    assert!(!queue.cancel(id));
    clock.set_ms(100);
    assert_eq!(queue.run_due(), 0);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn tasks_may_schedule_further_tasks() {
    let (clock, queue) = fixture();
    let ran = Arc::new(AtomicUsize::new(0));
    let task = {
        let queue = Arc::clone(&queue);
        let ran_outer = Arc::clone(&ran);
        let ran_inner = Arc::clone(&ran);
        Box::new(move || {
            ran_outer.fetch_add(1, Ordering::SeqCst);
            queue.schedule(
                0,
                Box::new(move || {
                    ran_inner.fetch_add(1, Ordering::SeqCst);
                }),
            );
        })
    };
    queue.schedule(10, task);

    clock.set_ms(10);
    assert_eq!(queue.run_due(), 2);
    assert_eq!(ran.load(Ordering::SeqCst), 2);
}

#[test]
fn next_due_reports_the_earliest_deadline() {
    let (_clock, queue) = fixture();
    assert_eq!(queue.next_due_ms(), None);
    queue.schedule(30, Box::new(|| {}));
    queue.schedule(20, Box::new(|| {}));
    assert_eq!(queue.next_due_ms(), Some(20));
    assert_eq!(queue.len(), 2);
}

// --- throttle ---

fn counting_throttle(
    clock: &Arc<ManualClock>,
    queue: &Arc<TaskQueue>,
    min_ms: u64,
    max_ms: u64,
) -> (Throttle, Arc<Mutex<Vec<u64>>>) {
    let fires = Arc::new(Mutex::new(Vec::new()));
    let throttle = {
        let fires = Arc::clone(&fires);
        let clock = Arc::clone(clock);
        Throttle::new(
            "test",
            min_ms,
            max_ms,
            clock.clone() as Arc<dyn Clock>,
            queue.clone() as Arc<dyn Scheduler>,
            move || {
                lock(&fires).push(clock.now_ms());
            },
        )
    };
    (throttle, fires)
}

#[test]
fn burst_coalesces_into_a_single_fire() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    for t in [0u64, 50, 90] {
        clock.set_ms(t);
        throttle.on_event();
    }
    assert_eq!(throttle.fire_at_ms(), Some(290));

    clock.set_ms(289);
    assert_eq!(queue.run_due(), 0);
    clock.set_ms(290);
    assert_eq!(queue.run_due(), 1);
    assert_eq!(*lock(&fires), vec![290]);
    assert!(!throttle.is_pending());

    clock.set_ms(1000);
    assert_eq!(queue.run_due(), 0);
    assert_eq!(lock(&fires).len(), 1);
}

#[test]
fn pending_fire_is_extended_not_duplicated() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    clock.set_ms(0);
    throttle.on_event();
    assert_eq!(throttle.fire_at_ms(), Some(200));
    clock.set_ms(100);
    throttle.on_event();
    assert_eq!(throttle.fire_at_ms(), Some(300));
    assert_eq!(queue.len(), 1);

    clock.set_ms(300);
    assert_eq!(queue.run_due(), 1);
    assert_eq!(*lock(&fires), vec![300]);
}

#[test]
fn continuous_pressure_fires_no_later_than_max_interval() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    // Events every 50 ms; the queue is pumped every 10 ms like an event loop.
    for t in (0u64..=1200).step_by(10) {
        clock.set_ms(t);
        queue.run_due();
        if t % 50 == 0 && t <= 500 {
            throttle.on_event();
        }
    }

    // First burst clamps to 0 + 300; the fire itself does not end the event
    // stream, so a second burst starts at 300 and clamps to 300 + 300.
    assert_eq!(*lock(&fires), vec![300, 600]);
}

#[test]
fn separate_bursts_fire_separately() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    clock.set_ms(0);
    throttle.on_event();
    clock.set_ms(200);
    queue.run_due();
    clock.set_ms(1000);
    throttle.on_event();
    clock.set_ms(1200);
    queue.run_due();

    assert_eq!(*lock(&fires), vec![200, 1200]);
}

#[test]
fn drop_cancels_the_pending_fire() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    clock.set_ms(0);
    throttle.on_event();
    assert_eq!(queue.len(), 1);
    drop(throttle);
    assert!(queue.is_empty());

    clock.set_ms(1000);
    assert_eq!(queue.run_due(), 0);
    assert!(lock(&fires).is_empty());
}

#[test]
fn explicit_cancel_disarms() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 200, 300);

    clock.set_ms(0);
    throttle.on_event();
    throttle.cancel();
    assert!(!throttle.is_pending());
    clock.set_ms(1000);
    queue.run_due();
    assert!(lock(&fires).is_empty());

    // Cancelling leaves the throttle usable.
    throttle.on_event();
    clock.set_ms(1200);
    assert_eq!(queue.run_due(), 1);
    assert_eq!(*lock(&fires), vec![1200]);
}

#[test]
fn equal_min_and_max_pin_the_fire_to_the_first_event() {
    let (clock, queue) = fixture();
    let (throttle, fires) = counting_throttle(&clock, &queue, 250, 250);

    clock.set_ms(0);
    throttle.on_event();
    clock.set_ms(100);
    throttle.on_event();
    assert_eq!(throttle.fire_at_ms(), Some(250));

    clock.set_ms(250);
    queue.run_due();
    assert_eq!(*lock(&fires), vec![250]);
}

// --- compensation policy ---

#[test]
fn growth_is_damped_when_scrolled_down() {
    let comp = Compensation {
        scroll_y: 150,
        height_delta: 50,
    };
    assert_eq!(comp.scroll_delta(CompensationPolicy::default()), Some(40));
}

#[test]
fn growth_near_the_top_is_not_compensated() {
    let policy = CompensationPolicy::default();
    let near_top = Compensation {
        scroll_y: 50,
        height_delta: 50,
    };
    assert_eq!(near_top.scroll_delta(policy), None);

    // The gate is strictly greater-than.
    let at_threshold = Compensation {
        scroll_y: 100,
        height_delta: 50,
    };
    assert_eq!(at_threshold.scroll_delta(policy), None);
}

#[test]
fn shrink_is_damped_regardless_of_scroll_position() {
    let policy = CompensationPolicy::default();
    for scroll_y in [0, 50, 100, 500] {
        let comp = Compensation {
            scroll_y,
            height_delta: -50,
        };
        assert_eq!(comp.scroll_delta(policy), Some(-30));
    }
}

#[test]
fn damping_truncates_toward_zero() {
    let policy = CompensationPolicy::default();
    let grow = Compensation {
        scroll_y: 200,
        height_delta: 55,
    };
    assert_eq!(grow.scroll_delta(policy), Some(44));

    let shrink = Compensation {
        scroll_y: 200,
        height_delta: -55,
    };
    assert_eq!(shrink.scroll_delta(policy), Some(-33));

    let small_shrink = Compensation {
        scroll_y: 200,
        height_delta: -3,
    };
    assert_eq!(small_shrink.scroll_delta(policy), Some(-1));
}

// --- engine ---

struct EngineFixture {
    clock: Arc<ManualClock>,
    queue: Arc<TaskQueue>,
    host: Arc<RecordingHost>,
    surface: Arc<Mutex<Vec<SizeChange>>>,
    engine: Reflow,
}

fn engine_fixture(scroll_offset: i32) -> EngineFixture {
    let (clock, queue) = fixture();
    let host = Arc::new(RecordingHost::with_offset(scroll_offset));
    let surface = Arc::new(Mutex::new(Vec::new()));
    let options = {
        let surface = Arc::clone(&surface);
        ReflowOptions::new().with_notify_surface(Some(move |c: SizeChange| {
            lock(&surface).push(c);
        }))
    };
    let engine = Reflow::new(
        options,
        clock.clone() as Arc<dyn Clock>,
        queue.clone() as Arc<dyn Scheduler>,
        host.clone() as Arc<dyn ScrollHost>,
    );
    EngineFixture {
        clock,
        queue,
        host,
        surface,
        engine,
    }
}

#[test]
fn first_change_applies_immediately() {
    let f = engine_fixture(0);
    let decision = f.engine.on_size_change(change(320, 200, 320, 50));

    assert_eq!(decision, ReflowDecision::Applied);
    assert_eq!(*lock(&f.surface), vec![change(320, 200, 320, 50)]);
    assert_eq!(f.engine.last_size_change_ms(), Some(0));
    assert_eq!(f.engine.real_size(), (320, 200));
    // A height change always schedules the (possibly no-op) compensation.
    assert_eq!(f.queue.len(), 1);
}

#[test]
fn growth_compensation_scrolls_after_the_delay() {
    let f = engine_fixture(150);
    f.engine.on_size_change(change(320, 150, 320, 100));

    f.clock.set_ms(299);
    f.queue.run_due();
    assert!(f.host.scrolls().is_empty());

    f.clock.set_ms(300);
    f.queue.run_due();
    assert_eq!(f.host.scrolls(), vec![(0, 40)]);
    assert_eq!(f.host.scroll_offset(), 190);
}

#[test]
fn growth_near_the_top_does_not_scroll() {
    let f = engine_fixture(50);
    f.engine.on_size_change(change(320, 150, 320, 100));

    f.clock.set_ms(300);
    f.queue.run_due();
    assert!(f.host.scrolls().is_empty());
    assert_eq!(f.host.scroll_offset(), 50);
}

#[test]
fn shrink_compensation_ignores_scroll_position() {
    let f = engine_fixture(0);
    f.engine.on_size_change(change(320, 100, 320, 150));

    f.clock.set_ms(300);
    f.queue.run_due();
    assert_eq!(f.host.scrolls(), vec![(0, -30)]);
}

#[test]
fn unchanged_height_schedules_no_compensation() {
    let f = engine_fixture(500);
    let decision = f.engine.on_size_change(change(480, 200, 320, 200));

    assert_eq!(decision, ReflowDecision::Applied);
    assert_eq!(*lock(&f.surface), vec![change(480, 200, 320, 200)]);
    assert!(f.queue.is_empty());
}

#[test]
fn rapid_followup_is_deferred_and_replayed_with_live_dimensions() {
    let f = engine_fixture(0);
    f.engine.on_size_change(change(320, 200, 320, 50));
    assert_eq!(f.queue.len(), 1);

    f.clock.set_ms(50);
    let decision = f.engine.on_size_change(change(320, 210, 320, 200));
    assert_eq!(decision, ReflowDecision::Deferred);
    assert!(f.engine.is_deferring());
    // The surface has not heard about 210 yet.
    assert_eq!(lock(&f.surface).len(), 1);

    f.clock.set_ms(250);
    f.queue.run_due();
    assert!(!f.engine.is_deferring());

    // The replay reports the live size as both old and new, so it re-notifies
    // the surface without scheduling another compensation.
    assert_eq!(lock(&f.surface).last(), Some(&change(320, 210, 320, 210)));
    assert_eq!(f.engine.last_size_change_ms(), Some(250));
    assert!(f.engine.state().ignore_next);
}

#[test]
fn echo_after_a_replay_is_suppressed() {
    let f = engine_fixture(0);
    f.engine.on_size_change(change(320, 200, 320, 50));
    f.clock.set_ms(50);
    f.engine.on_size_change(change(320, 210, 320, 200));
    f.clock.set_ms(250);
    f.queue.run_due();

    // The replay's own echo arrives shortly after the deferred replay ran.
    f.clock.set_ms(260);
    let decision = f.engine.on_size_change(change(320, 215, 320, 210));
    assert_eq!(decision, ReflowDecision::Suppressed);

    // Dropped on the floor: the surface heard nothing and the resize
    // timestamp still points at the replay.
    assert_eq!(lock(&f.surface).last(), Some(&change(320, 210, 320, 210)));
    assert_eq!(f.engine.last_size_change_ms(), Some(250));
    assert!(!f.engine.state().ignore_next);
    // The latest dimensions are still recorded.
    assert_eq!(f.engine.real_size(), (320, 215));
}

#[test]
fn flagged_notification_after_a_quiet_period_applies_normally() {
    let f = engine_fixture(0);
    f.engine.on_size_change(change(320, 200, 320, 50));
    f.clock.set_ms(50);
    f.engine.on_size_change(change(320, 210, 320, 200));
    f.clock.set_ms(250);
    f.queue.run_due();
    assert!(f.engine.state().ignore_next);

    // Well past the re-fire window: this is a genuine change, not an echo.
    f.clock.set_ms(600);
    let decision = f.engine.on_size_change(change(320, 400, 320, 210));
    assert_eq!(decision, ReflowDecision::Applied);
    assert!(!f.engine.state().ignore_next);
    assert_eq!(lock(&f.surface).last(), Some(&change(320, 400, 320, 210)));
}

#[test]
fn cancel_disarms_a_pending_replay() {
    let f = engine_fixture(0);
    f.engine.on_size_change(change(320, 200, 320, 50));
    f.clock.set_ms(50);
    f.engine.on_size_change(change(320, 210, 320, 200));
    assert!(f.engine.is_deferring());

    f.engine.cancel();
    assert!(!f.engine.is_deferring());
    f.clock.set_ms(1000);
    f.queue.run_due();
    // Only the initial notification ever reached the surface.
    assert_eq!(lock(&f.surface).len(), 1);
}

#[test]
fn state_snapshot_tracks_the_bookkeeping() {
    let f = engine_fixture(0);
    assert_eq!(f.engine.state(), ReflowState::default());

    f.engine.on_size_change(change(320, 200, 320, 50));
    let state = f.engine.state();
    assert_eq!(state.real_width, 320);
    assert_eq!(state.real_height, 200);
    assert_eq!(state.last_size_change_ms, Some(0));
    assert!(!state.ignore_next);
    assert!(!state.deferring);
}
