use std::sync::Arc;

use reflow::{Clock, ManualClock, Scheduler, TaskQueue, Throttle};

fn main() {
    // Example: one coalesced fire per quiet window, clamped under pressure.
    let clock = Arc::new(ManualClock::new(0));
    let queue = Arc::new(TaskQueue::new(clock.clone() as Arc<dyn Clock>));
    let throttle = {
        let clock = Arc::clone(&clock);
        Throttle::new(
            "demo",
            200,
            300,
            clock.clone() as Arc<dyn Clock>,
            queue.clone() as Arc<dyn Scheduler>,
            move || println!("  fired at t={}", clock.now_ms()),
        )
    };

    // Events every 50 ms up to t=500, pumped every 10 ms like an event loop.
    // The first fire lands at t=300 (max-interval clamp), the second at
    // t=600.
    for t in (0u64..=1000).step_by(10) {
        clock.set_ms(t);
        queue.run_due();
        if t % 50 == 0 && t <= 500 {
            throttle.on_event();
            println!("event at t={t}, fire_at={:?}", throttle.fire_at_ms());
        }
    }
}
