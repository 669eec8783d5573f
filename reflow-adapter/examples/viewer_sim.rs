use std::sync::Arc;

use reflow::{Clock, ManualClock, ReflowOptions, SizeChange};
use reflow_adapter::Viewer;

fn main() {
    // Example: a viewer loading a document that reflows in bursts while the
    // user sits 400 px down. Time is manual, so the session is deterministic.
    let clock = Arc::new(ManualClock::new(0));
    let options = ReflowOptions::new().with_notify_surface(Some(|c: SizeChange| {
        println!(
            "  surface: {}x{} (was {}x{})",
            c.width, c.height, c.old_width, c.old_height
        );
    }));
    let viewer = Viewer::with_clock(options, clock.clone() as Arc<dyn Clock>);
    viewer.scroll().set_offset(0, 400);

    let notifications = [
        (0u64, 320u32, 800u32, 320u32, 200u32),
        (40, 320, 860, 320, 800),
        (90, 320, 900, 320, 860),
        (600, 320, 650, 320, 900),
    ];
    for (t, w, h, ow, oh) in notifications {
        clock.set_ms(t);
        viewer.pump();
        let decision = viewer.on_size_change(w, h, ow, oh);
        println!(
            "t={t} {ow}x{oh} -> {w}x{h}: {decision:?} scroll_y={}",
            viewer.scroll().offset().1
        );
    }

    for t in (600u64..=1200).step_by(50) {
        clock.set_ms(t);
        if viewer.pump() > 0 {
            println!("t={t} pumped, scroll_y={}", viewer.scroll().offset().1);
        }
    }
    println!("final scroll_y={}", viewer.scroll().offset().1);
}
