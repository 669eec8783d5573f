use std::sync::atomic::{AtomicI32, Ordering};

use reflow::ScrollHost;

/// A minimal, framework-neutral scroll position.
///
/// Stands in for a real scroll container in tests, simulations, and
/// embeddings that model scroll state themselves. Offsets are floored at 0,
/// like a container clamped at its top edge. There is no content-length
/// clamp: the embedding layer knows the content size, this model does not.
#[derive(Debug, Default)]
pub struct ScrollModel {
    x: AtomicI32,
    y: AtomicI32,
}

impl ScrollModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(x: i32, y: i32) -> Self {
        Self {
            x: AtomicI32::new(x.max(0)),
            y: AtomicI32::new(y.max(0)),
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.x.load(Ordering::SeqCst), self.y.load(Ordering::SeqCst))
    }

    pub fn set_offset(&self, x: i32, y: i32) {
        self.x.store(x.max(0), Ordering::SeqCst);
        self.y.store(y.max(0), Ordering::SeqCst);
    }
}

impl ScrollHost for ScrollModel {
    fn scroll_offset(&self) -> i32 {
        self.y.load(Ordering::SeqCst)
    }

    fn scroll_by(&self, dx: i32, dy: i32) {
        let x = self.x.load(Ordering::SeqCst).saturating_add(dx).max(0);
        let y = self.y.load(Ordering::SeqCst).saturating_add(dy).max(0);
        self.x.store(x, Ordering::SeqCst);
        self.y.store(y, Ordering::SeqCst);
    }
}
