/// A raw size-change notification from the embedded rendering surface.
///
/// `old_width`/`old_height` are the previously reported dimensions. The same
/// type carries accepted transitions back out through
/// [`crate::ReflowOptions::notify_surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeChange {
    pub width: u32,
    pub height: u32,
    pub old_width: u32,
    pub old_height: u32,
}

impl SizeChange {
    pub fn height_delta(&self) -> i64 {
        self.height as i64 - self.old_height as i64
    }
}

/// What the engine did with a size-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReflowDecision {
    /// The transition was forwarded to the surface immediately.
    Applied,
    /// The notification was coalesced into a pending delayed replay.
    Deferred,
    /// The notification was dropped as an echo of a recent replay.
    Suppressed,
}

/// Damping heuristics for the scheduled scroll compensation.
///
/// The defaults reproduce the tuned production behavior: growth is damped to
/// 80% and only compensated once the viewport is scrolled past
/// `top_scroll_threshold` (near the top, the right content is assumed to be
/// visible already); shrink is damped to 60% and always compensated.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompensationPolicy {
    pub top_scroll_threshold: i32,
    pub growth_damping: f64,
    pub shrink_damping: f64,
}

impl Default for CompensationPolicy {
    fn default() -> Self {
        Self {
            top_scroll_threshold: 100,
            growth_damping: 0.8,
            shrink_damping: 0.6,
        }
    }
}

/// An immutable scroll-compensation request.
///
/// Captured at the moment a genuine height change is processed and consumed
/// exactly once by the delayed scroll task. Passing a value (instead of
/// closing over live engine fields) keeps later mutations out of an in-flight
/// compensation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compensation {
    /// Scroll offset observed at decision time.
    pub scroll_y: i32,
    /// `height - old_height` at decision time.
    pub height_delta: i64,
}

impl Compensation {
    /// Resolves the vertical adjustment to apply, if any.
    ///
    /// Scaling truncates toward zero for both signs.
    pub fn scroll_delta(&self, policy: CompensationPolicy) -> Option<i32> {
        if self.height_delta > 0 {
            (self.scroll_y > policy.top_scroll_threshold)
                .then(|| (self.height_delta as f64 * policy.growth_damping) as i32)
        } else {
            Some((self.height_delta as f64 * policy.shrink_damping) as i32)
        }
    }
}

/// A lightweight snapshot of the engine's bookkeeping, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReflowState {
    /// Latest observed surface dimensions.
    pub real_width: u32,
    pub real_height: u32,
    /// Whether the next notification is a candidate echo.
    pub ignore_next: bool,
    /// When the last transition was forwarded to the surface.
    pub last_size_change_ms: Option<u64>,
    /// Whether a coalesced replay is pending in the throttle.
    pub deferring: bool,
}
