use std::fmt;
use std::sync::Arc;

use crate::{CompensationPolicy, SizeChange};

/// Callback through which accepted size transitions reach the underlying
/// rendering surface.
pub type SurfaceCallback = Arc<dyn Fn(SizeChange) + Send + Sync>;

/// Configuration for [`crate::Reflow`].
///
/// The defaults reproduce the tuned production behavior: a 200 ms re-fire
/// window, a 300 ms cap on coalescing, and a 300 ms compensation delay.
#[derive(Clone)]
pub struct ReflowOptions {
    /// Minimum quiet time between size changes. A notification arriving
    /// sooner than this after the last applied transition is coalesced (or,
    /// for a flagged echo, dropped).
    pub min_resize_interval_ms: u64,

    /// Upper bound on how long a coalesced burst may defer its replay,
    /// measured from the first coalesced event.
    pub max_resize_interval_ms: u64,

    /// Delay before a captured compensation is applied to the scroll host.
    pub compensation_delay_ms: u64,

    /// Damping heuristics for the compensation distance.
    pub compensation_policy: CompensationPolicy,

    /// Accepted transitions are forwarded here (the rendering surface).
    pub notify_surface: Option<SurfaceCallback>,
}

impl ReflowOptions {
    pub fn new() -> Self {
        Self {
            min_resize_interval_ms: 200,
            max_resize_interval_ms: 300,
            compensation_delay_ms: 300,
            compensation_policy: CompensationPolicy::default(),
            notify_surface: None,
        }
    }

    pub fn with_min_resize_interval_ms(mut self, min_resize_interval_ms: u64) -> Self {
        self.min_resize_interval_ms = min_resize_interval_ms;
        self
    }

    pub fn with_max_resize_interval_ms(mut self, max_resize_interval_ms: u64) -> Self {
        self.max_resize_interval_ms = max_resize_interval_ms;
        self
    }

    pub fn with_compensation_delay_ms(mut self, compensation_delay_ms: u64) -> Self {
        self.compensation_delay_ms = compensation_delay_ms;
        self
    }

    pub fn with_compensation_policy(mut self, compensation_policy: CompensationPolicy) -> Self {
        self.compensation_policy = compensation_policy;
        self
    }

    pub fn with_notify_surface(
        mut self,
        notify_surface: Option<impl Fn(SizeChange) + Send + Sync + 'static>,
    ) -> Self {
        self.notify_surface = notify_surface.map(|f| Arc::new(f) as _);
        self
    }
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReflowOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflowOptions")
            .field("min_resize_interval_ms", &self.min_resize_interval_ms)
            .field("max_resize_interval_ms", &self.max_resize_interval_ms)
            .field("compensation_delay_ms", &self.compensation_delay_ms)
            .field("compensation_policy", &self.compensation_policy)
            .finish_non_exhaustive()
    }
}
