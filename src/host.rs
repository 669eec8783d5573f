/// The surrounding scrollable container an engine compensates against.
///
/// Implementations are shared into delayed compensation tasks, so both
/// methods take `&self`; a host that tracks real scroll state does so through
/// interior mutability.
pub trait ScrollHost: Send + Sync {
    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> i32;

    /// Scrolls by a relative delta.
    fn scroll_by(&self, dx: i32, dy: i32);
}
