use std::time::{Duration, Instant};

/// Tracks how long every submission queue has been empty.
///
/// The grading worker only recomputes ratings once the queues have stayed
/// empty for a dwell threshold; any non-empty observation resets the clock.
#[derive(Debug, Default)]
pub struct QuietWindow {
    empty_since: Option<Instant>,
}

impl QuietWindow {
    pub fn new() -> QuietWindow {
        QuietWindow::default()
    }

    /// Record an all-queues-empty observation and return how long the quiet
    /// spell has lasted.
    pub fn observe_empty(&mut self, now: Instant) -> Duration {
        let since = *self.empty_since.get_or_insert(now);
        now.saturating_duration_since(since)
    }

    /// A queue holds items again; the dwell clock starts over.
    pub fn reset(&mut self) {
        self.empty_since = None;
    }
}
