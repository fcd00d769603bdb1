use std::time::Duration;
use std::time::Instant;

/// Trailing-edge debounce without a timer: each [`submit`](Debounce::submit) replaces the
/// pending value and pushes the deadline out by the quiet window, and the host polls with
/// the current time. Only the last value submitted inside a quiet window is ever returned.
///
/// There is deliberately no leading edge and no timer API here; the crate is event-loop
/// agnostic, so the host decides when to call [`poll`](Debounce::poll) (typically once per
/// frame, or after sleeping until [`deadline`](Debounce::deadline)).
#[derive(Clone, Debug)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace any pending value and reschedule the deadline to `now + quiet`.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Take the pending value if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
