use std::time::{Duration, Instant};

use bookscout_core::models::WILDCARD_QUERY;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Holds the latest submitted value until it has been stable for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn submit(&mut self, value: T) {
        self.submit_at(value, Instant::now());
    }

    /// Replace any pending value; the quiet period restarts at `at`.
    pub fn submit_at(&mut self, value: T, at: Instant) {
        self.pending = Some((value, at));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending value if it has been quiet for `delay` as of `now`.
    pub fn poll_ready(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Sleep until the pending value is ready and take it. `None` if nothing is pending.
    pub async fn ready(&mut self) -> Option<T> {
        loop {
            let deadline = self.deadline()?;
            let now = Instant::now();
            if now >= deadline {
                return self.poll_ready(now);
            }
            tokio::time::sleep(deadline - now).await;
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

/// Empty search input means "browse everything".
pub fn query_or_wildcard(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        WILDCARD_QUERY
    } else {
        trimmed
    }
}
