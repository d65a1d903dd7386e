//! Interaction-session state shared between the algorithms and a front end.
//!
//! Two small pieces of deliberately pure state:
//!
//! - [`SearchSession`] hands out monotone generation tokens so a front end
//!   can discard suggestion responses that a newer keystroke has superseded
//!   (last-request-wins, no timer primitives involved).
//! - [`ForecastGate`] suppresses a duplicate forecast fetch when the same
//!   place (or the same no-result search string) is submitted twice in a row.

use std::time::Duration;

/// Minimum search-input length before suggestions fire.
pub const MIN_QUERY_LEN: usize = 3;

/// Fixed delay between the last edit and the suggestion request.
pub const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(750);

/// Marker for one suggestion request; only the newest one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Tracks the most recent suggestion request of a search session.
#[derive(Debug, Default)]
pub struct SearchSession {
    current: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new suggestion request, superseding all outstanding ones.
    pub fn begin(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Whether a response carrying this token may still be applied.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }
}

/// What a forecast fetch was keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKey {
    /// A resolved place, identified by its upstream record id.
    Place(u64),
    /// A search string that produced no result.
    Query(String),
}

/// Suppresses refetching when the same key is submitted twice in a row.
#[derive(Debug, Default)]
pub struct ForecastGate {
    last: Option<FetchKey>,
}

impl ForecastGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` and report whether a fetch should proceed. Returns
    /// `false` only when `key` equals the previously recorded one.
    pub fn should_fetch(&mut self, key: FetchKey) -> bool {
        if self.last.as_ref() == Some(&key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    /// Forget the recorded key after a failed fetch, so an explicit retry
    /// of the same place actually refetches.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
