use chrono::{Duration, NaiveDate};

/// Trailing lookback window ending at a reference date.
///
/// A record's validity interval counts as active when it overlaps the
/// window at all; full containment is not required. Both boundaries are
/// inclusive. The same predicate serves selling prices and promotions
/// so the two scan paths cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct LookbackWindow {
    days: i64,
}

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

impl LookbackWindow {
    pub fn new(days: i64) -> Self {
        Self { days }
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    /// Lower bound of the window ending at `today`.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days)
    }

    /// Interval-overlap test: `[valid_from, valid_to]` is active iff
    /// `valid_from <= today && valid_to >= today - days`.
    pub fn is_active(&self, valid_from: NaiveDate, valid_to: NaiveDate, today: NaiveDate) -> bool {
        valid_from <= today && valid_to >= self.start(today)
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_DAYS)
    }
}
