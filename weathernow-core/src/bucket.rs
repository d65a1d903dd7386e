//! Hourly-forecast day-bucketing with calendar realignment.
//!
//! The forecast endpoint returns a flat week of hourly samples whose first
//! chunk is "today". Rendering wants a fixed Monday-first week, so the seven
//! 24-hour chunks are rotated until each one sits at the slot matching its
//! calendar weekday. "Today" stays reachable through the anchor slot carried
//! on the grid.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::WeatherNowError;
use crate::model::HourlySample;

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_WEEK: usize = HOURS_PER_DAY * DAYS_PER_WEEK;

/// How an hourly series shorter than a full week is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Reject anything but exactly 168 samples.
    Strict,
    /// Accept up to 168 samples; missing trailing hours become `None`.
    #[default]
    Pad,
}

/// One day slot: exactly 24 entries, `None` where the series ran short.
pub type DayHours = Vec<Option<HourlySample>>;

/// A week of hourly forecasts, slot 0 = Monday through slot 6 = Sunday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekGrid {
    days: Vec<DayHours>,
    today: Weekday,
}

impl WeekGrid {
    /// The 24 hours of the given slot (0 = Monday … 6 = Sunday).
    ///
    /// # Panics
    /// Panics if `slot >= 7`.
    pub fn day(&self, slot: usize) -> &[Option<HourlySample>] {
        &self.days[slot]
    }

    pub fn days(&self) -> impl Iterator<Item = &[Option<HourlySample>]> {
        self.days.iter().map(Vec::as_slice)
    }

    pub fn today(&self) -> Weekday {
        self.today
    }

    /// Slot holding "today"'s hours (0 = Monday).
    pub fn today_slot(&self) -> usize {
        self.today.num_days_from_monday() as usize
    }

    /// 1-indexed weekday selector a renderer should preselect (1 = Monday).
    pub fn default_day_selector(&self) -> usize {
        self.today_slot() + 1
    }
}

/// Re-bucket a flat hourly series (starting "today") into a Monday-first week.
///
/// The series is partitioned into seven contiguous 24-hour chunks and rotated
/// left by `(7 - today_index) % 7`, which places chunk 0 at the slot matching
/// today's weekday. No samples are dropped, duplicated, or reordered within a
/// chunk. Series longer than a week are rejected under every policy.
pub fn bucketize(
    samples: Vec<HourlySample>,
    today: Weekday,
    policy: LengthPolicy,
) -> Result<WeekGrid, WeatherNowError> {
    let actual = samples.len();
    let short = actual != HOURS_PER_WEEK;
    if actual > HOURS_PER_WEEK || (short && policy == LengthPolicy::Strict) {
        return Err(WeatherNowError::HourCount { expected: HOURS_PER_WEEK, actual });
    }

    let mut hours: Vec<Option<HourlySample>> = samples.into_iter().map(Some).collect();
    hours.resize(HOURS_PER_WEEK, None);

    let mut chunks: Vec<DayHours> = Vec::with_capacity(DAYS_PER_WEEK);
    let mut hours = hours.into_iter();
    for _ in 0..DAYS_PER_WEEK {
        chunks.push(hours.by_ref().take(HOURS_PER_DAY).collect());
    }

    let today_index = today.num_days_from_monday() as usize;
    let shift = (DAYS_PER_WEEK - today_index) % DAYS_PER_WEEK;
    chunks.rotate_left(shift);

    Ok(WeekGrid { days: chunks, today })
}
