// --- File: crates/careslot_booking/src/grid.rs ---
//! The daily grid of bookable ranges.
//!
//! A [`TimeRange`] is a half-open wall-clock interval on a civil date, kept
//! as minutes since local midnight so that `24:00` can close the last block.
//! The [`Catalog`] is the ordered set of one-hour ranges derived from the
//! configured morning and afternoon blocks.

use careslot_common::{internal_error, validation_error, CareslotError};
use careslot_config::HourBlock;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid range '{0}', expected HH:MM-HH:MM")]
    InvalidFormat(String),
    #[error("invalid range '{0}', end must be after start")]
    InvalidBounds(String),
    #[error("invalid hour block {start}..{end}")]
    InvalidBlock { start: u32, end: u32 },
}

impl From<GridError> for CareslotError {
    fn from(err: GridError) -> Self {
        validation_error(err)
    }
}

/// Strict half-open overlap: `[a_start, a_end)` and `[b_start, b_end)` share
/// at least one point. Touching intervals do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A half-open wall-clock interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeRange {
    start: u16,
    end: u16,
}

impl TimeRange {
    /// Builds a range from minutes since local midnight.
    pub fn new(start: u16, end: u16) -> Result<Self, GridError> {
        if start >= end || end > MINUTES_PER_DAY {
            return Err(GridError::InvalidBounds(format!(
                "{}-{}",
                format_minutes(start),
                format_minutes(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds a range on whole hours.
    pub fn hours(start_hour: u16, end_hour: u16) -> Result<Self, GridError> {
        Self::new(start_hour * 60, end_hour * 60)
    }

    pub fn start_minutes(&self) -> u16 {
        self.start
    }

    pub fn end_minutes(&self) -> u16 {
        self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Converts the range on `date` in `time_zone` to UTC instants.
    ///
    /// Returns `None` when a bound does not exist on that date, which can
    /// only happen inside a DST gap.
    pub fn instants(&self, date: NaiveDate, time_zone: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((
            local_instant(date, self.start, time_zone)?,
            local_instant(date, self.end, time_zone)?,
        ))
    }

    /// Like [`TimeRange::instants`], reported as an internal error when unmappable.
    pub fn instants_or_err(
        &self,
        date: NaiveDate,
        time_zone: &Tz,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), CareslotError> {
        self.instants(date, time_zone).ok_or_else(|| {
            internal_error(format!(
                "range {} does not exist on {} in {}",
                self,
                date,
                time_zone.name()
            ))
        })
    }
}

fn local_instant(date: NaiveDate, minutes: u16, time_zone: &Tz) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(0, 0, 0)? + Duration::minutes(i64::from(minutes));
    time_zone
        .from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn parse_minutes(input: &str) -> Option<u16> {
    let (hours, minutes) = input.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_minutes(self.start), format_minutes(self.end))
    }
}

impl FromStr for TimeRange {
    type Err = GridError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (start, end) = input
            .split_once('-')
            .ok_or_else(|| GridError::InvalidFormat(input.to_string()))?;
        let start = parse_minutes(start).ok_or_else(|| GridError::InvalidFormat(input.to_string()))?;
        let end = parse_minutes(end).ok_or_else(|| GridError::InvalidFormat(input.to_string()))?;
        Self::new(start, end).map_err(|_| GridError::InvalidBounds(input.trim().to_string()))
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The ordered set of bookable one-hour ranges for any business day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ranges: Vec<TimeRange>,
}

impl Catalog {
    /// One range per whole hour of each block, blocks in the given order.
    pub fn from_blocks(blocks: &[HourBlock]) -> Result<Self, GridError> {
        let mut ranges = Vec::new();
        for block in blocks {
            if block.start_hour >= block.end_hour || block.end_hour > 24 {
                return Err(GridError::InvalidBlock {
                    start: block.start_hour,
                    end: block.end_hour,
                });
            }
            for hour in block.start_hour..block.end_hour {
                // Bounded by 24 above.
                ranges.push(TimeRange::hours(hour as u16, hour as u16 + 1)?);
            }
        }
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, range: &TimeRange) -> bool {
        self.ranges.contains(range)
    }

    pub fn position(&self, range: &TimeRange) -> Option<usize> {
        self.ranges.iter().position(|candidate| candidate == range)
    }
}

/// Sorts ranges and merges touching neighbours (`a.end == b.start`).
pub fn merge_adjacent(ranges: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort();

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if last.end >= range.start => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}
