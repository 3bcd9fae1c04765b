// --- File: crates/glowbook_admin/src/overlap.rs ---
//! Overlap checks for schedule blocks.
//!
//! Ranges are half-open, `[start, end)`: a block ending at 12:00 and one
//! starting at 12:00 are adjacent, not overlapping. A range must end after it
//! starts.

use chrono::{DateTime, FixedOffset, NaiveTime, Weekday};
use glowbook_hapio::{RecurringScheduleBlock, ScheduleBlock};
use serde_json::Value;

use crate::error::AdminError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange<T> {
    pub start: T,
    pub end: T,
}

impl<T: Ord + Copy> TimeRange<T> {
    pub fn new(start: T, end: T) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A recurring block reduced to what the overlap check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyBlock {
    pub id: Option<String>,
    pub weekday: Weekday,
    pub range: TimeRange<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedBlock {
    pub id: Option<String>,
    pub range: TimeRange<DateTime<FixedOffset>>,
}

pub fn parse_weekday(raw: &str) -> Result<Weekday, AdminError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| AdminError::InvalidBlock(format!("Unknown weekday '{}'.", raw)))
}

/// Accepts `HH:MM:SS` and `HH:MM`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AdminError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AdminError::InvalidBlock(format!("Invalid time '{}'.", raw)))
}

pub fn parse_datetime(raw: &str) -> Result<DateTime<FixedOffset>, AdminError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| AdminError::InvalidBlock(format!("Invalid date and time '{}'.", raw)))
}

fn end_after_start() -> AdminError {
    AdminError::InvalidBlock("End time must be after start time.".to_string())
}

impl WeeklyBlock {
    pub fn from_hapio(block: &RecurringScheduleBlock) -> Result<Self, AdminError> {
        let range = TimeRange::new(parse_time(&block.start_time)?, parse_time(&block.end_time)?)
            .ok_or_else(end_after_start)?;
        Ok(Self {
            id: block.id.clone(),
            weekday: parse_weekday(&block.weekday)?,
            range,
        })
    }
}

impl DatedBlock {
    pub fn from_hapio(block: &ScheduleBlock) -> Result<Self, AdminError> {
        let range = TimeRange::new(parse_datetime(&block.starts_at)?, parse_datetime(&block.ends_at)?)
            .ok_or_else(end_after_start)?;
        Ok(Self {
            id: block.id.clone(),
            range,
        })
    }
}

/// Reads a string field of a request body, falling back to the stored block
/// for partial updates.
pub(crate) fn field<'a>(body: &'a Value, key: &str, current: Option<&'a str>) -> Result<&'a str, AdminError> {
    body.get(key)
        .and_then(Value::as_str)
        .or(current)
        .ok_or_else(|| AdminError::InvalidBlock(format!("Missing field '{}'.", key)))
}

/// The first sibling on the same weekday that the candidate overlaps. A block
/// never conflicts with itself, so updates may keep their own range.
pub fn find_weekly_conflict<'a>(
    candidate: &WeeklyBlock,
    siblings: &'a [WeeklyBlock],
) -> Option<&'a WeeklyBlock> {
    siblings.iter().find(|other| {
        !same_block(&candidate.id, &other.id)
            && other.weekday == candidate.weekday
            && other.range.overlaps(&candidate.range)
    })
}

pub fn find_dated_conflict<'a>(
    candidate: &DatedBlock,
    siblings: &'a [DatedBlock],
) -> Option<&'a DatedBlock> {
    siblings
        .iter()
        .find(|other| !same_block(&candidate.id, &other.id) && other.range.overlaps(&candidate.range))
}

fn same_block(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

pub fn check_weekly(candidate: &WeeklyBlock, siblings: &[WeeklyBlock]) -> Result<(), AdminError> {
    match find_weekly_conflict(candidate, siblings) {
        Some(other) => Err(AdminError::Overlap(format!(
            "the {} block from {} to {}",
            other.weekday,
            other.range.start.format("%H:%M"),
            other.range.end.format("%H:%M")
        ))),
        None => Ok(()),
    }
}

pub fn check_dated(candidate: &DatedBlock, siblings: &[DatedBlock]) -> Result<(), AdminError> {
    match find_dated_conflict(candidate, siblings) {
        Some(other) => Err(AdminError::Overlap(format!(
            "the block from {} to {}",
            other.range.start.format("%Y-%m-%d %H:%M"),
            other.range.end.format("%Y-%m-%d %H:%M")
        ))),
        None => Ok(()),
    }
}
