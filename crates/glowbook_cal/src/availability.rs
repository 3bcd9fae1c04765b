// --- File: crates/glowbook_cal/src/availability.rs ---
//! Groups provider slots into the day columns of the availability panel.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use crate::error::CalError;

/// Window used when the caller does not ask for one.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
/// Longest window a single request may cover.
pub const MAX_WINDOW_DAYS: u32 = 14;
/// Furthest a window may start from today.
pub const MAX_HORIZON_DAYS: i64 = 365;

/// Query parameters for the availability endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct AvailabilityQuery {
    /// Catalog slug; resolved to its Cal.com event type
    #[cfg_attr(feature = "openapi", param(example = "signature-facial"))]
    pub slug: Option<String>,
    /// Used directly when no slug is given
    pub event_type_id: Option<i64>,
    /// First day of the window, YYYY-MM-DD in the studio timezone
    #[cfg_attr(feature = "openapi", param(example = "2025-07-15"))]
    pub start: Option<String>,
    #[cfg_attr(feature = "openapi", param(example = 7))]
    pub days: Option<u32>,
}

/// One bookable start time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotOption {
    pub start_time: DateTime<Utc>,
    /// Local time label, e.g. `"10:00 AM"`
    pub label: String,
}

/// All slots of one calendar day in the studio timezone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DaySlots {
    pub date: NaiveDate,
    /// e.g. `"Tue, Jul 15"`
    pub label: String,
    pub slots: Vec<SlotOption>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    pub event_type_id: i64,
    pub timezone: String,
    pub start_date: NaiveDate,
    pub days: u32,
    pub duration_minutes: Option<u32>,
    pub slots_by_day: Vec<DaySlots>,
}

/// Resolves the requested window: the start defaults to (and never precedes)
/// `today` and may not lie beyond `MAX_HORIZON_DAYS`. The length is clamped
/// to `1..=MAX_WINDOW_DAYS`.
pub fn resolve_window(
    start: Option<&str>,
    days: Option<u32>,
    today: NaiveDate,
) -> Result<(NaiveDate, u32), CalError> {
    let start_date = match start.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            CalError::InvalidRequest("Invalid start format (YYYY-MM-DD)".to_string())
        })?,
        None => today,
    };
    let beyond_horizon = today
        .checked_add_signed(Duration::days(MAX_HORIZON_DAYS))
        .is_some_and(|horizon| start_date > horizon);
    if beyond_horizon {
        return Err(CalError::InvalidRequest(format!(
            "start must be within {} days",
            MAX_HORIZON_DAYS
        )));
    }
    let days = days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);
    Ok((start_date.max(today), days))
}

/// Buckets `slots` by their local calendar day in `tz`.
///
/// Every day of the window gets an entry, empty or not, so the panel can
/// render "no openings" columns. Slots outside the window are dropped.
pub fn group_slots_by_day(
    slots: &[DateTime<Utc>],
    tz: Tz,
    window_start: NaiveDate,
    days: u32,
) -> Vec<DaySlots> {
    // Days past the end of the calendar are left out
    let mut grouped: Vec<DaySlots> = (0..days)
        .map_while(|offset| {
            let date = window_start.checked_add_signed(Duration::days(i64::from(offset)))?;
            Some(DaySlots {
                date,
                label: date.format("%a, %b %-d").to_string(),
                slots: Vec::new(),
            })
        })
        .collect();

    let mut sorted = slots.to_vec();
    sorted.sort();
    sorted.dedup();

    for start_time in sorted {
        let local = start_time.with_timezone(&tz);
        let offset = (local.date_naive() - window_start).num_days();
        if offset < 0 || offset >= i64::from(days) {
            continue;
        }
        if let Some(day) = grouped.get_mut(offset as usize) {
            day.slots.push(SlotOption {
                start_time,
                label: local.format("%-I:%M %p").to_string(),
            });
        }
    }
    grouped
}
