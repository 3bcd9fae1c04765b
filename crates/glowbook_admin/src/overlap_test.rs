// --- File: crates/glowbook_admin/src/overlap_test.rs ---
use chrono::{NaiveTime, Weekday};
use glowbook_hapio::{RecurringScheduleBlock, ScheduleBlock};
use proptest::prelude::*;

use crate::error::AdminError;
use crate::overlap::*;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn weekly(id: &str, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> WeeklyBlock {
    WeeklyBlock {
        id: Some(id.to_string()),
        weekday,
        range: TimeRange::new(start, end).unwrap(),
    }
}

fn candidate(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> WeeklyBlock {
    WeeklyBlock {
        id: None,
        weekday,
        range: TimeRange::new(start, end).unwrap(),
    }
}

#[test]
fn same_weekday_overlap_is_rejected() {
    let siblings = vec![weekly("b1", Weekday::Mon, t(9, 0), t(12, 0))];
    let err = check_weekly(&candidate(Weekday::Mon, t(11, 0), t(14, 0)), &siblings).unwrap_err();
    assert!(matches!(err, AdminError::Overlap(msg) if msg == "the Mon block from 09:00 to 12:00"));
}

#[test]
fn adjacent_and_other_weekday_ranges_are_allowed() {
    let siblings = vec![weekly("b1", Weekday::Mon, t(9, 0), t(12, 0))];
    assert!(check_weekly(&candidate(Weekday::Mon, t(12, 0), t(17, 0)), &siblings).is_ok());
    assert!(check_weekly(&candidate(Weekday::Mon, t(7, 0), t(9, 0)), &siblings).is_ok());
    assert!(check_weekly(&candidate(Weekday::Tue, t(10, 0), t(11, 0)), &siblings).is_ok());
}

#[test]
fn updating_a_block_ignores_its_stored_range() {
    let siblings = vec![
        weekly("b1", Weekday::Mon, t(9, 0), t(12, 0)),
        weekly("b2", Weekday::Mon, t(13, 0), t(17, 0)),
    ];
    let widened = weekly("b1", Weekday::Mon, t(8, 0), t(12, 30));
    assert!(check_weekly(&widened, &siblings).is_ok());
    let too_wide = weekly("b1", Weekday::Mon, t(8, 0), t(13, 30));
    assert!(check_weekly(&too_wide, &siblings).is_err());
}

#[test]
fn end_must_follow_start() {
    assert!(TimeRange::new(t(9, 0), t(9, 0)).is_none());
    let block = RecurringScheduleBlock {
        id: None,
        weekday: "friday".into(),
        start_time: "17:00".into(),
        end_time: "09:00:00".into(),
    };
    assert!(matches!(
        WeeklyBlock::from_hapio(&block),
        Err(AdminError::InvalidBlock(msg)) if msg == "End time must be after start time."
    ));
}

#[test]
fn hapio_fields_are_parsed() {
    let block = RecurringScheduleBlock {
        id: Some("b9".into()),
        weekday: "Wednesday".into(),
        start_time: "09:30".into(),
        end_time: "17:00:00".into(),
    };
    let parsed = WeeklyBlock::from_hapio(&block).unwrap();
    assert_eq!(parsed.weekday, Weekday::Wed);
    assert_eq!(parsed.range.start, t(9, 30));
    assert!(parse_weekday("someday").is_err());
    assert!(parse_time("25:00").is_err());
}

#[test]
fn dated_blocks_compare_instants_across_offsets() {
    let existing = DatedBlock::from_hapio(&ScheduleBlock {
        id: Some("s1".into()),
        location_id: None,
        starts_at: "2025-07-15T09:00:00-07:00".into(),
        ends_at: "2025-07-15T13:00:00-07:00".into(),
    })
    .unwrap();
    // 20:00Z is 13:00 in Los Angeles: adjacent
    let adjacent = DatedBlock::from_hapio(&ScheduleBlock {
        id: None,
        location_id: None,
        starts_at: "2025-07-15T20:00:00Z".into(),
        ends_at: "2025-07-15T22:00:00Z".into(),
    })
    .unwrap();
    assert!(check_dated(&adjacent, std::slice::from_ref(&existing)).is_ok());

    let overlapping = DatedBlock::from_hapio(&ScheduleBlock {
        id: None,
        location_id: None,
        starts_at: "2025-07-15T19:59:00Z".into(),
        ends_at: "2025-07-15T22:00:00Z".into(),
    })
    .unwrap();
    assert!(matches!(
        check_dated(&overlapping, &[existing]),
        Err(AdminError::Overlap(_))
    ));
}

fn minutes(m: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(m * 60, 0).unwrap()
}

proptest! {
    #[test]
    fn overlap_matches_shared_minutes(a in 0u32..1439, la in 1u32..600, b in 0u32..1439, lb in 1u32..600) {
        let (a_end, b_end) = ((a + la).min(1439), (b + lb).min(1439));
        prop_assume!(a_end > a && b_end > b);
        let first = TimeRange::new(minutes(a), minutes(a_end)).unwrap();
        let second = TimeRange::new(minutes(b), minutes(b_end)).unwrap();
        let shares_a_minute = (a..a_end).any(|m| m >= b && m < b_end);
        prop_assert_eq!(first.overlaps(&second), shares_a_minute);
        prop_assert_eq!(first.overlaps(&second), second.overlaps(&first));
    }

    #[test]
    fn back_to_back_ranges_never_overlap(start in 0u32..1000, first in 1u32..200, second in 1u32..200) {
        let mid = start + first;
        let end = mid + second;
        let before = TimeRange::new(minutes(start), minutes(mid)).unwrap();
        let after = TimeRange::new(minutes(mid), minutes(end)).unwrap();
        prop_assert!(!before.overlaps(&after));
    }
}
