// --- File: crates/glowbook_checkout/src/hold_test.rs ---
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use glowbook_common::Reservation;
use glowbook_config::ReservationSettings;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::hold::{
    initial_seconds, HoldSnapshot, HoldStatus, ReservationHold, HOLD_EXPIRED, RESERVE_FAILED,
    VERIFY_FAILED,
};
use crate::mock_api::{slot_at, MockStudio};

fn hold_with(api: &Arc<MockStudio>) -> ReservationHold {
    ReservationHold::new(api.clone(), ReservationSettings::default())
}

async fn until(
    rx: &mut watch::Receiver<HoldSnapshot>,
    f: impl FnMut(&HoldSnapshot) -> bool,
) -> HoldSnapshot {
    rx.wait_for(f).await.expect("hold dropped").clone()
}

#[tokio::test(start_paused = true)]
async fn selecting_a_slot_reserves_verifies_and_counts_down() {
    let api = Arc::new(MockStudio::default());
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    assert_eq!(hold.snapshot().status, HoldStatus::Holding);

    let held = until(&mut rx, |s| s.status == HoldStatus::Held).await;
    assert_eq!(held.reservation.as_ref().unwrap().id, "res-1");
    assert_eq!(held.seconds_left, Some(120));
    assert_eq!(held.selected_slot, Some(slot_at(17)));
    assert!(held.held_reservation_for(&slot_at(17)).is_some());
    assert!(held.held_reservation_for(&slot_at(18)).is_none());
    assert_eq!(api.events(), vec!["reserve:1203456:2030-07-16T17:00:00+00:00", "verify:res-1"]);

    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(hold.snapshot().seconds_left, Some(117));
}

#[tokio::test(start_paused = true)]
async fn selecting_another_slot_releases_the_previous_hold_first() {
    let api = Arc::new(MockStudio::default());
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    until(&mut rx, |s| s.status == HoldStatus::Held).await;

    hold.select(slot_at(18));
    let held = until(&mut rx, |s| {
        s.status == HoldStatus::Held && s.selected_slot == Some(slot_at(18))
    })
    .await;

    assert_eq!(held.reservation.unwrap().id, "res-2");
    assert_eq!(
        api.events(),
        vec![
            "reserve:1203456:2030-07-16T17:00:00+00:00",
            "verify:res-1",
            "release:res-1",
            "reserve:1203456:2030-07-16T18:00:00+00:00",
            "verify:res-2",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn reselecting_the_held_slot_does_nothing() {
    let api = Arc::new(MockStudio::default());
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    until(&mut rx, |s| s.status == HoldStatus::Held).await;
    hold.select(slot_at(17));
    sleep(Duration::from_millis(10)).await;

    assert_eq!(api.reserve_count(), 1);
    assert!(api.releases().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reservation_is_retried_three_times_with_linear_backoff() {
    let slot = slot_at(17);
    let api = Arc::new(MockStudio::failing(&[slot.start_time]));
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot.clone());
    let failed = until(&mut rx, |s| s.status == HoldStatus::Error).await;

    assert_eq!(failed.error.as_deref(), Some(RESERVE_FAILED));
    assert_eq!(failed.selected_slot, Some(slot));
    assert!(failed.reservation.is_none());

    let times = api.reserve_times.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    let first_wait = times[1] - times[0];
    let second_wait = times[2] - times[1];
    assert!(first_wait >= Duration::from_millis(1_500) && first_wait < Duration::from_millis(1_510));
    assert!(second_wait >= Duration::from_millis(3_000) && second_wait < Duration::from_millis(3_010));

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.reserve_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn error_message_clears_after_five_seconds() {
    let slot = slot_at(17);
    let api = Arc::new(MockStudio::failing(&[slot.start_time]));
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot);
    until(&mut rx, |s| s.status == HoldStatus::Error).await;

    sleep(Duration::from_millis(4_900)).await;
    assert!(hold.snapshot().error.is_some());

    sleep(Duration::from_millis(200)).await;
    let cleared = hold.snapshot();
    assert_eq!(cleared.error, None);
    assert_eq!(cleared.status, HoldStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn new_selection_cancels_the_pending_retry() {
    let failing = slot_at(17);
    let api = Arc::new(MockStudio::failing(&[failing.start_time]));
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(failing);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(api.reserve_count(), 1);

    hold.select(slot_at(18));
    let held = until(&mut rx, |s| s.status == HoldStatus::Held).await;
    assert_eq!(held.selected_slot, Some(slot_at(18)));

    sleep(Duration::from_secs(10)).await;
    // the first slot was never retried
    assert_eq!(api.reserve_count(), 2);
    assert_eq!(hold.snapshot().status, HoldStatus::Held);
}

#[tokio::test(start_paused = true)]
async fn reservation_for_a_superseded_slot_is_released() {
    let api = Arc::new(MockStudio::default());
    *api.reserve_delay.lock().unwrap() = Some(Duration::from_secs(1));
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    sleep(Duration::from_millis(100)).await;
    hold.select(slot_at(18));

    let held = until(&mut rx, |s| s.status == HoldStatus::Held).await;
    assert_eq!(held.selected_slot, Some(slot_at(18)));
    let held_id = held.reservation.unwrap().id;

    sleep(Duration::from_millis(10)).await;
    assert_eq!(api.releases(), vec!["res-1".to_string()]);
    assert_ne!(held_id, "res-1");
    assert_eq!(hold.snapshot().selected_slot, Some(slot_at(18)));
}

#[tokio::test(start_paused = true)]
async fn failed_verification_releases_and_reports() {
    let api = Arc::new(MockStudio::default());
    api.reject_verify.store(true, Ordering::SeqCst);
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    let failed = until(&mut rx, |s| s.status == HoldStatus::Error).await;

    assert_eq!(failed.error.as_deref(), Some(VERIFY_FAILED));
    assert!(failed.reservation.is_none());
    assert_eq!(api.releases(), vec!["res-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn countdown_reaching_zero_releases_and_clears_the_slot() {
    let api = Arc::new(MockStudio::default());
    let settings = ReservationSettings {
        hold_seconds: 5,
        ..ReservationSettings::default()
    };
    let hold = ReservationHold::new(api.clone(), settings);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    let held = until(&mut rx, |s| s.status == HoldStatus::Held).await;
    assert_eq!(held.seconds_left, Some(5));

    let expired = until(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(expired.status, HoldStatus::Idle);
    assert_eq!(expired.selected_slot, None);
    assert_eq!(expired.reservation, None);
    assert_eq!(expired.error.as_deref(), Some(HOLD_EXPIRED));

    sleep(Duration::from_millis(10)).await;
    assert_eq!(api.releases(), vec!["res-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn close_releases_the_outstanding_reservation() {
    let api = Arc::new(MockStudio::default());
    let hold = hold_with(&api);
    let mut rx = hold.subscribe();

    hold.select(slot_at(17));
    until(&mut rx, |s| s.status == HoldStatus::Held).await;

    hold.close();
    assert_eq!(hold.snapshot(), HoldSnapshot::default());
    sleep(Duration::from_millis(10)).await;
    assert_eq!(api.releases(), vec!["res-1".to_string()]);

    // the countdown stopped with the close
    sleep(Duration::from_secs(200)).await;
    assert_eq!(api.releases().len(), 1);
}

#[test]
fn countdown_starts_from_the_provider_expiry() {
    let now = Utc.with_ymd_and_hms(2030, 7, 16, 16, 0, 0).unwrap();
    let mut reservation = Reservation {
        id: "r".into(),
        expires_at: Some(now + ChronoDuration::seconds(90)),
        start_time: now,
        end_time: now,
        timezone: "UTC".into(),
        event_type_id: 1,
    };
    assert_eq!(initial_seconds(&reservation, now, 120), 90);

    reservation.expires_at = Some(now - ChronoDuration::seconds(5));
    assert_eq!(initial_seconds(&reservation, now, 120), 120);

    reservation.expires_at = None;
    assert_eq!(initial_seconds(&reservation, now, 120), 120);
}
