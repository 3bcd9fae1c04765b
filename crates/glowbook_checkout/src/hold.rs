// --- File: crates/glowbook_checkout/src/hold.rs ---
//! Short-lived hold on the slot a client picked.
//!
//! Each selection gets one driver task that reserves the slot (with linear
//! backoff), verifies the reservation and then counts down to its expiry.
//! A newer selection or [`ReservationHold::close`] stops the driver through
//! its `Notify`; results that arrive for a superseded selection are dropped
//! and any reservation they created is released.
//!
//! Observers read [`HoldSnapshot`]s from a `watch` channel.

use chrono::{DateTime, Utc};
use glowbook_common::{Reservation, SlotSelection};
use glowbook_config::ReservationSettings;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::StudioApi;

pub const RESERVE_FAILED: &str = "We couldn't hold this time. Please pick another time.";
pub const VERIFY_FAILED: &str =
    "We couldn't confirm your hold on this time. Please pick a time again.";
pub const HOLD_EXPIRED: &str = "Your hold on this time has expired. Please pick a time again.";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    #[default]
    Idle,
    /// Reservation request in flight or waiting to retry
    Holding,
    /// Reserved, verified and counting down
    Held,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct HoldSnapshot {
    pub status: HoldStatus,
    pub selected_slot: Option<SlotSelection>,
    pub reservation: Option<Reservation>,
    pub seconds_left: Option<u64>,
    pub error: Option<String>,
}

impl HoldSnapshot {
    /// The verified reservation, when it holds exactly `slot`.
    pub fn held_reservation_for(&self, slot: &SlotSelection) -> Option<&Reservation> {
        if self.status != HoldStatus::Held {
            return None;
        }
        self.reservation.as_ref().filter(|r| r.matches(slot))
    }
}

/// Seconds until `expires_at`, or `default` when the provider sent no expiry
/// or one that already passed.
pub fn initial_seconds(reservation: &Reservation, now: DateTime<Utc>, default: u64) -> u64 {
    reservation
        .expires_at
        .map(|exp| (exp - now).num_seconds())
        .filter(|secs| *secs > 0)
        .map_or(default, |secs| secs as u64)
}

struct HoldState {
    snapshot: HoldSnapshot,
    /// Bumped on every selection and on close
    selection: u64,
    cancel: Option<Arc<Notify>>,
    /// Bumped on every error so an old clear timer leaves a newer error alone
    error_seq: u64,
}

struct Shared {
    api: Arc<dyn StudioApi>,
    settings: ReservationSettings,
    state: Mutex<HoldState>,
    snapshots: watch::Sender<HoldSnapshot>,
}

/// Resolves to `false` when `cancel` fires before `delay` elapses.
async fn wait(cancel: &Notify, delay: Duration) -> bool {
    tokio::select! {
        _ = cancel.notified() => false,
        _ = sleep(delay) => true,
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HoldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &HoldState) {
        self.snapshots.send_replace(state.snapshot.clone());
    }

    fn is_current(&self, selection: u64) -> bool {
        self.lock().selection == selection
    }

    /// Runs `update` and publishes, unless `selection` was superseded.
    fn update_if_current(&self, selection: u64, update: impl FnOnce(&mut HoldState)) -> bool {
        let mut state = self.lock();
        if state.selection != selection {
            return false;
        }
        update(&mut state);
        self.publish(&state);
        true
    }

    /// Sets the error message and schedules it to clear.
    fn set_error(self: &Arc<Self>, state: &mut HoldState, message: &str) {
        state.error_seq += 1;
        state.snapshot.error = Some(message.to_string());

        let seq = state.error_seq;
        let delay = Duration::from_millis(self.settings.error_clear_ms);
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            sleep(delay).await;
            let mut state = shared.lock();
            if state.error_seq != seq || state.snapshot.error.is_none() {
                return;
            }
            state.snapshot.error = None;
            if state.snapshot.status == HoldStatus::Error {
                state.snapshot.status = HoldStatus::Idle;
            }
            shared.publish(&state);
        });
    }

    async fn release_quietly(&self, reservation_id: &str) {
        match self.api.release_reservation(reservation_id).await {
            Ok(()) => debug!(reservation_id, "[Checkout] Released hold"),
            Err(e) => warn!(reservation_id, "[Checkout] Could not release hold: {}", e),
        }
    }

    fn release_in_background(self: &Arc<Self>, reservation_id: String) {
        let Ok(handle) = Handle::try_current() else {
            warn!(reservation_id = %reservation_id, "[Checkout] No runtime left to release hold");
            return;
        };
        let shared = Arc::clone(self);
        handle.spawn(async move { shared.release_quietly(&reservation_id).await });
    }

    async fn drive(
        self: Arc<Self>,
        selection: u64,
        slot: SlotSelection,
        cancel: Arc<Notify>,
        previous: Option<Reservation>,
    ) {
        if let Some(previous) = previous {
            self.release_quietly(&previous.id).await;
        }
        if let Some(reservation) = self.acquire(selection, &slot, &cancel).await {
            self.count_down(selection, &reservation, &cancel).await;
        }
    }

    /// Reserves and verifies `slot`; on success the hold is `Held`.
    async fn acquire(
        self: &Arc<Self>,
        selection: u64,
        slot: &SlotSelection,
        cancel: &Notify,
    ) -> Option<Reservation> {
        let attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        let reservation = loop {
            if !self.is_current(selection) {
                return None;
            }
            match self.api.reserve(slot).await {
                Ok(reservation) => break reservation,
                Err(e) if attempt < attempts => {
                    let delay = Duration::from_millis(self.settings.backoff_ms * u64::from(attempt));
                    warn!(
                        attempt,
                        "[Checkout] Reserving {} failed, retrying in {:?}: {}",
                        slot.slot_key(),
                        delay,
                        e
                    );
                    if !wait(cancel, delay).await {
                        debug!("[Checkout] Retry for {} cancelled", slot.slot_key());
                        return None;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, "[Checkout] Giving up on {}: {}", slot.slot_key(), e);
                    self.update_if_current(selection, |state| {
                        state.snapshot.status = HoldStatus::Error;
                        self.set_error(state, RESERVE_FAILED);
                    });
                    return None;
                }
            }
        };

        if !self.is_current(selection) {
            info!(reservation_id = %reservation.id, "[Checkout] Releasing hold of superseded slot {}", slot.slot_key());
            self.release_quietly(&reservation.id).await;
            return None;
        }

        let verified = match self.api.verify_reservation(&reservation.id).await {
            Ok(verified) if verified.matches(slot) => Some(verified),
            Ok(_) => {
                warn!(reservation_id = %reservation.id, "[Checkout] Reservation holds a different slot");
                None
            }
            Err(e) => {
                warn!(reservation_id = %reservation.id, "[Checkout] Reservation did not verify: {}", e);
                None
            }
        };
        let Some(verified) = verified else {
            self.release_quietly(&reservation.id).await;
            self.update_if_current(selection, |state| {
                state.snapshot.status = HoldStatus::Error;
                state.snapshot.reservation = None;
                self.set_error(state, VERIFY_FAILED);
            });
            return None;
        };

        let seconds = initial_seconds(&verified, Utc::now(), self.settings.hold_seconds);
        let held = self.update_if_current(selection, |state| {
            state.snapshot.status = HoldStatus::Held;
            state.snapshot.reservation = Some(verified.clone());
            state.snapshot.seconds_left = Some(seconds);
            state.snapshot.error = None;
        });
        if !held {
            self.release_quietly(&verified.id).await;
            return None;
        }
        info!(reservation_id = %verified.id, "[Checkout] Holding {} for {}s", slot.slot_key(), seconds);
        Some(verified)
    }

    async fn count_down(self: &Arc<Self>, selection: u64, reservation: &Reservation, cancel: &Notify) {
        let period = Duration::from_secs(1);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.notified() => return,
                _ = ticker.tick() => {}
            }

            let mut expired = false;
            let current = self.update_if_current(selection, |state| {
                let left = state.snapshot.seconds_left.unwrap_or(0).saturating_sub(1);
                state.snapshot.seconds_left = Some(left);
                if left == 0 {
                    expired = true;
                    state.cancel = None;
                    state.snapshot = HoldSnapshot::default();
                    self.set_error(state, HOLD_EXPIRED);
                }
            });
            if !current {
                return;
            }
            if expired {
                info!(reservation_id = %reservation.id, "[Checkout] Hold expired");
                self.release_quietly(&reservation.id).await;
                return;
            }
        }
    }
}

/// Client-side hold on one slot at a time.
///
/// Dropping the hold releases the outstanding reservation, like [`close`](Self::close).
pub struct ReservationHold {
    shared: Arc<Shared>,
}

impl ReservationHold {
    pub fn new(api: Arc<dyn StudioApi>, settings: ReservationSettings) -> Self {
        let (snapshots, _) = watch::channel(HoldSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                api,
                settings,
                state: Mutex::new(HoldState {
                    snapshot: HoldSnapshot::default(),
                    selection: 0,
                    cancel: None,
                    error_seq: 0,
                }),
                snapshots,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HoldSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> HoldSnapshot {
        self.shared.lock().snapshot.clone()
    }

    /// Starts holding `slot`. The previous reservation, if any, is released
    /// before the new one is requested. Reselecting the slot that is already
    /// being held is a no-op.
    pub fn select(&self, slot: SlotSelection) {
        let shared = &self.shared;
        let (selection, cancel, previous) = {
            let mut state = shared.lock();
            let active = matches!(
                state.snapshot.status,
                HoldStatus::Holding | HoldStatus::Held
            );
            if active && state.snapshot.selected_slot.as_ref() == Some(&slot) {
                debug!("[Checkout] {} already selected", slot.slot_key());
                return;
            }

            if let Some(cancel) = state.cancel.take() {
                cancel.notify_one();
            }
            state.selection += 1;
            let cancel = Arc::new(Notify::new());
            state.cancel = Some(Arc::clone(&cancel));
            let previous = state.snapshot.reservation.take();
            state.snapshot = HoldSnapshot {
                status: HoldStatus::Holding,
                selected_slot: Some(slot.clone()),
                ..HoldSnapshot::default()
            };
            shared.publish(&state);
            (state.selection, cancel, previous)
        };

        info!("[Checkout] Selected {}", slot.slot_key());
        tokio::spawn(Arc::clone(shared).drive(selection, slot, cancel, previous));
    }

    /// Stops any pending work and releases the outstanding reservation.
    pub fn close(&self) {
        let shared = &self.shared;
        let previous = {
            let mut state = shared.lock();
            if let Some(cancel) = state.cancel.take() {
                cancel.notify_one();
            }
            state.selection += 1;
            let previous = state.snapshot.reservation.take();
            state.snapshot = HoldSnapshot::default();
            shared.publish(&state);
            previous
        };
        if let Some(reservation) = previous {
            info!(reservation_id = %reservation.id, "[Checkout] Closing hold");
            shared.release_in_background(reservation.id);
        }
    }
}

impl Drop for ReservationHold {
    fn drop(&mut self) {
        self.close();
    }
}
