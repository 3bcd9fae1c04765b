// --- File: crates/glowbook_common/src/models.rs ---
//! Value objects that travel between the session-side checkout, the public
//! API and the booking crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A calendar slot the client picked in the availability panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotSelection {
    #[cfg_attr(feature = "openapi", schema(example = "2025-07-15T17:00:00Z"))]
    pub start_time: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(example = 1203456))]
    pub event_type_id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "America/Los_Angeles"))]
    pub timezone: String,
    /// Duration in minutes
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration: u32,
    #[cfg_attr(feature = "openapi", schema(example = "Tue, Jul 15 · 10:00 AM"))]
    pub label: String,
}

impl SlotSelection {
    /// Identity of the slot, used to discard responses for a superseded selection.
    pub fn slot_key(&self) -> String {
        format!("{}:{}", self.event_type_id, self.start_time.to_rfc3339())
    }
}

/// A short-lived hold on a slot, owned by the scheduling provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Reservation {
    #[cfg_attr(feature = "openapi", schema(example = "e84be5a3-4696-49e3-acc7-b2f3999c3b94"))]
    pub id: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub event_type_id: i64,
}

impl Reservation {
    /// True when this reservation holds exactly the given slot.
    pub fn matches(&self, slot: &SlotSelection) -> bool {
        self.start_time == slot.start_time && self.event_type_id == slot.event_type_id
    }
}

/// Contact details collected by every booking and subscribe form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ContactDetails {
    #[cfg_attr(feature = "openapi", schema(example = "Dana Reyes"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "dana@example.com"))]
    pub email: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "+1 415 555 0134"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot() -> SlotSelection {
        SlotSelection {
            start_time: Utc.with_ymd_and_hms(2025, 7, 15, 17, 0, 0).unwrap(),
            event_type_id: 42,
            timezone: "America/Los_Angeles".into(),
            duration: 60,
            label: "10:00 AM".into(),
        }
    }

    #[test]
    fn slot_key_combines_event_type_and_start() {
        assert_eq!(slot().slot_key(), "42:2025-07-15T17:00:00+00:00");
    }

    #[test]
    fn reservation_matches_only_its_slot() {
        let s = slot();
        let reservation = Reservation {
            id: "r1".into(),
            expires_at: None,
            start_time: s.start_time,
            end_time: s.start_time + chrono::Duration::minutes(60),
            timezone: s.timezone.clone(),
            event_type_id: 42,
        };
        assert!(reservation.matches(&s));

        let mut other = s.clone();
        other.start_time = other.start_time + chrono::Duration::minutes(30);
        assert!(!reservation.matches(&other));
    }
}
