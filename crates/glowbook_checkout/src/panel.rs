// --- File: crates/glowbook_checkout/src/panel.rs ---
//! Paging state of the availability panel.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use glowbook_cal::{AvailabilityResponse, DaySlots, SlotOption};
use glowbook_common::SlotSelection;
use std::sync::Arc;
use tracing::debug;

use crate::api::{AvailabilityRequest, StudioApi};
use crate::error::CheckoutError;

/// Viewports narrower than this show the compact window.
pub const COMPACT_BREAKPOINT_PX: u32 = 768;
pub const COMPACT_WINDOW_DAYS: u32 = 3;
pub const WIDE_WINDOW_DAYS: u32 = 7;

pub fn window_days(viewport_width: u32) -> u32 {
    if viewport_width < COMPACT_BREAKPOINT_PX {
        COMPACT_WINDOW_DAYS
    } else {
        WIDE_WINDOW_DAYS
    }
}

/// Today's date in the studio timezone.
pub fn studio_today(timezone: &str, now: DateTime<Utc>) -> Result<NaiveDate, CheckoutError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| CheckoutError::ConfigError(format!("unknown timezone '{}'", timezone)))?;
    Ok(now.with_timezone(&tz).date_naive())
}

pub struct AvailabilityPanel {
    api: Arc<dyn StudioApi>,
    slug: String,
    today: NaiveDate,
    start: NaiveDate,
    days: u32,
    /// Slug and start of the loaded page
    loaded: Option<(String, NaiveDate)>,
    current: Option<AvailabilityResponse>,
}

impl AvailabilityPanel {
    pub fn new(
        api: Arc<dyn StudioApi>,
        slug: impl Into<String>,
        viewport_width: u32,
        today: NaiveDate,
    ) -> Self {
        Self {
            api,
            slug: slug.into(),
            today,
            start: today,
            days: window_days(viewport_width),
            loaded: None,
            current: None,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn current(&self) -> Option<&AvailabilityResponse> {
        self.current.as_ref()
    }

    /// Adjusts the window for the next page. The loaded page stays as is.
    pub fn resize(&mut self, viewport_width: u32) {
        self.days = window_days(viewport_width);
    }

    /// Moves the date the panel clamps to, e.g. after midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.start = self.start.max(today);
    }

    /// Switches service; the page is kept.
    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slug.to_string();
    }

    pub fn next_page(&mut self) {
        self.start += Duration::days(i64::from(self.days));
    }

    pub fn previous_page(&mut self) {
        self.start = (self.start - Duration::days(i64::from(self.days))).max(self.today);
    }

    pub fn can_go_back(&self) -> bool {
        self.start > self.today
    }

    /// Fetches the page when the slug or start changed since the last load.
    pub async fn load(&mut self) -> Result<&AvailabilityResponse, CheckoutError> {
        let key = (self.slug.clone(), self.start);
        let stale = self.loaded.as_ref() != Some(&key) || self.current.is_none();
        if stale {
            let request = AvailabilityRequest {
                slug: self.slug.clone(),
                start: self.start.format("%Y-%m-%d").to_string(),
                days: self.days,
            };
            debug!("[Checkout] Loading {} days of {} from {}", request.days, request.slug, request.start);
            let response = self.api.availability(&request).await?;
            self.loaded = Some(key);
            self.current = Some(response);
        }
        self.current
            .as_ref()
            .ok_or_else(|| CheckoutError::ConfigError("availability not loaded".to_string()))
    }

    /// The selection handed to the hold when the client picks `option`.
    pub fn selection(
        &self,
        day: &DaySlots,
        option: &SlotOption,
        fallback_duration: u32,
    ) -> Option<SlotSelection> {
        let page = self.current.as_ref()?;
        Some(SlotSelection {
            start_time: option.start_time,
            event_type_id: page.event_type_id,
            timezone: page.timezone.clone(),
            duration: page.duration_minutes.unwrap_or(fallback_duration),
            label: format!("{} · {}", day.label, option.label),
        })
    }
}
