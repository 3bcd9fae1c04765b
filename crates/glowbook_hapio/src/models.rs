// --- File: crates/glowbook_hapio/src/models.rs ---
//! Wire types of the Hapio REST API.
//!
//! Only the fields Glowbook reads are typed; the admin proxy forwards
//! everything else as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A paginated Hapio list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub total: Option<u32>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.meta
            .as_ref()
            .is_some_and(|m| m.current_page < m.last_page)
    }
}

/// A bookable service as Hapio stores it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HapioService {
    pub id: String,
    pub name: String,
    /// Decimal string, e.g. `"120.00"`
    #[serde(default)]
    pub price: Option<String>,
    /// ISO 8601 duration, e.g. `"PT1H30M"`
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A weekly opening window inside a recurring schedule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RecurringScheduleBlock {
    #[serde(default)]
    pub id: Option<String>,
    /// Lower-case weekday name, e.g. `"monday"`
    #[cfg_attr(feature = "openapi", schema(example = "monday"))]
    pub weekday: String,
    #[cfg_attr(feature = "openapi", schema(example = "09:00:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "17:00:00"))]
    pub end_time: String,
}

/// A one-off availability block on a resource.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ScheduleBlock {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "2025-07-15T09:00:00-07:00"))]
    pub starts_at: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-07-15T13:00:00-07:00"))]
    pub ends_at: String,
}
