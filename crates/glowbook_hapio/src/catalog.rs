// --- File: crates/glowbook_hapio/src/catalog.rs ---
//! The public services catalog.
//!
//! Services are managed in Hapio. Studio-specific fields (category, slug,
//! marketing copy, display price, Cal.com event type) live in the Hapio
//! service `metadata` object and are flattened into [`Service`] here.

use glowbook_common::services::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::client::HapioClient;
use crate::error::HapioError;
use crate::models::HapioService;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("ISO duration regex is valid")
});

/// A service as shown on the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Service {
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(example = "Signature Facial"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "signature-facial"))]
    pub slug: String,
    #[cfg_attr(feature = "openapi", schema(example = "Facials"))]
    pub category: String,
    pub summary: String,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration_minutes: u32,
    /// Display price, e.g. `"$120"` or `"From $95"`
    #[cfg_attr(feature = "openapi", schema(example = "$120"))]
    pub price: String,
    pub featured: bool,
    pub best_seller: bool,
    pub calendar_link: Option<String>,
    pub event_type_id: Option<i64>,
}

impl Service {
    /// Maps a Hapio service onto the catalog entry.
    pub fn from_hapio(service: &HapioService) -> Result<Self, HapioError> {
        let empty = serde_json::Map::new();
        let meta = service
            .metadata
            .as_ref()
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let text = |key: &str| -> Option<String> {
            meta.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let flag = |key: &str| -> bool {
            match meta.get(key) {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
                _ => false,
            }
        };

        let duration_minutes = match service.duration.as_deref() {
            Some(d) => parse_iso_duration(d)?,
            None => 0,
        };

        let price = text("display_price")
            .or_else(|| service.price.as_deref().map(format_price))
            .unwrap_or_default();

        // Accept both numbers and numeric strings; the admin editor sends strings
        let event_type_id = match meta.get("event_type_id") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        Ok(Self {
            id: service.id.clone(),
            name: service.name.clone(),
            slug: text("slug").unwrap_or_else(|| slugify(&service.name)),
            category: text("category").unwrap_or_else(|| "Services".to_string()),
            summary: text("summary").unwrap_or_default(),
            description: text("description").unwrap_or_default(),
            duration_minutes,
            price,
            featured: flag("featured"),
            best_seller: flag("best_seller"),
            calendar_link: text("calendar_link"),
            event_type_id,
        })
    }
}

/// Parses an ISO 8601 duration such as `PT1H30M` into whole minutes.
pub fn parse_iso_duration(input: &str) -> Result<u32, HapioError> {
    let invalid = || HapioError::InvalidDuration(input.to_string());
    let trimmed = input.trim();
    if trimmed == "P" || trimmed == "PT" || trimmed.ends_with('T') {
        return Err(invalid());
    }
    let caps = ISO_DURATION.captures(trimmed).ok_or_else(invalid)?;

    let part = |idx: usize| -> Result<u64, HapioError> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };
    let seconds = part(1)? * 86_400 + part(2)? * 3_600 + part(3)? * 60 + part(4)?;
    u32::try_from(seconds / 60).map_err(|_| invalid())
}

/// `"120.00"` becomes `"$120"`, `"95.5"` becomes `"$95.50"`.
fn format_price(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.fract() == 0.0 => format!("${}", value as i64),
        Ok(value) => format!("${:.2}", value),
        Err(_) => raw.trim().to_string(),
    }
}

/// Lower-case, ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Read access to the catalog; mocked in the booking and cal crates' tests.
pub trait ServiceCatalog: Send + Sync {
    fn list_services(&self) -> BoxFuture<'_, Vec<Service>, HapioError>;

    fn find_service<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Option<Service>, HapioError>;
}

/// Catalog backed by the live Hapio services list.
#[derive(Clone)]
pub struct HapioCatalog {
    client: HapioClient,
}

impl HapioCatalog {
    pub fn new(client: HapioClient) -> Self {
        Self { client }
    }

    async fn load(&self) -> Result<Vec<Service>, HapioError> {
        let services = self.client.list_services().await?;
        Ok(services
            .iter()
            .filter(|s| s.enabled)
            .filter_map(|s| match Service::from_hapio(s) {
                Ok(service) => Some(service),
                Err(e) => {
                    warn!("[Catalog] Skipping service {}: {}", s.id, e);
                    None
                }
            })
            .collect())
    }
}

impl ServiceCatalog for HapioCatalog {
    fn list_services(&self) -> BoxFuture<'_, Vec<Service>, HapioError> {
        Box::pin(self.load())
    }

    fn find_service<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Option<Service>, HapioError> {
        Box::pin(async move {
            let services = self.load().await?;
            Ok(services.into_iter().find(|s| s.slug == slug))
        })
    }
}
