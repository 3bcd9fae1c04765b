// --- File: crates/glowbook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the environment variable named after the config path.
pub const SECRET_MARKER: &str = "secret_from_env";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: Option<String>,
    /// When set, logs are also written to daily files in this directory
    pub directory: Option<String>,
}

// --- Studio ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StudioConfig {
    pub name: String,
    /// IANA timezone used to group availability by calendar day
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            name: "Glow Studio".to_string(),
            timezone: default_timezone(),
            currency: default_currency(),
        }
    }
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

// --- Cal.com (customer slots, reservations, bookings) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalConfig {
    #[serde(default = "default_cal_api_base")]
    pub api_base: String,
    /// Loaded via secret marker: CAL_API_KEY
    pub api_key: String,
    /// How long the provider keeps a reservation, in minutes
    #[serde(default = "default_cal_reservation_minutes")]
    pub reservation_minutes: u32,
}

fn default_cal_api_base() -> String {
    "https://api.cal.com/v2".to_string()
}

fn default_cal_reservation_minutes() -> u32 {
    2
}

// --- Hapio (admin scheduling resources, services catalog) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HapioConfig {
    #[serde(default = "default_hapio_api_base")]
    pub api_base: String,
    /// Loaded via secret marker: HAPIO_API_TOKEN
    pub api_token: String,
}

fn default_hapio_api_base() -> String {
    "https://eu-central-1.hapio.net/v1".to_string()
}

// --- Stripe Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
    /// Loaded via secret marker: STRIPE_SECRET_KEY
    pub secret_key: String,
    pub publishable_key: Option<String>,
    /// Loaded via secret marker: STRIPE_WEBHOOK_SECRET
    pub webhook_secret: Option<String>,
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com/v1".to_string()
}

// --- Mailing (Klaviyo) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailingConfig {
    #[serde(default = "default_mailing_api_base")]
    pub api_base: String,
    /// Loaded via secret marker: MAILING_API_KEY
    pub api_key: String,
    pub list_id: String,
    #[serde(default = "default_mailing_revision")]
    pub revision: String,
}

fn default_mailing_api_base() -> String {
    "https://a.klaviyo.com/api".to_string()
}

fn default_mailing_revision() -> String {
    "2024-10-15".to_string()
}

// --- Booking tokens ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// Loaded via secret marker: BOOKING_TOKEN_SECRET
    pub token_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// Page the browser is redirected to after payment, e.g. https://studio.example/booking/verify
    pub verify_url: String,
}

fn default_token_ttl_minutes() -> i64 {
    30
}

// --- Admin ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    /// Loaded via secret marker: ADMIN_PASSWORD
    pub password: String,
    /// Loaded via secret marker: ADMIN_SESSION_SECRET
    pub session_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
}

fn default_session_hours() -> i64 {
    12
}

fn default_true() -> bool {
    true
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

// --- Reservation hold timings (session side) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReservationSettings {
    /// Countdown used when the provider sends no usable expiry
    pub hold_seconds: u64,
    pub max_attempts: u32,
    /// Linear backoff unit: attempt n waits `backoff_ms * n`
    pub backoff_ms: u64,
    pub error_clear_ms: u64,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            hold_seconds: 120,
            max_attempts: 3,
            backoff_ms: 1500,
            error_clear_ms: 5000,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub studio: StudioConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_cal: bool,
    #[serde(default)]
    pub use_hapio: bool,
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_mailing: bool,
    #[serde(default)]
    pub use_booking: bool,
    #[serde(default)]
    pub use_admin: bool,
    #[serde(default)]
    pub use_database: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub cal: Option<CalConfig>,
    #[serde(default)]
    pub hapio: Option<HapioConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub mailing: Option<MailingConfig>,
    #[serde(default)]
    pub booking: Option<BookingConfig>,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub reservation: ReservationSettings,
}
