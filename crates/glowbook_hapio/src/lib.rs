// --- File: crates/glowbook_hapio/src/lib.rs ---

pub mod catalog;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;


pub use catalog::{parse_iso_duration, slugify, HapioCatalog, Service, ServiceCatalog};
pub use client::HapioClient;
pub use error::HapioError;
pub use handlers::HapioState;
pub use models::{HapioService, Page, RecurringScheduleBlock, ScheduleBlock};
pub use routes::{routes, routes_with_catalog};
