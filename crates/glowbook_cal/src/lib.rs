// --- File: crates/glowbook_cal/src/lib.rs ---

pub mod availability;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;


pub use availability::{
    group_slots_by_day, resolve_window, AvailabilityQuery, AvailabilityResponse, DaySlots,
    SlotOption,
};
pub use client::CalClient;
pub use error::CalError;
pub use handlers::{CalState, Scheduler};
pub use routes::{routes, routes_with};
