// --- File: crates/glowbook_admin/src/lib.rs ---

pub mod auth;
pub mod bookings;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod hapio_proxy;
pub mod overlap;
pub mod routes;
pub mod session;

#[cfg(test)]
mod overlap_test;

pub use error::AdminError;
pub use handlers::{AdminState, LoginRequest, LoginResponse};
pub use overlap::{check_dated, check_weekly, DatedBlock, TimeRange, WeeklyBlock};
pub use routes::{routes, routes_with};
pub use session::{issue_session, verify_session, AdminSession, SESSION_COOKIE};
