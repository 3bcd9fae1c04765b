//! Database integration for Glowbook
//!
//! A database-agnostic client built on SQLx's `Any` driver plus the
//! repository that persists bookings. SQLite is the default backend;
//! PostgreSQL and MySQL are available through feature flags.
//!
//! # Example
//!
//! ```rust,no_run
//! use glowbook_db::{BookingRepository, DbClient, SqlBookingRepository};
//!
//! async fn setup_db() -> Result<SqlBookingRepository, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite:data/glowbook.db").await?;
//!     let repository = SqlBookingRepository::new(db_client);
//!     repository.init_schema().await?;
//!     Ok(repository)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    Booking, BookingRepository, BookingStatus, NewBooking, PaymentStatus, SqlBookingRepository,
};
