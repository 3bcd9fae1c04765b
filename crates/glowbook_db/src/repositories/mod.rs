//! Repository modules for database access

pub mod booking;
pub mod booking_sql;

pub use booking::{Booking, BookingRepository, BookingStatus, NewBooking, PaymentStatus};
pub use booking_sql::SqlBookingRepository;
