// --- File: crates/glowbook_mailing/src/lib.rs ---

pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;


pub use client::{split_name, KlaviyoClient};
pub use error::MailingError;
pub use handlers::{MailingState, Marketing, SubscribeRequest, SubscribeResponse};
pub use routes::{routes, routes_with};
