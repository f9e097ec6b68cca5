//! HTTP request handlers for API endpoints.

pub mod analysis;
pub mod health;
pub mod stats;
pub mod status;
pub mod triggers;
