//! Admit Client - HTTP clients for external services
//!
//! This crate provides:
//!
//! - [`gradcafe`] - the GradCafe survey site, implementing `PageSource`
//! - [`html`] - survey table and result page extraction
//! - [`standardizer`] - the remote name-standardization service
//! - [`provider`] - runtime selection between standardizers

pub mod gradcafe;
pub mod html;
pub mod provider;
pub mod standardizer;

pub use gradcafe::GradCafeClient;
pub use provider::StandardizerEnum;
pub use standardizer::StandardizerClient;
