//! Command line frontend for admit.

pub mod config;

pub use config::{Command, Config, version_info};
