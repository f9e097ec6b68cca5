//! Admit Server - REST API for admissions pulls and analysis
//!
//! This crate exposes the gated operations over HTTP:
//!
//! - **Triggers**: `POST /pull-data` and `POST /update-analysis`, answered
//!   with 200, 409 (busy) or 500
//! - **Analysis**: `GET /analysis`
//! - **System**: health, store statistics and gate status under `/api/v1`
//!
//! # API Documentation
//!
//! When running the server, interactive API documentation is available
//! at `/swagger-ui`.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
