//! Admit Core - Domain types, pipeline logic, and services.
//!
//! This crate provides the core functionality for admit, including:
//!
//! - **Domain models**: [`Admission`], [`Term`], [`AnalysisReport`], etc.
//! - **Pipeline stages**: robots filtering, concurrent dispatch, record assembly, normalization
//! - **Services**: [`IngestService`] for scrape-and-load, [`IngestCoordinator`] for gated triggers
//! - **Traits**: [`PageSource`], [`AdmissionStore`], [`Standardizer`] for dependency injection
//! - **Progress reporting**: [`ProgressReporter`] trait for decoupled logging/UI
//!
//! # Architecture
//!
//! This crate is designed to be reusable by different frontends (CLI, server, etc.).
//! Business logic is decoupled from I/O concerns through traits:
//!
//! - [`PageSource`] - abstracts the listing site (e.g., `GradCafeClient`)
//! - [`AdmissionStore`] - abstracts database operations (e.g., PostgreSQL)
//! - [`Standardizer`] - abstracts name standardization (HTTP service or heuristics)
//!
//! # Example
//!
//! ```ignore
//! use admit_core::{IngestCoordinator, IngestService, GateOutcome};
//!
//! let service = IngestService::with_config(repo, client, standardizer, config);
//! let coordinator = IngestCoordinator::new(service);
//!
//! match coordinator.start_pull().await {
//!     GateOutcome::Completed(report) => println!("{} new rows", report.inserted),
//!     GateOutcome::RejectedBusy { .. } => println!("busy"),
//!     GateOutcome::Failed(e) => eprintln!("{}", e.user_message()),
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod handoff;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod robots;
pub mod standardize;
pub mod stats;
pub mod traits;

// Configuration
pub use config::{DbConfig, DbConnection, HttpConfig, ResumeBoundary, ScrapeConfig};

// Error handling
pub use error::AppError;

// Domain models
pub use models::{
    Admission, AnalysisReport, CanonicalNames, DegreeAcceptance, DetailFields, NamePair,
    PartialRecord, RawAdmission, ScoreAverages, Season, StoreStats, SummaryRow, Term, TermSummary,
};

// Pipeline stages
pub use assemble::{assemble, complete, merge};
pub use dispatch::{DetailTask, FetchTask, SummaryTask, run_concurrent};
pub use normalize::clean;
pub use robots::RobotsPolicy;

// Mutual exclusion
pub use gate::{BusyGate, BusyGuard, GateOutcome, Operation};

// Statistics and progress reporting
pub use progress::{ProgressReporter, PullEvent, SilentReporter, TracingReporter};
pub use stats::{PullReport, PullStats, PullStatus};

// Traits for dependency injection
pub use traits::{AdmissionStore, PageSource, Standardizer};

// Services (generic over trait implementations)
pub use coordinator::IngestCoordinator;
pub use pipeline::{IngestService, ResumePoint};
pub use standardize::{DisabledStandardizer, HeuristicStandardizer};
