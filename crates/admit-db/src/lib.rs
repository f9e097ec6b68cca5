//! Admit DB - Database repository layer for PostgreSQL
//!
//! This crate provides [`AdmissionRepository`], the PostgreSQL
//! implementation of `admit_core::traits::AdmissionStore`. It owns the
//! `admissions` schema, URL-deduplicated inserts, and the analysis queries.

mod repository;

pub use repository::AdmissionRepository;
