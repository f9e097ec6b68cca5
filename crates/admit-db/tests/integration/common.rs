//! Test utilities for integration tests.
//!
//! Provides helpers to start an isolated PostgreSQL container per test and
//! to build sample admissions records.

use admit_core::models::{Admission, Season, Term};
use admit_db::AdmissionRepository;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

/// Starts a PostgreSQL 16 container and returns a pool connected to it.
///
/// The container is removed when the returned `ContainerAsync` is dropped,
/// so keep it alive for the duration of the test.
pub async fn setup_test_db() -> (PgPool, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "grad_data")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{}:{}/grad_data", host, port);

    // The server restarts once after init; retry until it accepts connections.
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!(
                        "Failed to connect to database after {} retries: {}",
                        MAX_RETRIES, e
                    );
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    (pool, container)
}

/// A repository over a fresh container, with the schema in place.
pub async fn setup_repo() -> (AdmissionRepository, PgPool, ContainerAsync<GenericImage>) {
    let (pool, container) = setup_test_db().await;
    let repo = AdmissionRepository::new(pool.clone());
    repo.ensure_schema().await.expect("schema should be created");
    (repo, pool, container)
}

/// A fully populated record for `/result/<n>`.
pub fn sample_admission(n: i32) -> Admission {
    let mut record = Admission::with_url(format!("https://www.thegradcafe.com/result/{}", n));
    record.date_added = NaiveDate::from_ymd_opt(2025, 1, 5);
    record.term = Some(Term::new(Season::Fall, 2025));
    record.university = Some("Stanford University".to_string());
    record.program = Some("Computer Science".to_string());
    record.degree = Some("PhD".to_string());
    record.status = Some("Accepted".to_string());
    record.status_date = Some("15/02/2025".to_string());
    record.citizenship = Some("International".to_string());
    record.gpa = Some(3.9);
    record.gre_quant = Some(167.0);
    record.gre_verbal = Some(160.0);
    record.gre_aw = Some(4.5);
    record.comments = Some("Great interview".to_string());
    record
}
