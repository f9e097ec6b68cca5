//! Admissions repository for PostgreSQL.
//!
//! Deduplication relies on the unique index `admissions_url_key`: every
//! insert is `ON CONFLICT (url) DO NOTHING`, so re-running a pull over the
//! same records changes nothing.

use std::collections::HashSet;

use admit_core::error::AppError;
use admit_core::models::{
    Admission, AnalysisReport, DegreeAcceptance, ScoreAverages, StoreStats, TermSummary,
};
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Pool, Postgres};

/// Schema statements, run in order by [`AdmissionRepository::ensure_schema`].
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS admissions (
        p_id SERIAL PRIMARY KEY,
        url TEXT NOT NULL,
        result_number INTEGER,
        date_added DATE,
        term TEXT,
        university TEXT,
        program TEXT,
        degree TEXT,
        status TEXT,
        status_date TEXT,
        us_or_international TEXT,
        gpa DOUBLE PRECISION,
        gre DOUBLE PRECISION,
        gre_v DOUBLE PRECISION,
        gre_aw DOUBLE PRECISION,
        comments TEXT,
        canonical_program TEXT,
        canonical_university TEXT,
        ingested_at TIMESTAMPTZ DEFAULT NOW()
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS admissions_url_key ON admissions (url)",
];

const INSERT_ADMISSION: &str = r#"
    INSERT INTO admissions (
        url, result_number, date_added, term, university, program, degree,
        status, status_date, us_or_international, gpa, gre, gre_v, gre_aw,
        comments, canonical_program, canonical_university
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
    ON CONFLICT (url) DO NOTHING
"#;

/// Repository for admissions records in PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use admit_db::AdmissionRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/grad_data")
///     .await?;
///
/// let repo = AdmissionRepository::new(pool);
/// repo.ensure_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdmissionRepository {
    pool: Pool<Postgres>,
}

impl AdmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `admissions` table and its URL unique index if missing.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;
        }
        Ok(())
    }

    /// Inserts one record. Returns the number of rows written (0 on URL conflict).
    pub async fn insert(&self, record: &Admission) -> Result<u64, AppError> {
        let result = sqlx::query(INSERT_ADMISSION)
            .bind(&record.url)
            .bind(record.result_number)
            .bind(record.date_added)
            .bind(record.term.map(|t| t.to_string()))
            .bind(&record.university)
            .bind(&record.program)
            .bind(&record.degree)
            .bind(&record.status)
            .bind(&record.status_date)
            .bind(&record.citizenship)
            .bind(record.gpa)
            .bind(record.gre_quant)
            .bind(record.gre_verbal)
            .bind(record.gre_aw)
            .bind(&record.comments)
            .bind(&record.canonical_program)
            .bind(&record.canonical_university)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(result.rows_affected())
    }

    /// Inserts each record on its own, outside any transaction.
    ///
    /// A record whose statement fails is logged and skipped; the rest of
    /// the batch still goes in. Returns the number of rows actually inserted.
    /// A batch where every record fails is logged at error level and still
    /// returns `Ok(0)`.
    pub async fn insert_batch(&self, records: &[Admission]) -> Result<u64, AppError> {
        let mut inserted = 0;
        let mut failed = 0;
        for record in records {
            match self.insert(record).await {
                Ok(rows) => inserted += rows,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(url = %record.url, error = %e, "Failed to insert record, skipping");
                }
            }
        }
        if failed > 0 && failed == records.len() {
            tracing::error!(failed, "Every record in the batch failed to insert");
        }
        Ok(inserted)
    }

    pub async fn max_result_number(&self) -> Result<Option<i32>, AppError> {
        let max: Option<i32> = sqlx::query_scalar("SELECT MAX(result_number) FROM admissions")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(max)
    }

    pub async fn existing_urls(&self) -> Result<HashSet<String>, AppError> {
        let urls: Vec<String> = sqlx::query_scalar("SELECT url FROM admissions")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(urls.into_iter().collect())
    }

    /// Checks database connectivity by executing a simple query.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(())
    }

    /// Returns aggregated store statistics.
    pub async fn get_stats(&self) -> Result<StoreStats, AppError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(DISTINCT university) AS universities,
                MAX(result_number) AS max_result_number,
                MAX(date_added) AS last_date_added
            FROM admissions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(StoreStats {
            total_records: row.total.unwrap_or(0),
            distinct_universities: row.universities.unwrap_or(0),
            max_result_number: row.max_result_number,
            last_date_added: row.last_date_added,
        })
    }

    /// Computes the analysis report.
    ///
    /// Score averages ignore values outside plausible ranges (GPA 0.1-5.0,
    /// GRE sections 130-170, AW 0-6). Rates are percentages rounded to two
    /// decimals and are `None` when nothing qualifies.
    pub async fn analysis(&self) -> Result<AnalysisReport, AppError> {
        let overview: OverviewRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE us_or_international = 'International') AS international,
                ROUND((AVG(gpa) FILTER (WHERE gpa BETWEEN 0.1 AND 5.0))::numeric, 2)::float8 AS gpa,
                ROUND((AVG(gre) FILTER (WHERE gre BETWEEN 130 AND 170))::numeric, 1)::float8 AS gre,
                ROUND((AVG(gre_v) FILTER (WHERE gre_v BETWEEN 130 AND 170))::numeric, 1)::float8 AS gre_v,
                ROUND((AVG(gre_aw) FILTER (WHERE gre_aw BETWEEN 0.0 AND 6.0))::numeric, 2)::float8 AS gre_aw
            FROM admissions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        let terms: Vec<TermRow> = sqlx::query_as(
            r#"
            SELECT
                term,
                COUNT(*) AS applicants,
                ROUND(
                    (COUNT(*) FILTER (WHERE status ILIKE 'accepted%'))::numeric
                    / COUNT(*) * 100,
                    2
                )::float8 AS acceptance_rate,
                ROUND(
                    (AVG(gpa) FILTER (WHERE status ILIKE 'accepted%' AND gpa BETWEEN 0.1 AND 5.0))::numeric,
                    2
                )::float8 AS accepted_avg_gpa
            FROM admissions
            WHERE term IS NOT NULL
            GROUP BY term
            ORDER BY term
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        let degrees: Vec<DegreeRow> = sqlx::query_as(
            r#"
            SELECT
                degree,
                ROUND(
                    (COUNT(*) FILTER (WHERE gpa IS NOT NULL AND status ILIKE 'accepted%'))::numeric
                    / NULLIF(COUNT(*) FILTER (WHERE gpa IS NOT NULL), 0) * 100,
                    2
                )::float8 AS with_gpa,
                ROUND(
                    (COUNT(*) FILTER (WHERE gpa IS NULL AND status ILIKE 'accepted%'))::numeric
                    / NULLIF(COUNT(*) FILTER (WHERE gpa IS NULL), 0) * 100,
                    2
                )::float8 AS without_gpa
            FROM admissions
            WHERE degree IS NOT NULL AND us_or_international = 'American'
            GROUP BY degree
            ORDER BY degree
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        let total = overview.total.unwrap_or(0);
        let international = overview.international.unwrap_or(0);

        Ok(AnalysisReport {
            total_records: total,
            international_percentage: percentage(international, total),
            averages: ScoreAverages {
                gpa: overview.gpa,
                gre: overview.gre,
                gre_v: overview.gre_v,
                gre_aw: overview.gre_aw,
            },
            terms: terms
                .into_iter()
                .map(|row| TermSummary {
                    term: row.term,
                    applicants: row.applicants,
                    acceptance_rate: row.acceptance_rate,
                    accepted_avg_gpa: row.accepted_avg_gpa,
                })
                .collect(),
            degree_acceptance: degrees
                .into_iter()
                .map(|row| DegreeAcceptance {
                    degree: row.degree,
                    with_gpa: row.with_gpa,
                    without_gpa: row.without_gpa,
                })
                .collect(),
            generated_at: Utc::now(),
        })
    }
}

/// `part / total` as a percentage rounded to two decimals; 0 for an empty total.
fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: Option<i64>,
    universities: Option<i64>,
    max_result_number: Option<i32>,
    last_date_added: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    total: Option<i64>,
    international: Option<i64>,
    gpa: Option<f64>,
    gre: Option<f64>,
    gre_v: Option<f64>,
    gre_aw: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct TermRow {
    term: String,
    applicants: i64,
    acceptance_rate: Option<f64>,
    accepted_avg_gpa: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct DegreeRow {
    degree: String,
    with_gpa: Option<f64>,
    without_gpa: Option<f64>,
}

// =============================================================================
// Trait Implementation: AdmissionStore
// =============================================================================

impl admit_core::traits::AdmissionStore for AdmissionRepository {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        AdmissionRepository::ensure_schema(self).await
    }

    async fn insert_batch(&self, records: &[Admission]) -> Result<u64, AppError> {
        AdmissionRepository::insert_batch(self, records).await
    }

    async fn max_result_number(&self) -> Result<Option<i32>, AppError> {
        AdmissionRepository::max_result_number(self).await
    }

    async fn existing_urls(&self) -> Result<HashSet<String>, AppError> {
        AdmissionRepository::existing_urls(self).await
    }

    async fn analysis(&self) -> Result<AnalysisReport, AppError> {
        AdmissionRepository::analysis(self).await
    }

    async fn get_stats(&self) -> Result<StoreStats, AppError> {
        AdmissionRepository::get_stats(self).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        AdmissionRepository::health_check(self).await
    }
}
