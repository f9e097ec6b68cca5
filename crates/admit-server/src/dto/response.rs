//! Response DTOs for API endpoints.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use admit_core::{
    AnalysisReport, DegreeAcceptance, GateOutcome, Operation, PullReport, ScoreAverages,
    StoreStats, TermSummary,
};

// =============================================================================
// Health & Stats
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("healthy" or "degraded")
    pub status: String,
    /// Server version
    pub version: String,
    /// Database connectivity status
    pub database: ServiceStatus,
}

/// Status of an individual service component.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    /// Whether the service is reachable
    pub healthy: bool,
    /// Optional message (e.g., error details)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Store statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total number of admissions records
    pub total_records: i64,
    /// Number of distinct universities
    pub distinct_universities: i64,
    /// Highest stored result number
    pub max_result_number: Option<i32>,
    /// Most recent date a stored result was added to the survey
    pub last_date_added: Option<NaiveDate>,
}

impl From<StoreStats> for StatsResponse {
    fn from(s: StoreStats) -> Self {
        Self {
            total_records: s.total_records,
            distinct_universities: s.distinct_universities,
            max_result_number: s.max_result_number,
            last_date_added: s.last_date_added,
        }
    }
}

/// Busy gate state.
#[derive(Debug, Serialize, ToSchema)]
pub struct GateStatusResponse {
    /// Whether a pull or analysis refresh is running
    pub busy: bool,
    /// The running operation ("pull" or "analysis_refresh")
    pub operation: Option<String>,
    /// Whether the server is shutting down and refusing new operations
    pub shutting_down: bool,
}

// =============================================================================
// Triggers
// =============================================================================

/// Body returned by `POST /pull-data` and `POST /update-analysis`.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TriggerResponse {
    /// True when the request was rejected because another operation is running
    pub busy: bool,
    /// True when the operation completed
    pub ok: bool,
    /// Rows inserted by a pull
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    /// Pull result: "updated" or "no_new"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerResponse {
    fn busy() -> Self {
        Self {
            busy: true,
            ok: false,
            records: None,
            status: None,
            error: None,
        }
    }

    fn ok() -> Self {
        Self {
            busy: false,
            ok: true,
            records: None,
            status: None,
            error: None,
        }
    }

    /// A non-busy failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            busy: false,
            ok: false,
            records: None,
            status: None,
            error: Some(message.into()),
        }
    }

    /// Maps a pull outcome to its status code and body.
    pub fn from_pull(outcome: GateOutcome<PullReport>) -> (StatusCode, Self) {
        match outcome {
            GateOutcome::Completed(report) => (
                StatusCode::OK,
                Self {
                    records: Some(report.inserted),
                    status: Some(report.status.as_str().to_string()),
                    ..Self::ok()
                },
            ),
            GateOutcome::RejectedBusy { .. } => (StatusCode::CONFLICT, Self::busy()),
            GateOutcome::Failed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::failed(e.user_message()),
            ),
        }
    }

    /// Maps an analysis refresh outcome to its status code and body.
    pub fn from_refresh(outcome: GateOutcome<AnalysisReport>) -> (StatusCode, Self) {
        match outcome {
            GateOutcome::Completed(_) => (StatusCode::OK, Self::ok()),
            GateOutcome::RejectedBusy { .. } => (StatusCode::CONFLICT, Self::busy()),
            GateOutcome::Failed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::failed(e.user_message()),
            ),
        }
    }
}

pub fn operation_name(operation: Option<Operation>) -> Option<String> {
    operation.map(|op| op.as_str().to_string())
}

// =============================================================================
// Analysis
// =============================================================================

/// Average scores over plausible ranges.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreAveragesDto {
    pub gpa: Option<f64>,
    pub gre: Option<f64>,
    pub gre_v: Option<f64>,
    pub gre_aw: Option<f64>,
}

impl From<ScoreAverages> for ScoreAveragesDto {
    fn from(a: ScoreAverages) -> Self {
        Self {
            gpa: a.gpa,
            gre: a.gre,
            gre_v: a.gre_v,
            gre_aw: a.gre_aw,
        }
    }
}

/// Applicant summary for one term.
#[derive(Debug, Serialize, ToSchema)]
pub struct TermSummaryDto {
    /// Term such as "Fall 2025"
    pub term: String,
    pub applicants: i64,
    /// Percentage of applicants accepted
    pub acceptance_rate: Option<f64>,
    /// Average GPA of accepted applicants
    pub accepted_avg_gpa: Option<f64>,
}

impl From<TermSummary> for TermSummaryDto {
    fn from(t: TermSummary) -> Self {
        Self {
            term: t.term,
            applicants: t.applicants,
            acceptance_rate: t.acceptance_rate,
            accepted_avg_gpa: t.accepted_avg_gpa,
        }
    }
}

/// Acceptance rates for one degree among American applicants.
#[derive(Debug, Serialize, ToSchema)]
pub struct DegreeAcceptanceDto {
    pub degree: String,
    /// Acceptance rate among applicants who reported a GPA
    pub with_gpa: Option<f64>,
    /// Acceptance rate among applicants who did not
    pub without_gpa: Option<f64>,
}

impl From<DegreeAcceptance> for DegreeAcceptanceDto {
    fn from(d: DegreeAcceptance) -> Self {
        Self {
            degree: d.degree,
            with_gpa: d.with_gpa,
            without_gpa: d.without_gpa,
        }
    }
}

/// Analysis report response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub total_records: i64,
    /// Percentage of records from international applicants
    pub international_percentage: f64,
    pub averages: ScoreAveragesDto,
    pub terms: Vec<TermSummaryDto>,
    pub degree_acceptance: Vec<DegreeAcceptanceDto>,
    /// When the report was computed
    pub generated_at: DateTime<Utc>,
}

impl From<AnalysisReport> for AnalysisResponse {
    fn from(r: AnalysisReport) -> Self {
        Self {
            total_records: r.total_records,
            international_percentage: r.international_percentage,
            averages: r.averages.into(),
            terms: r.terms.into_iter().map(TermSummaryDto::from).collect(),
            degree_acceptance: r
                .degree_acceptance
                .into_iter()
                .map(DegreeAcceptanceDto::from)
                .collect(),
            generated_at: r.generated_at,
        }
    }
}
