//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::dto::{
    AnalysisResponse, DegreeAcceptanceDto, GateStatusResponse, HealthResponse, ScoreAveragesDto,
    ServiceStatus, StatsResponse, TermSummaryDto, TriggerResponse,
};
use crate::handlers::{analysis, health, stats, status, triggers};

/// OpenAPI documentation for the admit API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Admit API",
        version = "1.0.0",
        description = "Graduate admissions results: scrape, load, and analyze.

Pulls and analysis refreshes are serialized by a process-wide busy gate.
A trigger that arrives while another operation runs is rejected with
`409` and `{\"busy\": true}` instead of being queued.

## Quick Start

1. Check server health: `GET /api/v1/health`
2. Pull new results: `POST /pull-data`
3. Read the report: `GET /analysis`
",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        health::health_check,
        stats::get_stats,
        status::get_status,
        triggers::pull_data,
        triggers::update_analysis,
        analysis::get_analysis,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            StatsResponse,
            GateStatusResponse,
            TriggerResponse,
            AnalysisResponse,
            ScoreAveragesDto,
            TermSummaryDto,
            DegreeAcceptanceDto,
        )
    ),
    tags(
        (name = "system", description = "System health, statistics and gate state"),
        (name = "triggers", description = "Gated pull and analysis refresh"),
        (name = "analysis", description = "Admissions analysis report"),
    )
)]
pub struct ApiDoc;
