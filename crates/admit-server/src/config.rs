use std::path::PathBuf;

use clap::Parser;

use admit_core::config::{DEFAULT_BASE_URL, DEFAULT_DB_NAME, DEFAULT_NUM_PAGES};
use admit_core::{DbConnection, ResumeBoundary, ScrapeConfig};

/// Server configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug, Clone)]
#[command(name = "admit-server")]
#[command(author, version, about = "REST API server for admissions pulls and analysis")]
pub struct ServerConfig {
    /// PostgreSQL connection URL; overrides the DB_* settings when present
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DB_NAME)]
    pub db_name: String,

    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Connection pool size
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Allowed CORS origins, comma separated, or "*" for any
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Listing site to pull from
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of survey pages to scan per pull
    #[arg(long, env = "NUM_PAGES", default_value_t = DEFAULT_NUM_PAGES)]
    pub num_pages: u32,

    /// Concurrent requests per fetch round
    #[arg(long, env = "CONCURRENCY", default_value_t = 10)]
    pub concurrency: usize,

    /// Whether records equal to the stored maximum result number are skipped
    #[arg(long, env = "RESUME_BOUNDARY", default_value_t = ResumeBoundary::After)]
    pub resume_boundary: ResumeBoundary,

    /// Standardization service endpoint
    #[arg(long, env = "STANDARDIZER_URL")]
    pub standardizer_url: Option<String>,

    /// Use the built-in heuristic standardizer when no service is configured
    #[arg(long, env = "HEURISTIC_STANDARDIZER")]
    pub heuristic_standardizer: bool,

    /// Append each pull's records to this JSONL file
    #[arg(long = "handoff", env = "HANDOFF_PATH")]
    pub handoff_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn db_connection(&self) -> DbConnection {
        DbConnection {
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn database_url(&self) -> String {
        self.db_connection().resolve(self.database_url.as_deref())
    }

    pub fn scrape_config(&self) -> ScrapeConfig {
        let config = ScrapeConfig::default()
            .with_base_url(&self.base_url)
            .with_num_pages(self.num_pages)
            .with_concurrency(self.concurrency)
            .with_resume_boundary(self.resume_boundary);
        match &self.handoff_path {
            Some(path) => config.with_handoff_path(path),
            None => config,
        }
    }
}
