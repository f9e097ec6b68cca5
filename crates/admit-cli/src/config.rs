use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};

use admit_core::config::{DEFAULT_BASE_URL, DEFAULT_DB_NAME, DEFAULT_NUM_PAGES};
use admit_core::{DbConnection, ResumeBoundary, ScrapeConfig};

static VERSION_INFO: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");

    let commit = option_env!("VERGEN_GIT_SHA")
        .map(|sha| sha.chars().take(7).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());
    let built = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown");
    let target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");
    let rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");

    format!("{version}\ncommit: {commit}\nbuilt: {built}\ntarget: {target}\nrustc: {rustc}")
});

/// Long version string with build metadata.
pub fn version_info() -> &'static str {
    &VERSION_INFO
}

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "admit")]
#[command(
    author,
    version = version_info(),
    about = "Scrape, load and analyse graduate admissions results"
)]
#[command(after_help = "Examples:
  admit pull                         # Fetch new results into the database
  admit pull --full-scan             # Re-scan every page, ignoring stored results
  admit scrape --output pull.jsonl   # Scrape to a file without a database
  admit load pull.jsonl              # Load a scraped file into the database
  admit analyze
  admit stats

Standardization:
  STANDARDIZER_URL=http://localhost:8000   Use the standardization service
  --heuristic-standardizer                 Use the built-in heuristics")]
pub struct Config {
    /// PostgreSQL connection URL; overrides the DB_* settings when present
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost", global = true)]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432, global = true)]
    pub db_port: u16,

    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DB_NAME, global = true)]
    pub db_name: String,

    #[arg(long, env = "DB_USER", global = true)]
    pub db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true, global = true)]
    pub db_password: Option<String>,

    /// Listing site to pull from
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Number of survey pages to scan
    #[arg(long, env = "NUM_PAGES", default_value_t = DEFAULT_NUM_PAGES, global = true)]
    pub num_pages: u32,

    /// Concurrent requests per fetch round
    #[arg(long, env = "CONCURRENCY", default_value_t = 10, global = true)]
    pub concurrency: usize,

    /// Whether records equal to the stored maximum result number are skipped
    #[arg(long, env = "RESUME_BOUNDARY", default_value_t = ResumeBoundary::After, global = true)]
    pub resume_boundary: ResumeBoundary,

    /// Standardization service endpoint
    #[arg(long, env = "STANDARDIZER_URL", global = true)]
    pub standardizer_url: Option<String>,

    /// Use the built-in heuristic standardizer when no service is configured
    #[arg(long, env = "HEURISTIC_STANDARDIZER", global = true)]
    pub heuristic_standardizer: bool,

    /// Append pulled records to this JSONL file
    #[arg(long = "handoff", env = "HANDOFF_PATH", global = true)]
    pub handoff_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Scrape new results and insert them into the database
    #[command(after_help = "Example: admit pull --num-pages 50")]
    Pull {
        /// Fetch every page instead of stopping at known results
        #[arg(long)]
        full_scan: bool,
    },
    /// Scrape every page into a JSONL file without touching the database
    #[command(after_help = "Example: admit scrape --output applicant_data.jsonl")]
    Scrape {
        /// File to append records to
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Load a JSONL file produced by `scrape` into the database
    Load {
        /// JSONL file to read
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Recompute and print the analysis report
    Analyze,
    /// Show database statistics
    Stats,
}

impl Config {
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

    /// Pipeline settings for the selected command.
    pub fn scrape_config(&self) -> ScrapeConfig {
        let mut config = ScrapeConfig::default()
            .with_base_url(&self.base_url)
            .with_num_pages(self.num_pages)
            .with_concurrency(self.concurrency)
            .with_resume_boundary(self.resume_boundary);
        if let Some(path) = &self.handoff_path {
            config = config.with_handoff_path(path);
        }
        match self.command {
            Command::Pull { full_scan: true } | Command::Scrape { .. } => config.with_full_scan(),
            _ => config,
        }
    }

    /// Whether the command needs a live database connection up front.
    pub fn needs_database(&self) -> bool {
        !matches!(self.command, Command::Scrape { .. })
    }
}
