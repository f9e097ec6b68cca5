use std::path::Path;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use admit_client::{GradCafeClient, StandardizerEnum};
use admit_core::traits::Standardizer;
use admit_core::{
    AnalysisReport, DbConfig, GateOutcome, HttpConfig, IngestCoordinator, IngestService,
    PullReport, StoreStats, TracingReporter,
};
use admit_db::AdmissionRepository;
use admit_cli::{Command, Config};

type Service = IngestService<AdmissionRepository, GradCafeClient, StandardizerEnum>;

const RULE: &str = "════════════════════════════════════════════════════════";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let config = Config::parse();
    let pool = connect(&config).await?;
    let repo = AdmissionRepository::new(pool);

    let scrape_config = config.scrape_config();
    let client = GradCafeClient::with_config(
        &scrape_config.base_url,
        HttpConfig::default(),
        scrape_config.robots.clone(),
    )
    .context("Failed to initialize GradCafe client")?;
    let standardizer = StandardizerEnum::from_options(
        config.standardizer_url.as_deref(),
        config.heuristic_standardizer,
    )
    .context("Failed to initialize standardizer")?;
    info!(standardizer = standardizer.name(), "Standardizer selected");

    let service = IngestService::with_config(repo.clone(), client, standardizer, scrape_config);

    match &config.command {
        Command::Pull { .. } => pull(service).await?,
        Command::Scrape { output } => scrape(&service, output).await?,
        Command::Load { path } => load(&service, path).await?,
        Command::Analyze => analyze(service).await?,
        Command::Stats => {
            let stats = repo
                .get_stats()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_stats(&stats);
        }
    }

    Ok(())
}

/// Opens the pool. `scrape` never queries it, so it gets a lazy pool.
async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let options = PgPoolOptions::new().max_connections(DbConfig::default().max_connections);
    let url = config.database_url();

    if !config.needs_database() {
        return options
            .connect_lazy(&url)
            .context("Invalid database connection settings");
    }

    info!("Connecting to database...");
    options
        .connect(&url)
        .await
        .context("Failed to connect to database")
}

async fn pull(service: Service) -> anyhow::Result<()> {
    let coordinator = IngestCoordinator::new(service);

    match coordinator.start_pull_with_progress(&TracingReporter).await {
        GateOutcome::Completed(report) => {
            print_pull_summary(&report);
            if let Some(analysis) = coordinator.latest_analysis() {
                print_analysis(&analysis);
            }
            Ok(())
        }
        GateOutcome::RejectedBusy { holder } => {
            anyhow::bail!("Another operation is in progress: {:?}", holder)
        }
        GateOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())).context("Pull failed"),
    }
}

async fn scrape(service: &Service, output: &Path) -> anyhow::Result<()> {
    let report = service
        .scrape_to_file(output, &TracingReporter)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_pull_summary(&report);
    info!("Records appended to {}", output.display());
    Ok(())
}

async fn load(service: &Service, path: &Path) -> anyhow::Result<()> {
    let inserted = service
        .load_handoff(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if inserted == 0 {
        warn!("No new rows inserted; every record was already stored");
    } else {
        info!(inserted, "Load complete");
    }
    Ok(())
}

async fn analyze(service: Service) -> anyhow::Result<()> {
    let coordinator = IngestCoordinator::new(service);

    match coordinator.start_refresh().await {
        GateOutcome::Completed(analysis) => {
            print_analysis(&analysis);
            Ok(())
        }
        GateOutcome::RejectedBusy { holder } => {
            anyhow::bail!("Another operation is in progress: {:?}", holder)
        }
        GateOutcome::Failed(e) => {
            Err(anyhow::anyhow!(e.user_message())).context("Analysis failed")
        }
    }
}

fn print_pull_summary(report: &PullReport) {
    let stats = &report.stats;
    info!("");
    info!("{RULE}");
    info!("Pull complete: {}", report.status);
    info!("{RULE}");
    info!("  Pages fetched:       {}/{}", stats.pages_fetched, stats.pages_requested);
    info!("  Records discovered:  {}", stats.discovered);
    info!("  Already stored:      {}", stats.skipped_existing);
    info!("  Disallowed:          {}", stats.skipped_disallowed);
    info!("  Details failed:      {}", stats.details_failed);
    info!("  Standardized:        {}", stats.standardized);
    info!("  Scraped:             {}", report.scraped);
    info!("  Inserted:            {}", report.inserted);
    info!("{RULE}");
}

fn print_analysis(analysis: &AnalysisReport) {
    println!("\nAdmissions Analysis ({} records)\n", analysis.total_records);
    println!(
        "  International applicants:  {:.2}%",
        analysis.international_percentage
    );
    println!("  Average GPA:               {}", fmt_opt(analysis.averages.gpa));
    println!("  Average GRE:               {}", fmt_opt(analysis.averages.gre));
    println!("  Average GRE V:             {}", fmt_opt(analysis.averages.gre_v));
    println!("  Average GRE AW:            {}", fmt_opt(analysis.averages.gre_aw));

    if !analysis.terms.is_empty() {
        println!("\n  {:<14} {:>10} {:>10} {:>10}", "Term", "Applicants", "Accepted", "Acc. GPA");
        for term in &analysis.terms {
            println!(
                "  {:<14} {:>10} {:>9}% {:>10}",
                term.term,
                term.applicants,
                fmt_opt(term.acceptance_rate),
                fmt_opt(term.accepted_avg_gpa)
            );
        }
    }

    if !analysis.degree_acceptance.is_empty() {
        println!("\n  American applicants, acceptance by degree:");
        for degree in &analysis.degree_acceptance {
            println!(
                "    {:<10} with GPA {:>7}%   without GPA {:>7}%",
                degree.degree,
                fmt_opt(degree.with_gpa),
                fmt_opt(degree.without_gpa)
            );
        }
    }
    println!();
}

fn print_stats(stats: &StoreStats) {
    println!("\nDatabase Statistics\n");
    println!("  Total records:         {}", stats.total_records);
    println!("  Universities:          {}", stats.distinct_universities);
    if let Some(max) = stats.max_result_number {
        println!("  Latest result number:  {}", max);
    }
    if let Some(date) = stats.last_date_added {
        println!("  Last date added:       {}", date);
    }
    println!();
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}
