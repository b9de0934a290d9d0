use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod adapter;
mod client;
mod config;
mod logging;
mod models;
mod report;
mod series;
mod trends;

use adapter::Adapter;
use client::{AnalyticsClient, RepoId};
use config::{AdapterConfig, ApiConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use models::DashboardData;
use series::RandomJitter;

#[derive(Parser)]
#[command(name = "repo-potential")]
#[command(about = "Normalize repository analytics into six-month dashboard data", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an analysis from the backend and normalize it
    Analyze {
        /// Repository as owner/repo
        repo: String,
        #[arg(long, env = "REPO_POTENTIAL_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Ask the backend for improvement advice (raw Markdown)
    Suggest {
        /// Repository as owner/repo
        repo: String,
        #[arg(long, env = "REPO_POTENTIAL_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// Normalize a payload saved to disk
    Normalize {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Write the dashboard here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also export the six-month series as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// detailed_data key to try for activity, in priority order (repeatable)
    #[arg(long = "activity-field")]
    activity_fields: Vec<String>,
    #[arg(long)]
    potential_field: Option<String>,
    /// Seed the jitter used for synthesized points
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging("info", cli.log_json);

    match cli.command {
        Commands::Analyze {
            repo,
            api_url,
            timeout_secs,
            output,
        } => {
            let repo = RepoId::parse(&repo)?;
            let client = AnalyticsClient::new(&ApiConfig::new(&api_url, timeout_secs))
                .context("failed to build HTTP client")?;
            let payload = client
                .analyze(&repo)
                .await
                .with_context(|| format!("analysis of {repo} failed"))?;
            let data = adapt(payload, &output)?;
            emit(&data, &output)?;
        }
        Commands::Suggest {
            repo,
            api_url,
            timeout_secs,
        } => {
            let repo = RepoId::parse(&repo)?;
            let client = AnalyticsClient::new(&ApiConfig::new(&api_url, timeout_secs))
                .context("failed to build HTTP client")?;
            let suggestion = client
                .suggest(&repo)
                .await
                .with_context(|| format!("suggestion for {repo} failed"))?;
            println!("{suggestion}");
        }
        Commands::Normalize { input, output } => {
            let payload = read_payload(&input)?;
            let data = adapt(payload, &output)?;
            emit(&data, &output)?;
        }
    }

    Ok(())
}

fn read_payload(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn adapt(payload: serde_json::Value, output: &OutputArgs) -> anyhow::Result<DashboardData> {
    let adapter = Adapter::new(AdapterConfig::with_overrides(
        output.activity_fields.clone(),
        output.potential_field.clone(),
    ));
    let as_of: NaiveDate = Utc::now().date_naive();

    let data = match output.seed {
        Some(seed) => {
            adapter.adapt_json(payload, as_of, &mut RandomJitter(StdRng::seed_from_u64(seed)))
        }
        None => adapter.adapt_json(payload, as_of, &mut RandomJitter(rand::thread_rng())),
    }
    .context("failed to normalize analysis payload")?;

    Ok(data)
}

fn emit(data: &DashboardData, output: &OutputArgs) -> anyhow::Result<()> {
    let rendered = match output.format {
        Format::Json => serde_json::to_string_pretty(data)?,
        Format::Markdown => report::build_report(data),
    };

    match &output.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Dashboard written to {}.", path.display());
        }
        None => println!("{rendered}"),
    }

    if let Some(path) = &output.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        report::write_series_csv(file, data)?;
        eprintln!("Series written to {}.", path.display());
    }

    Ok(())
}
