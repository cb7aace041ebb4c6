use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use featrank::{load_scoring_config, run_request, RankRequest, Ranker, RunOptions, ScoringStrategy};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rank featured items for a subject
#[derive(Parser, Debug)]
#[command(name = "featrank")]
#[command(about = "Rank featured items for a subject", long_about = None)]
struct Args {
    /// Path to the JSON ranking request, or `-` to read stdin
    #[arg(short, long)]
    request: PathBuf,

    /// Scoring strategy: `featured` or `priority` (overrides the request)
    #[arg(long)]
    strategy: Option<ScoringStrategy>,

    /// Number of results to return (overrides the request)
    #[arg(long)]
    top_n: Option<usize>,

    /// Path to a JSON scoring config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Embedding width (overrides the config file)
    #[arg(long)]
    embedding_dim: Option<usize>,

    /// Include the per-term score breakdown in the output
    #[arg(long)]
    explain: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn read_request(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("failed to read request from stdin")?;
        return Ok(json);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting featrank v{}", env!("CARGO_PKG_VERSION"));

    let config = load_scoring_config(args.config.as_deref(), args.embedding_dim)?;
    info!(
        embedding_dim = config.embedding_dim,
        wishlist = config.featured.wishlist,
        rating = config.featured.rating,
        embedding = config.featured.embedding,
        event = config.featured.event,
        "Scoring config loaded"
    );
    let ranker = Ranker::new(config)?;

    let json = read_request(&args.request)?;
    let request = RankRequest::from_json(&json)
        .with_context(|| format!("invalid request {}", args.request.display()))?;

    let options = RunOptions {
        strategy: args.strategy,
        top_n: args.top_n,
        explain: args.explain,
    };
    let response = run_request(&ranker, request, &options, Utc::now())?;

    info!(
        strategy = %response.strategy,
        candidates = response.stats.candidates_count,
        eligible = response.stats.eligible_count,
        returned = response.stats.results_count,
        "Ranking done"
    );

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
