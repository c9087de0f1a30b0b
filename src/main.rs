//! CivicPulse - hashtag sentiment dashboard
//!
//! A CLI tool that fetches classified hashtag mentions, keeps those at or
//! above a priority threshold, and renders topic, sentiment and urgency
//! summaries. Also answers civic questions through an LLM chat assistant.
//!
//! Exit codes:
//!   0 - Success (including an empty dashboard)
//!   1 - Runtime error (config, invalid records, I/O, etc.)
//!   3 - The sentiment source could not deliver data

mod analysis;
mod chat;
mod cli;
mod config;
mod dashboard;
mod error;
mod ingest;
mod models;
mod report;

use anyhow::{Context, Result};
use chat::ChatClient;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{Dashboard, QueryOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use ingest::{FileSource, HttpSource, SentimentSource};
use models::SentimentQuery;
use report::RenderOptions;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code used when the source reports a failure.
const EXIT_SOURCE_FAILED: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so [general] verbose can apply
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, config.general.verbose);

    info!("CivicPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let result = if args.ask.is_some() {
        run_chat(&args, &config).await
    } else {
        run_dashboard(&args, &config).await
    };

    match result {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .civicpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the sentiment backend, threshold, chat model, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if config_verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        // Try explicit config path
        Config::load(config_path)?
    } else {
        // Try default location
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Spinner shown while waiting on the network, unless running quietly.
fn spinner(args: &Args, message: String) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Handle --ask: one question to the chat assistant.
async fn run_chat(args: &Args, config: &Config) -> Result<i32> {
    let question = args.ask.as_deref().unwrap_or_default();

    info!("Chat model: {}", config.chat.model);
    let client = ChatClient::new(config.chat.clone())?;

    let pb = spinner(args, "Asking the civic assistant...".to_string());
    let answer = client.ask(question).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!("{}", answer);
    Ok(0)
}

/// Pick a source from the merged configuration and render the dashboard.
async fn run_dashboard(args: &Args, config: &Config) -> Result<i32> {
    let query = SentimentQuery::new(&args.hashtags, config.dashboard.default_threshold)?;

    if let Some(ref fixture) = config.source.fixture {
        info!("Reading records from fixture: {}", fixture.display());
        render_dashboard(args, config, &query, FileSource::new(fixture)).await
    } else if let Some(ref url) = config.source.api_url {
        info!("Fetching records from backend: {}", url);
        let source = HttpSource::new(url, config.source.timeout_seconds)?;
        render_dashboard(args, config, &query, source).await
    } else {
        anyhow::bail!(
            "No sentiment source configured. Pass --api-url or --fixture, or set [source] in {}",
            CONFIG_FILE_NAME
        )
    }
}

/// Run one query against `source` and write the result. Returns the exit code.
async fn render_dashboard<S: SentimentSource>(
    args: &Args,
    config: &Config,
    query: &SentimentQuery,
    source: S,
) -> Result<i32> {
    let start_time = Instant::now();
    let dashboard = Dashboard::new(source);

    let hashtags = query
        .hashtags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(", ");
    let pb = spinner(args, format!("Fetching mentions for {}...", hashtags));
    let outcome = dashboard.query(query).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let (output, exit_code) = match outcome? {
        QueryOutcome::Ready(view) => {
            if view.is_empty() {
                warn!("No mentions meet priority threshold {}", view.threshold);
            }
            let options = RenderOptions {
                view: args.view,
                max_table_rows: config.dashboard.max_table_rows,
            };
            let output = match args.format {
                OutputFormat::Json => report::generate_json_report(&view)?,
                OutputFormat::Markdown => report::generate_markdown_report(&view, &options),
            };
            info!(
                "{} mentions at or above priority {} in {:.1}s",
                view.records.len(),
                view.threshold,
                start_time.elapsed().as_secs_f64()
            );
            (output, 0)
        }
        QueryOutcome::Failed(failure) => {
            let output = match args.format {
                OutputFormat::Json => report::generate_json_failure(&failure)?,
                OutputFormat::Markdown => report::generate_failure_report(&failure),
            };
            (output, EXIT_SOURCE_FAILED)
        }
        QueryOutcome::Superseded => {
            anyhow::bail!("Query was superseded before it completed")
        }
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write dashboard to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Dashboard saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    Ok(exit_code)
}
