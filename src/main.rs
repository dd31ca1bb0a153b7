use std::path::PathBuf;
use std::sync::Arc;

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelcast::config::Config;
use reelcast::error::{Error, ReelcastErrorTrait, Result};
use reelcast::metrics;
use reelcast::models::{Platform, ScheduleOrigin};
use reelcast::scheduler::{PublishingScheduler, ScheduleRequest, ScheduleResult};
use reelcast::server::config::parse_bind_address;
use reelcast::server::SchedulerServer;
use reelcast::storage::{CatalogSnapshot, Database};

#[derive(Parser)]
#[command(
    name = "reelcast",
    version,
    about = "Clip publishing scheduler with priority-based conflict resolution",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (defaults to REELCAST_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json, pretty)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API and periodic tick loop
    Serve {
        /// Override the bind address
        #[arg(short, long)]
        bind: Option<String>,

        /// Do not run the tick loop
        #[arg(long, default_value = "false")]
        no_tick: bool,
    },

    /// Schedule a clip
    Schedule {
        /// Clip identifier
        #[arg(long)]
        clip: String,

        /// Target platform (tiktok, instagram, youtube)
        #[arg(short, long)]
        platform: String,

        /// Publishing account identifier
        #[arg(short, long)]
        account: String,

        /// Desired publish time, RFC 3339 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,

        /// Latest acceptable publish time, RFC 3339
        #[arg(long, value_parser = parse_time)]
        window_end: Option<DateTime<Utc>>,

        /// Request origin (manual, rule_engine, auto)
        #[arg(long, default_value = "manual")]
        origin: String,
    },

    /// Show slot forecast
    Forecast {
        /// Single platform to forecast (defaults to all configured)
        #[arg(short, long)]
        platform: Option<String>,

        /// Reference time, RFC 3339 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },

    /// Promote due entries to pending
    Tick {
        /// List due entries without promoting them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Reference time, RFC 3339 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },

    /// Import clips, campaigns and accounts from a JSON snapshot
    Import {
        /// Snapshot file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let err = Error::config(e);
            eprintln!("Error: {err}");
            return err.exit_code();
        }
    };

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose);

    tracing::info!("reelcast starting");

    match run(cli.command, config).await {
        Ok(()) => {
            tracing::info!("reelcast completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                category = %err.category(),
                recoverable = err.is_recoverable(),
                "reelcast failed"
            );
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Serve { bind, no_tick } => {
            tracing::info!(bind = ?bind, no_tick = %no_tick, "Starting serve command");
            serve(config, bind, no_tick).await?;
        }

        Commands::Schedule {
            clip,
            platform,
            account,
            at,
            window_end,
            origin,
        } => {
            tracing::info!(
                clip = %clip,
                platform = %platform,
                account = %account,
                at = ?at,
                "Starting schedule command"
            );
            let origin = ScheduleOrigin::parse(&origin)
                .ok_or_else(|| Error::invalid_argument("origin", origin))?;
            let request = ScheduleRequest {
                clip_id: clip,
                platform: platform.parse::<Platform>()?,
                account_id: account,
                desired_time: at.unwrap_or_else(Utc::now),
                window_end,
                origin,
            };
            schedule(&config, request).await?;
        }

        Commands::Forecast { platform, at } => {
            tracing::info!(platform = ?platform, at = ?at, "Starting forecast command");
            let platform = platform.map(|p| p.parse::<Platform>()).transpose()?;
            forecast(&config, platform, at.unwrap_or_else(Utc::now)).await?;
        }

        Commands::Tick { dry_run, at } => {
            tracing::info!(dry_run = %dry_run, at = ?at, "Starting tick command");
            tick(&config, dry_run, at.unwrap_or_else(Utc::now)).await?;
        }

        Commands::Import { input } => {
            tracing::info!(input = %input.display(), "Starting import command");
            import(&config, &input)?;
        }
    }
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("reelcast=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("reelcast={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

fn parse_time(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database.sqlite_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(Database::open(&config.database.sqlite_path)?)
}

fn build_scheduler(config: &Config) -> Result<PublishingScheduler> {
    let db = open_database(config)?;
    Ok(PublishingScheduler::new(
        Arc::new(db.schedule_store()),
        Arc::new(db.catalog()),
        Arc::new(db.audit_sink()),
        config.window_table().map_err(Error::config)?,
        config.scheduler.clone(),
    ))
}

async fn serve(mut config: Config, bind: Option<String>, no_tick: bool) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = parse_bind_address(&bind)?;
    }
    if no_tick {
        config.server.enable_tick_loop = false;
    }

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics registration failed; continuing without metrics");
    }

    let scheduler = Arc::new(build_scheduler(&config)?);
    let server = SchedulerServer::new(config.server.clone(), scheduler);
    println!("{}", server.info().display());

    server.start().await?;
    Ok(())
}

async fn schedule(config: &Config, request: ScheduleRequest) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    let result = scheduler.schedule(request).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    match result {
        ScheduleResult::Rejected { kind, reason } => Err(Error::Rejected { kind, reason }),
        _ => Ok(()),
    }
}

async fn forecast(config: &Config, platform: Option<Platform>, at: DateTime<Utc>) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    match platform {
        Some(platform) => {
            let forecast = scheduler.forecast(platform, at).await?;
            println!("{}", serde_json::to_string_pretty(&forecast)?);
        }
        None => {
            let forecasts = scheduler.get_forecast(at).await?;
            println!("{}", serde_json::to_string_pretty(&forecasts)?);
        }
    }
    Ok(())
}

async fn tick(config: &Config, dry_run: bool, at: DateTime<Utc>) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    let report = scheduler.tick(at, dry_run).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn import(config: &Config, input: &std::path::Path) -> Result<()> {
    let content = std::fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let snapshot: CatalogSnapshot =
        serde_json::from_str(&content).map_err(|e| Error::snapshot(input, e))?;

    let db = open_database(config)?;
    let imported = db.import_catalog(&snapshot)?;
    println!(
        "Imported {} records ({} clips, {} campaigns, {} accounts)",
        imported,
        snapshot.clips.len(),
        snapshot.campaigns.len(),
        snapshot.accounts.len()
    );
    Ok(())
}
