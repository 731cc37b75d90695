//! Live Projection - Main Entry Point
//!
//! Replays stored games, projects ticks from a file, or polls live games
//! from the database.

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use live_projection::common::types::Sport;
use live_projection::config::loader::{load_config, load_from_env};
use live_projection::config::types::AppConfig;
use live_projection::replay::{replay_history, ReplayRequest, ReplayVerifier};
use live_projection::store::{GameRecord, MemoryStore, PostgresStore};
use live_projection::{BasketballModel, GameStore, HockeyModel, LivePoller, SportModel};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute a game's history and compare with stored snapshots
    Replay {
        #[command(flatten)]
        game: GameArgs,

        /// Absolute tolerance; defaults to settings.replay_tolerance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Only recompute, do not compare with stored snapshots
        #[arg(long)]
        no_verify: bool,
    },
    /// Project every tick of a game record file and print the snapshots
    Project {
        #[arg(long, value_parser = parse_sport)]
        sport: Sport,

        /// JSON game record
        #[arg(long)]
        input: PathBuf,
    },
    /// Poll the database for new ticks until interrupted
    Poll {
        #[arg(long, value_parser = parse_sport)]
        sport: Sport,

        /// Comma-separated game IDs
        #[arg(long, value_delimiter = ',', required = true)]
        games: Vec<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct GameArgs {
    #[arg(long, value_parser = parse_sport)]
    sport: Sport,

    #[arg(long)]
    game_id: String,

    /// JSON game record to use instead of the database
    #[arg(long)]
    input: Option<PathBuf>,
}

fn parse_sport(s: &str) -> std::result::Result<Sport, String> {
    s.parse()
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config)).context("loading configuration")?;

    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Configuration file: {}", args.config);

    match args.command {
        Command::Replay {
            game,
            tolerance,
            no_verify,
        } => {
            let mut request = ReplayRequest::new(&game.game_id)
                .with_tolerance(tolerance.unwrap_or(config.settings.replay_tolerance));
            if no_verify {
                request = request.recompute_only();
            }
            match game.sport {
                Sport::Basketball => {
                    let model = BasketballModel::new(config.basketball.clone());
                    replay(model, &config, game.input, &request).await
                }
                Sport::Hockey => {
                    let model = HockeyModel::new(config.hockey.clone());
                    replay(model, &config, game.input, &request).await
                }
            }
        }
        Command::Project { sport, input } => match sport {
            Sport::Basketball => project(BasketballModel::new(config.basketball.clone()), &input),
            Sport::Hockey => project(HockeyModel::new(config.hockey.clone()), &input),
        },
        Command::Poll { sport, games } => match sport {
            Sport::Basketball => {
                poll(BasketballModel::new(config.basketball.clone()), &config, games).await
            }
            Sport::Hockey => poll(HockeyModel::new(config.hockey.clone()), &config, games).await,
        },
    }
}

fn read_record<M: SportModel>(path: &PathBuf) -> Result<GameRecord<M::Stats, M::Priors>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn replay<M: SportModel + 'static>(
    model: M,
    config: &AppConfig,
    input: Option<PathBuf>,
    request: &ReplayRequest,
) -> Result<()> {
    let model = Arc::new(model);
    let report = match input {
        Some(path) => {
            let store = MemoryStore::from_record(read_record::<M>(&path)?).await?;
            ReplayVerifier::new(model, Arc::new(store)).run(request).await?
        }
        None => {
            let store = connect::<M>(config).await?;
            ReplayVerifier::new(model, Arc::new(store)).run(request).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_deterministic {
        bail!("replay of {} found {} mismatches", report.game_id, report.mismatches.len());
    }
    Ok(())
}

fn project<M: SportModel>(model: M, input: &PathBuf) -> Result<()> {
    let record = read_record::<M>(input)?;
    let run = replay_history(Arc::new(model), &record.game_id, record.priors, &record.ticks)?;
    for rejected in &run.rejected {
        warn!("Tick {} rejected: {}", rejected.tick_id, rejected.reason);
    }
    println!("{}", serde_json::to_string_pretty(&run.snapshots)?);
    Ok(())
}

async fn connect<M: SportModel>(config: &AppConfig) -> Result<PostgresStore<M::Stats, M::Priors>> {
    // fall back to a bare DATABASE_URL when the config file has no [database]
    let db = match config.database.clone() {
        Some(db) => db,
        None => load_from_env()?
            .database
            .context("no database configured; pass --input or set DATABASE_URL")?,
    };
    Ok(PostgresStore::connect(&db).await?)
}

async fn poll<M: SportModel + 'static>(model: M, config: &AppConfig, games: Vec<String>) -> Result<()> {
    let store = Arc::new(connect::<M>(config).await?);
    run_poller(Arc::new(model), store, config, games).await
}

async fn run_poller<M, St>(
    model: Arc<M>,
    store: Arc<St>,
    config: &AppConfig,
    games: Vec<String>,
) -> Result<()>
where
    M: SportModel + 'static,
    St: GameStore<M::Stats, M::Priors> + 'static,
{
    let interval = Duration::from_secs(config.settings.poll_interval_seconds.max(1));
    let mut poller = LivePoller::new(model, store, interval);
    for game in games {
        poller.track(game);
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, cleaning up...");
            let _ = stop_tx.send(true);
        }
    });

    poller.run(stop_rx).await;
    Ok(())
}
