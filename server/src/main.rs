mod broadcaster;
mod leaderboard;
mod messages;
mod scheduler;
mod score_reporter;
mod server_config;
mod session_recorder;
mod session_stats;
mod store_error;
mod web_server;
mod ws_handler;

use std::path::PathBuf;
use clap::Parser;
use common::config::ConfigManager;
use common::{log, log_warn, logger};

use leaderboard::{Leaderboard, MemoryLeaderboardStore};
use server_config::ServerConfig;
use session_recorder::SessionLog;
use web_server::{WebServerState, run_web_server};

#[derive(Parser)]
#[command(name = "snake_server")]
struct Args {
    /// YAML configuration file; defaults are used when it does not exist
    #[arg(long, default_value = "snake_server.yaml")]
    config: PathBuf,

    #[arg(long)]
    use_log_prefix: bool,

    /// Write the default configuration to `--config` and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(&args.config);

    if args.init_config {
        config_manager.set_config(&ServerConfig::default())?;
        log!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let config = config_manager.get_config()?;
    log!("Loaded configuration from {}", args.config.display());

    let sessions = match &config.sessions_file {
        Some(path) => SessionLog::load(path).await?,
        None => {
            log_warn!("No sessions file configured, finished games are kept in memory only");
            SessionLog::in_memory()
        }
    };

    let store = match &config.leaderboard_file {
        Some(path) => MemoryLeaderboardStore::load(path).await?,
        None => MemoryLeaderboardStore::new(),
    };
    let leaderboard = Leaderboard::new(store, config.leaderboard_limit);

    let state = WebServerState::new(config, sessions, leaderboard);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log!("Shutdown signal received");
    };

    run_web_server(state, shutdown_signal).await?;

    log!("Server shut down gracefully");

    Ok(())
}
