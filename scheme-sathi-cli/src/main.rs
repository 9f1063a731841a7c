//! CLI entry point for scheme-sathi

mod shell;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use scheme_sathi_core::config::{Config, ConfigLoader, LoggingConfig};
use scheme_sathi_core::logging::init_logging;
use scheme_sathi_core::utils::expand_tilde;
use scheme_sathi_core::{JsonFileStore, SessionActor, SessionManager};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "scheme-sathi")]
#[command(about = "Session history console for the Scheme Sathi welfare assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init,
    /// Show configuration and storage status
    Status,
    /// Record a session interactively
    Shell,
    /// Inspect saved sessions
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved sessions, newest first
    List,
    /// Print one saved session
    Show {
        /// Session ID
        id: String,
    },
    /// Delete a saved session
    Delete {
        /// Session ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    if let Commands::Init = cli.command {
        return run_init(&config_loader);
    }

    let config = config_loader.load()?;
    let _log_guard = init_logging(&resolve_log_dir(&config_loader, &config.logging));

    match cli.command {
        // Handled above, before the config is loaded
        Commands::Init => {}
        Commands::Status => {
            info!("Showing status");
            run_status(&config_loader, &config)?;
        }
        Commands::Shell => {
            info!("Starting session console");
            run_console(&config).await?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List => run_history_list(&config),
            HistoryCommands::Show { id } => run_history_show(&config, &id)?,
            HistoryCommands::Delete { id } => {
                info!("Deleting session: {}", id);
                run_history_delete(&config, &id)?;
            }
        },
    }

    Ok(())
}

/// Relative log directories live under the config directory
fn resolve_log_dir(loader: &ConfigLoader, logging: &LoggingConfig) -> LoggingConfig {
    let mut resolved = logging.clone();
    let dir = expand_tilde(&logging.dir);
    let dir = if dir.is_relative() {
        loader.config_dir().join(dir)
    } else {
        dir
    };
    resolved.dir = dir.to_string_lossy().to_string();
    resolved
}

fn open_manager(config: &Config) -> SessionManager {
    let store = JsonFileStore::from_config(&config.storage);
    SessionManager::from_config(Box::new(store), config)
}

/// Write the default configuration
fn run_init(loader: &ConfigLoader) -> Result<()> {
    let config_path = loader.config_path();
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Init cancelled.");
            return Ok(());
        }
    }

    let config = Config::default();
    loader.save(&config)?;
    std::fs::create_dir_all(expand_tilde(&config.storage.dir))?;

    println!(
        "{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!(
        "  {} - Record a session",
        style("scheme-sathi shell").cyan()
    );
    println!(
        "  {} - Browse saved sessions",
        style("scheme-sathi history list").cyan()
    );
    Ok(())
}

/// Show status information
fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    let store = JsonFileStore::from_config(&config.storage);
    let manager = SessionManager::from_config(Box::new(store.clone()), config);

    println!("{}", style("Scheme Sathi Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    let config_state = if loader.config_path().exists() {
        style("found").green()
    } else {
        style("defaults").dim()
    };
    println!("  Config file: {} ({})", loader.config_path().display(), config_state);
    println!("  Log level: {}", config.logging.level);
    println!();

    println!("{}", style("Storage:").bold());
    println!("  Slot: {}", store.path().display());
    println!(
        "  Saved sessions: {}/{}",
        manager.session_count(),
        config.storage.max_sessions
    );
    Ok(())
}

async fn run_console(config: &Config) -> Result<()> {
    let manager = open_manager(config);
    let (handle, actor) = SessionActor::spawn(manager);

    let result = shell::run_shell(handle).await;
    // Shell owned the only handle, so the actor stops once it returns
    let manager = actor.await?;
    info!(
        "Console closed with {} saved sessions",
        manager.session_count()
    );
    result
}

fn run_history_list(config: &Config) {
    let manager = open_manager(config);
    shell::print_summaries(&manager.list_sessions());
}

fn run_history_show(config: &Config, id: &str) -> Result<()> {
    let manager = open_manager(config);
    let record = manager
        .get_session(id)
        .ok_or_else(|| anyhow::anyhow!("No saved session with id {}", id))?;
    shell::print_session(record);
    Ok(())
}

fn run_history_delete(config: &Config, id: &str) -> Result<()> {
    let mut manager = open_manager(config);
    if manager.delete_session(id)? {
        println!("{} {}", style("Deleted session").green(), id);
    } else {
        println!("{} {}", style("No saved session").yellow(), id);
    }
    Ok(())
}
