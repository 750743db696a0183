mod host;
mod modules;
mod surface;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use warden_commands::{resolve, CommandDispatcher, DispatcherOptions, ProviderRegistry};
use warden_config::defaults::{DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_MAX_IN_FLIGHT};
use warden_config::{config_dir, config_file_path, load_and_prepare, WardenConfig};
use warden_core::{MessageContext, MessagingSurface};
use warden_logging::{init_logger, DispatchEventLogger, LoggerOptions};

use surface::ConsoleSurface;
use terminal_output::{format_note, supports_color};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden — command dispatch for chat bots")]
#[command(version)]
struct Cli {
    /// Config file (default: $WARDEN_CONFIG_DIR/config.yaml or ~/.warden/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin, one per line, and dispatch them
    Run,
    /// Show which option a token resolves to
    Resolve {
        token: String,
        options: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { token, options } => {
            match resolve(&token, &options) {
                Some(option) => println!("{option}"),
                None => println!("{}", format_note(&format!("`{token}` matches no option"), supports_color())),
            }
            Ok(())
        }
        Commands::Run => {
            let path = cli.config.unwrap_or_else(|| config_file_path(&config_dir()));
            let config = load_and_prepare(&path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            run(config).await
        }
    }
}

async fn run(config: WardenConfig) -> Result<()> {
    let logging = config.logging();
    init_logger(&LoggerOptions {
        level: logging.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
        dir: PathBuf::from(logging.dir.unwrap_or_else(|| DEFAULT_LOG_DIR.into())),
        json_file: logging.json_file.unwrap_or(true),
    })?;
    DispatchEventLogger::set_redaction(logging.redact_content.unwrap_or(true));

    let dispatch = config.dispatch();
    let registry = ProviderRegistry::new();
    modules::register_all(&registry, &config.modules()).await;
    let dispatcher = CommandDispatcher::new(registry.clone()).with_options(DispatcherOptions {
        execute_timeout: dispatch.execute_timeout_ms.map(Duration::from_millis),
    });

    let color = supports_color();
    let surface: Arc<dyn MessagingSurface> = Arc::new(ConsoleSurface::new(color));
    let author = std::env::var("USER").unwrap_or_else(|_| "console".into());
    let permits = Arc::new(Semaphore::new(dispatch.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT).max(1)));

    info!("[Warden] Ready with modules: {}", registry.names().await.join(", "));
    eprintln!("{}", format_note("Type a command, or `help`. Ctrl-D to quit.", color));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let permit = permits.clone().acquire_owned().await?;
        let dispatcher = dispatcher.clone();
        let surface = surface.clone();
        let ctx = MessageContext::console(&author, line);
        tasks.spawn(async move {
            host::handle_message(&dispatcher, surface.as_ref(), ctx).await;
            drop(permit);
        });
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                error!("[Warden] Message task failed: {}", e);
            }
        }
    }

    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            error!("[Warden] Message task failed: {}", e);
        }
    }
    info!("[Warden] stdin closed, shutting down");
    Ok(())
}
