//! topicmap — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Restore the workspace from the work dir
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Spawn the autosave timer
//!   8. Run the console until quit / EOF / shutdown
//!   9. Cancel token, persist the working graph

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use topicmap::app::Workspace;
use topicmap::autosave::{AutosaveService, AutosaveTick};
use topicmap::console::Console;
use topicmap::{config, error, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();
    let config = config::load(args.config_path.as_deref())?;

    logger::init(args.log_level.unwrap_or(config.log_level.as_str()))?;

    info!(
        app_name = %config.app_name,
        work_dir = %config.work_dir.display(),
        provider = %config.llm.provider,
        "config loaded"
    );

    let workspace = Workspace::open(&config)?;
    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let (tick_tx, tick_rx) = mpsc::channel(4);
    let autosave = AutosaveService::new(
        workspace.subscribe(),
        tick_tx,
        config.autosave_debounce,
        shutdown.clone(),
    );
    let autosave_handle = tokio::spawn(autosave.run());

    let console = Console::new(workspace, config.work_dir.join("exports"));
    let mut workspace = console.run(tick_rx, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = autosave_handle.await {
        warn!("autosave task panicked: {e}");
    }

    // Same as a final autosave tick; an empty graph still persists the store.
    let revision = workspace.document().revision();
    if !workspace.autosave(AutosaveTick { revision })? {
        workspace.persist()?;
    }
    info!("shutdown complete");
    Ok(())
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: topicmap [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: {})", config::DEFAULT_CONFIG_PATH);
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Logs share the terminal with the console, so the default is quiet:
    //   -v      → info
    //   -vv     → debug
    //   -vvv+   → trace (full prompts and replies)
    let log_level = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
