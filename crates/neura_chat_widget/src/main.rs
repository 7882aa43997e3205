//! neura-chat: terminal front-end for the Neura chat widget.
//! Reads config, then either sends one message given on the command line or
//! reads gestures from stdin line by line (`/upgrade`, `/bg`, `/lang`,
//! `/voice`, `/health`, `/quit`, anything else is sent as chat).

use clap::Parser;
use futures_util::future::join_all;
use neura_chat_client::config::{self, Config, ConfigError};
use neura_chat_client::GatewayClient;
use neura_chat_widget::{commands, Dispatch, Gesture, Surface, TerminalRenderer};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neura-chat")]
#[command(about = "Chat with a Neura backend from the terminal")]
struct Args {
    /// Config file (default: ~/.neura-chat/config.yaml)
    #[arg(long, env = "NEURA_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Send this one message and exit instead of reading stdin
    message: Option<String>,
}

/// An explicitly named config must load; the default one may be absent.
fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => config::load(path),
        None => match config::default_config_path() {
            Some(path) => config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    }
}

fn init_tracing() {
    // stdout carries the transcript; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let cfg = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = rt.block_on(run(cfg, args.message));
    // Don't wait on a stdin read that may still be parked on a blocking thread.
    rt.shutdown_background();
    code
}

async fn run(cfg: Config, message: Option<String>) -> ExitCode {
    let backend = GatewayClient::from_server(&cfg.server);
    let surface = Arc::new(Surface::new(backend, TerminalRenderer::stdout(), &cfg));

    if let Some(message) = message {
        return match surface.submit_user_message(&message).await {
            Dispatch::Completed => ExitCode::SUCCESS,
            Dispatch::Failed(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
            Dispatch::Dropped | Dispatch::Rejected(_) => {
                eprintln!("Error: no message provided");
                ExitCode::FAILURE
            }
        };
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = Vec::new();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("failed to read stdin: {}", e);
                break;
            }
        };
        match commands::parse(&line) {
            Gesture::Quit => break,
            gesture => in_flight.push(surface.spawn(gesture)),
        }
    }

    // Let every gesture already fired finish rendering before exiting.
    for result in join_all(in_flight).await {
        match result {
            Ok(Dispatch::Rejected(e)) => eprintln!("Error: {}", e),
            Ok(_) => {}
            Err(e) => tracing::error!("gesture task panicked: {}", e),
        }
    }
    ExitCode::SUCCESS
}
