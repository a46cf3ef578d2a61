//! Crossing Watch - terminal dashboard for a four-way intersection
//!
//! Prints one status line per snapshot and reads operator commands from stdin.
//! Logs go to stderr (`RUST_LOG`, default `crossing_watch=info`).

use crossing::fallback::FallbackSimulator;
use crossing_watch::console::{self, OperatorCommand};
use crossing_watch::{HttpController, Synchronizer, WatchConfig};
use futures_util::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crossing_watch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = WatchConfig::load()?;
    info!(
        controller = %config.controller_url,
        interval_ms = config.poll_interval_ms,
        "crossing-watch starting"
    );

    let api = HttpController::new(&config.controller_url, config.request_timeout())?;
    let simulator = match config.seed {
        Some(seed) => FallbackSimulator::new(config.fallback, seed),
        None => FallbackSimulator::from_clock(config.fallback),
    };
    let sync = Synchronizer::new(api, config.poll_interval(), simulator);
    let overrides = sync.overrides();
    let mut views = sync.subscribe();

    println!("{}", console::HELP);
    sync.start();

    let mut commands = FramedRead::new(tokio::io::stdin(), LinesCodec::new_with_max_length(256));
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                println!("{}", console::status_line(&view));
            }
            line = commands.next(), if stdin_open => match line {
                Some(Ok(line)) => match OperatorCommand::parse(&line) {
                    None => {}
                    Some(Err(e)) => println!("{e}. {}", console::HELP),
                    Some(Ok(cmd)) => match cmd {
                        OperatorCommand::Select(d) => {
                            if overrides.enabled() {
                                overrides.dispatch_select(d);
                            } else {
                                println!("controls disabled while offline");
                            }
                        }
                        OperatorCommand::EndOverride => {
                            if overrides.enabled() {
                                overrides.dispatch_end();
                            } else {
                                println!("controls disabled while offline");
                            }
                        }
                        OperatorCommand::Pause => {
                            sync.stop();
                        }
                        OperatorCommand::Resume => {
                            sync.start();
                        }
                        OperatorCommand::Refresh => {
                            let s = sync.clone();
                            tokio::spawn(async move { s.sync_once().await });
                        }
                        OperatorCommand::Help => println!("{}", console::HELP),
                        OperatorCommand::Quit => break,
                    },
                },
                Some(Err(e)) => warn!(error = %e, "bad operator input"),
                None => {
                    info!("stdin closed; view-only mode (Ctrl-C to exit)");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sync.stop();
    info!("crossing-watch stopped");
    Ok(())
}
