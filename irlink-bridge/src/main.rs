//! irlink bridge — entry point.
//!
//! ```text
//! irlink-bridge                    Run with defaults
//! irlink-bridge --config <path>    Load a custom config TOML
//! irlink-bridge --unique-id <id>   Override the instance suffix
//! irlink-bridge --debug            Enable debug logging
//! irlink-bridge --gen-config       Write default config to stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use irlink_core::{LoopbackTransport, SignalController, event_channel};
use irlink_bridge::config::BridgeConfig;
use irlink_bridge::console::{spawn_printer, spawn_stdin_reader};
use irlink_bridge::simulated::SimulatedIr;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "irlink-bridge", about = "IR transceiver to Home Assistant MQTT bridge")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "irlink-bridge.toml")]
    config: PathBuf,

    /// Instance suffix (overrides config).
    #[arg(short, long)]
    unique_id: Option<String>,

    /// Enable debug logging (overrides config).
    #[arg(long)]
    debug: bool,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&BridgeConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = BridgeConfig::load(&cli.config);
    if let Some(id) = cli.unique_id {
        config.controller.unique_id = id;
    }
    if cli.debug {
        config.controller.debug = true;
    }

    // Init tracing. Stdout carries publications, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("irlink-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("node id: {}", config.controller.node_id());
    info!("heartbeat: {:?}", config.controller.heartbeat_interval());

    let broker = Arc::new(LoopbackTransport::new());
    let (events_tx, events_rx) = event_channel();
    broker.attach(events_tx.clone());
    let printer = spawn_printer(broker.tap());

    let ir = Arc::new(SimulatedIr::new(config.simulator.clone(), events_tx));
    let controller = SignalController::new(Arc::clone(&broker), ir, config.controller.clone());
    let topics = controller.topics().clone();

    let shutdown = CancellationToken::new();

    // Ctrl-C handler.
    let stop = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received — shutting down");
        stop.cancel();
    });

    let reader = spawn_stdin_reader(Arc::clone(&broker), topics, shutdown.clone());

    controller.run(events_rx, shutdown).await;

    reader.abort();
    printer.abort();
    // A pending blocking read on stdin would otherwise hold the runtime open.
    std::process::exit(0)
}
