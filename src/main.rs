use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bpsr::capture::{PacketCapture, PcapFileSource, DEFAULT_STOP_TIMEOUT};
use bpsr::config::Config;
use bpsr::handler::{register_general_handlers, register_world_handlers, HandlerRegistry};
use bpsr::protocol::services::{self, chit_chat_ntf};

/// Passive analyzer for captured BPSR game traffic.
#[derive(Parser, Debug)]
#[command(name = "bpsr", version, about)]
struct Cli {
    /// pcap capture file to analyze.
    pcap_file: PathBuf,

    /// IPv4 address of the game client in the capture.
    #[arg(long)]
    client_ip: Ipv4Addr,

    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load_from_file(&config_path);
    if config.forwarder.enabled {
        // The WebSocket publisher runs as a separate process; this tool only
        // decodes and logs chat lines.
        tracing::warn!(
            "chat forwarding to {} is configured externally, decoded chat is logged only",
            config.forwarder.websocket_url
        );
    }

    let mut registry = HandlerRegistry::new();
    register_general_handlers(&mut registry);
    register_world_handlers(&mut registry);
    registry.register_notify_handler(
        services::CHIT_CHAT_NTF,
        chit_chat_ntf::NOTIFY_NEWEST_CHIT_CHAT_MSGS,
        |msg, notify| {
            tracing::debug!(
                "[{}] chat push: {} bytes",
                msg.direction(),
                notify.payload.as_ref().map_or(0, bytes::Bytes::len)
            );
            Ok(())
        },
    );

    let source = PcapFileSource::open(&cli.pcap_file)?;
    let capture = PacketCapture::new(Arc::new(registry), cli.client_ip);
    let handle = capture.spawn(source);

    // Run until the file is exhausted or the user interrupts.
    loop {
        if handle.is_finished() {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, stopping capture");
                break;
            }
            _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {}
        }
    }

    handle.stop(DEFAULT_STOP_TIMEOUT)?;
    Ok(())
}
