//! Signaling relay server
//!
//! Run with: signal-relay [BIND_ADDR]
//!
//! Without an argument the relay binds to `0.0.0.0:$PORT` when `PORT` is set,
//! else to `0.0.0.0:3000`. Log verbosity follows `RUST_LOG`.

use std::net::SocketAddr;

use signal_relay::server::config::{parse_bind_addr, DEFAULT_PORT};
use signal_relay::{RelayServer, ServerConfig};

fn print_usage() {
    eprintln!("Usage: signal-relay [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:$PORT or 0.0.0.0:3000)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  signal-relay                      # binds to 0.0.0.0:3000");
    eprintln!("  signal-relay localhost            # binds to 127.0.0.1:3000");
    eprintln!("  signal-relay 127.0.0.1:8080       # binds to 127.0.0.1:8080");
    eprintln!("  PORT=4000 signal-relay            # binds to 0.0.0.0:4000");
}

fn default_bind_addr() -> Result<SocketAddr, String> {
    let port = match std::env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .map_err(|_| format!("Invalid PORT: '{}'", port))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(arg) => parse_bind_addr(arg),
        None => default_bind_addr(),
    };
    let bind_addr = match bind_addr {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("signal_relay=info")),
        )
        .init();

    let server = RelayServer::new(ServerConfig::with_addr(bind_addr));

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = server.relay().stats().await;
    tracing::info!(
        total_connections = stats.total_connections,
        messages_routed = stats.messages_routed,
        deliveries_dropped = stats.deliveries_dropped,
        uptime_secs = stats.uptime.as_secs(),
        "Relay stopped"
    );

    Ok(())
}
