//! Entry point for `wlan-sim`.
//!
//! Parses CLI arguments and dispatches into either **ap** or **station**
//! mode.  All protocol work is delegated to library modules; `main.rs`
//! owns only process setup (logging, argument parsing, exit status).

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use wlan_sim::ap::AccessPoint;
use wlan_sim::latency::LatencyPolicy;
use wlan_sim::socket::Socket;
use wlan_sim::station::Station;

/// Simulated 802.11-style frame exchange over UDP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run as the access point, answering frames until killed.
    Ap {
        /// Local address to bind.
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        /// Simulated processing delay in milliseconds.
        #[arg(long, default_value_t = 4000)]
        processing_delay_ms: u64,

        /// Simulated pre-response delay in milliseconds.
        #[arg(long, default_value_t = 1000)]
        response_delay_ms: u64,
    },
    /// Run the station's scripted session once and exit.
    Station {
        /// Access point address.
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        ap: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Ap {
            bind,
            processing_delay_ms,
            response_delay_ms,
        } => {
            let socket = match Socket::bind(bind).await {
                Ok(s) => s,
                Err(e) => {
                    log::error!("[ap] bind {bind} failed: {e}");
                    return ExitCode::FAILURE;
                }
            };
            let latency = LatencyPolicy::new(
                Duration::from_millis(processing_delay_ms),
                Duration::from_millis(response_delay_ms),
            );
            if let Err(e) = AccessPoint::new(socket, latency).serve().await {
                log::error!("[ap] serve failed: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Mode::Station { ap } => {
            // Ephemeral local port in the AP's address family.
            let bind: SocketAddr = match ap {
                SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
                SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
            };
            let socket = match Socket::bind(bind).await {
                Ok(s) => s,
                Err(e) => {
                    log::error!("[sta] bind failed: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match Station::new(socket, ap).run().await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("[sta] session failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
