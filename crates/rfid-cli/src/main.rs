//! rfid-server: RFID antenna server
//!
//! Locates the reader, initializes it, then serves the single-byte antenna
//! protocol on TCP port 6666 to one controller at a time.
//!
//! Configuration comes from defaults, then `RFID_*` environment variables,
//! then command-line flags. Log verbosity follows `RUST_LOG` (default `info`).

mod args;

use anyhow::Result;
use args::CliArgs;
use clap::Parser;
use rfid_core::ReaderEnumerator;
use rfid_server::{RfidServer, ServerConfig};
use rfid_sim::{SimulatedEnumerator, SimulatedReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let enumerator = if cli.simulate() {
        let reader = SimulatedReader::new();
        let handle = reader.handle();
        for (port, tid) in &cli.sim_tags {
            info!("Simulated tag {} on {} antenna", rfid_core::format_tid(tid), port);
            handle.place_tag(*port, tid.clone());
        }
        SimulatedEnumerator::new(vec![reader])
    } else {
        // No hardware backend is linked into this binary
        SimulatedEnumerator::empty()
    };

    serve(&enumerator, cli.server_config()).await
}

async fn serve<E: ReaderEnumerator>(enumerator: &E, config: ServerConfig) -> Result<()> {
    info!("RFID antenna server starting on {}", config.bind_addr);
    let server = RfidServer::from_enumerator(enumerator, config).await?;
    server.run().await?;
    Ok(())
}
