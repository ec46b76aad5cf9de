//! # rfid-server
//!
//! Single-client TCP server for an RFID antenna reader.
//!
//! This crate provides:
//! - `ReaderContext` holding the device and its antenna selection
//! - `AntennaController`, `TagPoller` and `ResponseEncoder`
//! - `CommandLoop`, the per-connection state machine
//! - `RfidServer`, the accept loop serving one client at a time

pub mod antenna;
pub mod config;
pub mod context;
pub mod encoder;
pub mod init;
pub mod poller;
pub mod session;

pub use antenna::AntennaController;
pub use config::{DEFAULT_PORT, ServerConfig};
pub use context::ReaderContext;
pub use encoder::ResponseEncoder;
pub use poller::TagPoller;
pub use session::{CommandLoop, SessionEnd, SessionHandlers, SessionState, SessionSummary};

use rfid_core::{ReaderDevice, ReaderEnumerator, Result, RfidError};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// RFID antenna server
pub struct RfidServer<D: ReaderDevice> {
    /// Reader and antenna selection, lent to one session at a time
    context: ReaderContext<D>,
    /// Session components
    handlers: SessionHandlers,
    /// Server configuration
    config: ServerConfig,
}

impl<D: ReaderDevice> RfidServer<D> {
    /// Create a server around an unopened device
    pub fn new(device: D, config: ServerConfig) -> Self {
        let handlers = SessionHandlers {
            controller: AntennaController::from_config(&config),
            poller: TagPoller::from_config(&config),
            encoder: ResponseEncoder::new(config.framing),
        };

        Self {
            context: ReaderContext::new(device),
            handlers,
            config,
        }
    }

    /// Locate the first reader, open and initialize it
    ///
    /// Fails with `NoReader` when enumeration finds nothing.
    pub async fn from_enumerator<E>(enumerator: &E, config: ServerConfig) -> Result<Self>
    where
        E: ReaderEnumerator<Device = D>,
    {
        let mut devices = enumerator.enumerate().await?;
        if devices.is_empty() {
            error!("No USB readers found");
            return Err(RfidError::NoReader);
        }

        let device = devices.remove(0);
        info!("Found reader {}", device.name());

        let mut server = Self::new(device, config);
        server.initialize().await?;
        Ok(server)
    }

    /// Run the reader start-up sequence, returning its serial number
    pub async fn initialize(&mut self) -> Result<Option<String>> {
        init::initialize_reader(&mut self.context, &self.handlers.controller).await
    }

    pub fn context(&self) -> &ReaderContext<D> {
        &self.context
    }

    /// Bind the configured address and serve forever
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| {
                RfidError::Transport(format!("Failed to bind {}: {}", self.config.bind_addr, e))
            })?;
        self.serve(listener).await
    }

    /// Serve clients from `listener`, one at a time, forever
    pub async fn serve(mut self, listener: TcpListener) -> Result<()> {
        match listener.local_addr() {
            Ok(addr) => info!("Server started on {} (framing: {})", addr, self.config.framing),
            Err(e) => warn!("Server started, local address unknown: {}", e),
        }

        loop {
            let (mut socket, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    sleep(self.config.retry_interval).await;
                    continue;
                }
            };

            info!("Accepted new client {}", addr);
            if let Err(e) = socket.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
            }

            match self.serve_session(&mut socket).await {
                Ok(summary) => info!(
                    "Client {} done ({:?}): {} commands, {} polls, {} tags",
                    addr, summary.end, summary.commands, summary.polls, summary.tags_found
                ),
                Err(e) => error!("Session with {} failed: {}", addr, e),
            }

            if let Err(e) = socket.shutdown().await {
                debug!("Shutdown of {} failed: {}", addr, e);
            }
            info!("Connection dropped, waiting for next client");
        }
    }

    /// Run one session on an already-accepted stream
    pub async fn serve_session<S>(&mut self, stream: &mut S) -> Result<SessionSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        CommandLoop::new(&self.handlers)
            .run(stream, &mut self.context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfid_sim::{SimulatedEnumerator, SimulatedReader};

    #[tokio::test]
    async fn test_no_reader_is_fatal() {
        let result =
            RfidServer::from_enumerator(&SimulatedEnumerator::empty(), ServerConfig::default())
                .await;
        assert!(matches!(result, Err(RfidError::NoReader)));
    }

    #[tokio::test]
    async fn test_from_enumerator_initializes_first_reader() {
        let first = SimulatedReader::new();
        let second = SimulatedReader::new();
        let (first_handle, second_handle) = (first.handle(), second.handle());

        let server = RfidServer::from_enumerator(
            &SimulatedEnumerator::new(vec![first, second]),
            ServerConfig::default(),
        )
        .await
        .unwrap();

        assert!(first_handle.is_open());
        assert!(!second_handle.is_open());
        assert_eq!(server.context().label(), "81");
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let config = ServerConfig {
            bind_addr: "not-an-address".into(),
            ..Default::default()
        };
        let result = RfidServer::new(SimulatedReader::new(), config).run().await;
        assert!(matches!(result, Err(RfidError::Transport(_))));
    }
}
