//! Per-connection command loop

use crate::antenna::AntennaController;
use crate::context::ReaderContext;
use crate::encoder::ResponseEncoder;
use crate::poller::TagPoller;
use rfid_core::{AntennaPort, Command, ReaderDevice, Result};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, trace, warn};

/// Components a session dispatches to
#[derive(Debug, Clone, Default)]
pub struct SessionHandlers {
    pub controller: AntennaController,
    pub poller: TagPoller,
    pub encoder: ResponseEncoder,
}

/// Where the command loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, initial antenna not yet selected
    Idle,
    /// Blocked reading the next command byte
    AwaitingByte,
    /// Running a command against the reader
    Dispatching,
    /// Loop returned
    Terminated,
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent `q`
    Quit,
    /// Client closed the connection
    Disconnected,
    /// Reading the next byte failed
    ReadFailed(String),
}

/// What happened during one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Command bytes read, including the final `q`
    pub commands: u64,
    /// Tag polls answered
    pub polls: u64,
    /// Polls that found a tag
    pub tags_found: u64,
    pub end: SessionEnd,
}

/// Reads one command byte at a time and dispatches it
pub struct CommandLoop<'a> {
    handlers: &'a SessionHandlers,
    state: SessionState,
}

impl<'a> CommandLoop<'a> {
    pub fn new(handlers: &'a SessionHandlers) -> Self {
        Self {
            handlers,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion
    ///
    /// Selects the north antenna before reading anything, then handles bytes
    /// until `q`, end of stream or a read error, all of which end the session
    /// normally. Reply write failures and device timeouts are returned as
    /// errors.
    pub async fn run<S, D>(
        &mut self,
        stream: &mut S,
        ctx: &mut ReaderContext<D>,
    ) -> Result<SessionSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
        D: ReaderDevice,
    {
        self.enter(SessionState::Idle);
        let result = self.drive(stream, ctx).await;
        self.enter(SessionState::Terminated);
        result
    }

    fn enter(&mut self, state: SessionState) {
        trace!(state = ?state, "Session state");
        self.state = state;
    }

    async fn drive<S, D>(
        &mut self,
        stream: &mut S,
        ctx: &mut ReaderContext<D>,
    ) -> Result<SessionSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
        D: ReaderDevice,
    {
        self.handlers
            .controller
            .select(ctx, AntennaPort::North)
            .await?;

        let mut commands = 0;
        let mut polls = 0;
        let mut tags_found = 0;

        let end = loop {
            self.enter(SessionState::AwaitingByte);
            let byte = match stream.read_u8().await {
                Ok(byte) => byte,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break SessionEnd::Disconnected,
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break SessionEnd::ReadFailed(e.to_string());
                }
            };

            self.enter(SessionState::Dispatching);
            commands += 1;
            let command = Command::decode(byte);
            debug!("Command {:?}", command);

            match command {
                Command::Quit => break SessionEnd::Quit,
                Command::PollTag => {
                    let result = self.handlers.poller.poll(ctx).await;
                    polls += 1;
                    if result.is_found() {
                        tags_found += 1;
                    }
                    self.handlers.encoder.send(stream, &result).await?;
                }
                Command::SwitchAntenna(code) => {
                    self.handlers.controller.switch(ctx, code).await?;
                }
            }
        };

        Ok(SessionSummary {
            commands,
            polls,
            tags_found,
            end,
        })
    }
}
