//! Client for the RFID antenna server
//!
//! This crate provides a client that drives the single-byte command protocol
//! over TCP and parses tag reports.

use rfid_core::tag::NO_CARD;
use rfid_core::wire::MAX_FRAME_LEN;
use rfid_core::{AntennaPort, Command, Framing, Result, RfidError};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// A tag report received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagReport {
    /// A tag was read on the antenna identified by `antenna_label`
    Card {
        tag_id: Vec<u8>,
        antenna_label: String,
    },
    /// No tag on the current antenna
    NoCard,
}

impl TagReport {
    /// Parse a reply payload: `<hex>.<label>` or `NOCARD`
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| RfidError::ProtocolError(format!("Reply is not ASCII: {}", e)))?;

        if text == NO_CARD {
            return Ok(TagReport::NoCard);
        }

        let (tid, label) = text
            .rsplit_once('.')
            .ok_or_else(|| RfidError::ProtocolError(format!("Malformed tag report: {}", text)))?;
        if label.is_empty() {
            return Err(RfidError::ProtocolError(format!(
                "Tag report without antenna: {}",
                text
            )));
        }

        let tag_id = hex::decode(tid)
            .map_err(|e| RfidError::ProtocolError(format!("Invalid tag id '{}': {}", tid, e)))?;

        Ok(TagReport::Card {
            tag_id,
            antenna_label: label.to_string(),
        })
    }
}

/// Client connected to an antenna server
pub struct AntennaClient {
    stream: BufReader<TcpStream>,
    framing: Framing,
}

impl AntennaClient {
    /// Connect using the server's default raw framing
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::connect_with_framing(addr, Framing::Raw).await
    }

    /// Connect expecting replies in `framing`
    pub async fn connect_with_framing<A: ToSocketAddrs>(addr: A, framing: Framing) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| RfidError::Transport(format!("Failed to connect: {}", e)))?;
        stream
            .set_nodelay(true)
            .map_err(|e| RfidError::Transport(format!("Failed to set TCP_NODELAY: {}", e)))?;

        Ok(Self {
            stream: BufReader::new(stream),
            framing,
        })
    }

    /// Select an antenna; the server sends no reply
    pub async fn switch_antenna(&mut self, port: AntennaPort) -> Result<()> {
        self.send(Command::from(port)).await
    }

    /// Poll the current antenna and wait for the report
    pub async fn request_tag(&mut self) -> Result<TagReport> {
        self.send(Command::PollTag).await?;
        let payload = self.read_reply().await?;
        debug!("Reply: {}", String::from_utf8_lossy(&payload));
        TagReport::parse(&payload)
    }

    /// End the session and close the connection
    pub async fn quit(mut self) -> Result<()> {
        self.send(Command::Quit).await?;
        self.stream
            .get_mut()
            .shutdown()
            .await
            .map_err(|e| RfidError::Transport(format!("Shutdown failed: {}", e)))
    }

    async fn send(&mut self, command: Command) -> Result<()> {
        let stream = self.stream.get_mut();
        stream
            .write_all(&[command.encode()])
            .await
            .map_err(|e| RfidError::Transport(format!("Command write failed: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| RfidError::Transport(format!("Command flush failed: {}", e)))
    }

    async fn read_reply(&mut self) -> Result<Vec<u8>> {
        match self.framing {
            Framing::Raw => {
                // No delimiter: take whatever the next read delivers
                let buf = self
                    .stream
                    .fill_buf()
                    .await
                    .map_err(|e| RfidError::Transport(format!("Reply read failed: {}", e)))?;
                if buf.is_empty() {
                    return Err(RfidError::Transport("Server closed the connection".into()));
                }
                let payload = buf.to_vec();
                self.stream.consume(payload.len());
                Ok(payload)
            }
            Framing::Newline => {
                let mut line = Vec::new();
                let n = self
                    .stream
                    .read_until(b'\n', &mut line)
                    .await
                    .map_err(|e| RfidError::Transport(format!("Reply read failed: {}", e)))?;
                if n == 0 || line.last() != Some(&b'\n') {
                    return Err(RfidError::Transport("Server closed the connection".into()));
                }
                line.pop();
                Ok(line)
            }
            Framing::LengthPrefixed => {
                let mut len_bytes = [0u8; 4];
                self.stream
                    .read_exact(&mut len_bytes)
                    .await
                    .map_err(|e| RfidError::Transport(format!("Reply read length failed: {}", e)))?;
                let len = u32::from_le_bytes(len_bytes) as usize;

                if len > MAX_FRAME_LEN {
                    return Err(RfidError::ProtocolError(format!(
                        "Reply too large: {} bytes",
                        len
                    )));
                }

                let mut data = vec![0u8; len];
                self.stream
                    .read_exact(&mut data)
                    .await
                    .map_err(|e| RfidError::Transport(format!("Reply read data failed: {}", e)))?;
                Ok(data)
            }
        }
    }
}
