//! Reply framing
//!
//! Tag reports have no delimiter on the legacy wire; the controller relies on
//! each reply arriving as one read. The other framings make reply boundaries
//! explicit for clients that can opt in.

use crate::error::RfidError;
use std::fmt;
use std::str::FromStr;

/// Largest reply payload accepted by a length-prefixed reader
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Reply framing on the outbound stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Payload bytes only
    #[default]
    Raw,
    /// Payload followed by `\n`
    Newline,
    /// 4-byte little-endian length followed by the payload
    LengthPrefixed,
}

impl Framing {
    /// Wrap a reply payload for the wire
    ///
    /// Length-prefixed payloads larger than [`MAX_FRAME_LEN`] are rejected.
    pub fn frame(self, payload: &[u8]) -> Result<Vec<u8>, RfidError> {
        let framed = match self {
            Framing::Raw => payload.to_vec(),
            Framing::Newline => {
                let mut buf = Vec::with_capacity(payload.len() + 1);
                buf.extend_from_slice(payload);
                buf.push(b'\n');
                buf
            }
            Framing::LengthPrefixed => {
                let len = match u32::try_from(payload.len()) {
                    Ok(len) if payload.len() <= MAX_FRAME_LEN => len,
                    _ => {
                        return Err(RfidError::ProtocolError(format!(
                            "Reply too large: {} bytes",
                            payload.len()
                        )));
                    }
                };
                let mut buf = Vec::with_capacity(4 + payload.len());
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(payload);
                buf
            }
        };
        Ok(framed)
    }
}

impl FromStr for Framing {
    type Err = RfidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Framing::Raw),
            "newline" | "line" => Ok(Framing::Newline),
            "length" | "length-prefixed" => Ok(Framing::LengthPrefixed),
            other => Err(RfidError::Config(format!("Unknown framing: {}", other))),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Framing::Raw => "raw",
            Framing::Newline => "newline",
            Framing::LengthPrefixed => "length-prefixed",
        };
        f.write_str(name)
    }
}
