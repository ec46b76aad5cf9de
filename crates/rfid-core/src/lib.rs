//! # rfid-core
//!
//! Core types and traits for the RFID antenna server.
//!
//! This crate provides the foundational types shared by the server, the
//! reader implementations and the client:
//! - Single-byte command decoding
//! - Antenna ports and the current selection
//! - Tag read results
//! - Reader requests, responses and the `ReaderDevice` trait
//! - Reply framing

pub mod antenna;
pub mod command;
pub mod error;
pub mod reader;
pub mod tag;
pub mod wire;

pub use antenna::{AntennaPort, AntennaSelection};
pub use command::Command;
pub use error::{RfidError, Result};
pub use reader::{ReaderDevice, ReaderEnumerator, ReaderRequest, ReaderResponse, ResponseCode, TagType};
pub use tag::{TagReadResult, format_tid};
pub use wire::Framing;
