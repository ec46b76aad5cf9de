//! Simulated RFID reader
//!
//! This crate provides:
//! - `SimulatedReader`, a `ReaderDevice` answering from a per-antenna tag table
//! - `SimHandle` for placing tags and inspecting issued requests while the
//!   reader is owned by the server
//! - `SimulatedEnumerator` for startup discovery

pub mod reader;

pub use reader::{SimConfig, SimHandle, SimulatedEnumerator, SimulatedReader, parse_tag_spec};
