//! Scripted reader implementation

use async_trait::async_trait;
use rfid_core::reader::PARAM_ANTENNA_SELECT;
use rfid_core::{
    AntennaPort, ReaderDevice, ReaderEnumerator, ReaderRequest, ReaderResponse, ResponseCode,
    Result, RfidError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Behaviour knobs for a simulated reader
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Device name reported in logs
    pub name: String,
    /// Serial number returned for the serial-number read
    pub serial: Option<Vec<u8>>,
    /// Empty fetches before a parameter write is acknowledged
    pub ack_delay: u32,
    /// Never acknowledge parameter writes
    pub never_ack: bool,
    /// Answer parameter writes with a failure and leave the parameter as is
    pub reject_writes: bool,
    /// "Inventory active" responses before a select resolves
    pub select_delay: u32,
    /// Fail `open()`
    pub fail_open: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "simulated-reader".into(),
            serial: Some(vec![0x00, 0x10, 0x27, 0x42]),
            ack_delay: 0,
            never_ack: false,
            reject_writes: false,
            select_delay: 0,
            fail_open: false,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    opened: bool,
    antenna: Option<u8>,
    parameters: HashMap<u16, Vec<u8>>,
    /// Tags in the field, keyed by antenna parameter byte
    tags: HashMap<u8, Vec<u8>>,
    requests: Vec<ReaderRequest>,
    pending: VecDeque<Option<ReaderResponse>>,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory reader answering from a per-antenna tag table
pub struct SimulatedReader {
    config: SimConfig,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedReader {
    /// Create a reader with default behaviour
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a reader with custom behaviour
    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Handle for driving the reader after it has been moved into the server
    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn queue_write(&self, state: &mut SimState, address: u16, data: &[u8]) {
        if self.config.reject_writes {
            state.pending.push_back(Some(ReaderResponse::new(
                false,
                ResponseCode::WriteSystemParameterFail,
            )));
            return;
        }

        state.parameters.insert(address, data.to_vec());
        if address == PARAM_ANTENNA_SELECT {
            state.antenna = data.first().copied();
        }

        if self.config.never_ack {
            return;
        }
        for _ in 0..self.config.ack_delay {
            state.pending.push_back(None);
        }
        state.pending.push_back(Some(ReaderResponse::new(
            true,
            ResponseCode::WriteSystemParameterPass,
        )));
    }

    fn queue_read(&self, state: &mut SimState, address: u16) {
        let data = match (address, &self.config.serial) {
            (0, Some(serial)) => Some(serial.clone()),
            _ => state.parameters.get(&address).cloned(),
        };
        let response = match data {
            Some(data) => ReaderResponse::parameter_data(data),
            None => ReaderResponse::new(false, ResponseCode::ReadSystemParameterFail),
        };
        state.pending.push_back(Some(response));
    }

    fn queue_select(&self, state: &mut SimState) {
        for _ in 0..self.config.select_delay {
            state.pending.push_back(Some(ReaderResponse::new(
                true,
                ResponseCode::SelectTagLoopActive,
            )));
        }
        let tag = state.antenna.and_then(|param| state.tags.get(&param).cloned());
        let response = match tag {
            Some(tid) => ReaderResponse::tag_selected(tid),
            None => ReaderResponse::new(false, ResponseCode::SelectTagFail),
        };
        state.pending.push_back(Some(response));
    }
}

impl Default for SimulatedReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReaderDevice for SimulatedReader {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn open(&mut self) -> Result<()> {
        if self.config.fail_open {
            return Err(RfidError::Device(format!(
                "Failed to open {}",
                self.config.name
            )));
        }
        lock(&self.state).opened = true;
        debug!("Opened {}", self.config.name);
        Ok(())
    }

    async fn issue(&mut self, request: &ReaderRequest) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.opened {
            return Err(RfidError::Device("Device not open".into()));
        }

        state.requests.push(request.clone());
        state.pending.clear();

        match request {
            ReaderRequest::WriteSystemParameter { address, data, .. } => {
                self.queue_write(&mut state, *address, data)
            }
            ReaderRequest::ReadSystemParameter { address, .. } => {
                self.queue_read(&mut state, *address)
            }
            ReaderRequest::SelectTag { .. } => self.queue_select(&mut state),
        }
        Ok(())
    }

    async fn response(&mut self) -> Result<Option<ReaderResponse>> {
        let mut state = lock(&self.state);
        if !state.opened {
            return Err(RfidError::Device("Device not open".into()));
        }
        Ok(state.pending.pop_front().flatten())
    }
}

/// Shared view of a simulated reader's state
#[derive(Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// Put a tag in the field of `port`
    pub fn place_tag(&self, port: AntennaPort, tid: impl Into<Vec<u8>>) {
        lock(&self.state).tags.insert(port.parameter(), tid.into());
    }

    /// All requests issued so far, oldest first
    pub fn requests(&self) -> Vec<ReaderRequest> {
        lock(&self.state).requests.clone()
    }

    /// Parameter bytes written to the antenna multiplexer, oldest first
    pub fn antenna_writes(&self) -> Vec<u8> {
        lock(&self.state)
            .requests
            .iter()
            .filter_map(|req| match req {
                ReaderRequest::WriteSystemParameter { address, data, .. }
                    if *address == PARAM_ANTENNA_SELECT =>
                {
                    data.first().copied()
                }
                _ => None,
            })
            .collect()
    }

    /// Last value written to a system parameter
    pub fn parameter(&self, address: u16) -> Option<Vec<u8>> {
        lock(&self.state).parameters.get(&address).cloned()
    }

    /// Antenna parameter byte currently applied
    pub fn antenna(&self) -> Option<u8> {
        lock(&self.state).antenna
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).opened
    }

    /// Forget recorded requests
    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }
}

/// Enumerator handing out a fixed set of simulated readers
pub struct SimulatedEnumerator {
    devices: Mutex<Vec<SimulatedReader>>,
}

impl SimulatedEnumerator {
    pub fn new(devices: Vec<SimulatedReader>) -> Self {
        Self {
            devices: Mutex::new(devices),
        }
    }

    /// Enumerator that finds nothing
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ReaderEnumerator for SimulatedEnumerator {
    type Device = SimulatedReader;

    async fn enumerate(&self) -> Result<Vec<SimulatedReader>> {
        let mut devices = self
            .devices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(std::mem::take(&mut *devices))
    }
}

/// Parse a `<code>:<hex tid>` tag placement, e.g. `E:AA11BB22`
pub fn parse_tag_spec(spec: &str) -> Result<(AntennaPort, Vec<u8>)> {
    let (code, tid) = spec
        .split_once(':')
        .ok_or_else(|| RfidError::Config(format!("Expected <antenna>:<hex>, got '{}'", spec)))?;

    let port = match code.as_bytes() {
        [byte] => AntennaPort::from_code(*byte),
        _ => None,
    }
    .ok_or_else(|| RfidError::Config(format!("Unknown antenna code '{}'", code)))?;

    let tid = hex::decode(tid)
        .map_err(|e| RfidError::Config(format!("Invalid tag id '{}': {}", tid, e)))?;
    if tid.is_empty() {
        return Err(RfidError::Config("Tag id must not be empty".into()));
    }

    Ok((port, tid))
}
