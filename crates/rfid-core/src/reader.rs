//! Reader Interface: requests, responses and the device traits
//!
//! The server never talks to hardware directly. Everything it needs from a
//! physical reader goes through [`ReaderDevice`], and the reader is located at
//! startup through a [`ReaderEnumerator`].

use crate::error::Result;
use async_trait::async_trait;

/// System parameter address that enables parameter writes
pub const PARAM_WRITE_ENABLE: u16 = 8;

/// System parameter address of the antenna multiplexer
pub const PARAM_ANTENNA_SELECT: u16 = 9;

/// System parameter address of the reader serial number
pub const PARAM_SERIAL_NUMBER: u16 = 0;

/// Tag family targeted by a select request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    /// ISO 14443A MIFARE Ultralight
    IsoMifareUltralight,
}

/// A hardware request issued to the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderRequest {
    /// Select a tag in the field of the active antenna
    SelectTag { tag_type: TagType, inventory: bool },
    /// Read `blocks` system parameter blocks starting at `address`
    ReadSystemParameter { address: u16, blocks: u16 },
    /// Write `data` into `blocks` system parameter blocks at `address`
    WriteSystemParameter {
        address: u16,
        blocks: u16,
        data: Vec<u8>,
    },
}

impl ReaderRequest {
    /// Request used by every tag poll
    pub fn select_tag() -> Self {
        ReaderRequest::SelectTag {
            tag_type: TagType::IsoMifareUltralight,
            inventory: true,
        }
    }

    /// Single-block system parameter write
    pub fn write_parameter(address: u16, value: u8) -> Self {
        ReaderRequest::WriteSystemParameter {
            address,
            blocks: 1,
            data: vec![value],
        }
    }

    /// Serial number read (4 blocks at address 0)
    pub fn read_serial_number() -> Self {
        ReaderRequest::ReadSystemParameter {
            address: PARAM_SERIAL_NUMBER,
            blocks: 4,
        }
    }
}

/// Response code reported by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    SelectTagPass,
    /// Inventory still running; more responses follow
    SelectTagLoopActive,
    SelectTagFail,
    ReadSystemParameterPass,
    ReadSystemParameterFail,
    WriteSystemParameterPass,
    WriteSystemParameterFail,
}

/// A response fetched from the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderResponse {
    /// Whether the reader reported success
    pub success: bool,
    /// Response code
    pub code: ResponseCode,
    /// Tag identifier (select responses)
    pub tid: Vec<u8>,
    /// Parameter data (read responses)
    pub data: Vec<u8>,
}

impl ReaderResponse {
    pub fn new(success: bool, code: ResponseCode) -> Self {
        Self {
            success,
            code,
            tid: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Successful tag selection carrying `tid`
    pub fn tag_selected(tid: impl Into<Vec<u8>>) -> Self {
        Self {
            tid: tid.into(),
            ..Self::new(true, ResponseCode::SelectTagPass)
        }
    }

    /// Successful parameter read carrying `data`
    pub fn parameter_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(true, ResponseCode::ReadSystemParameterPass)
        }
    }
}

/// Trait for a physical (or simulated) RFID reader
///
/// Requests and responses are decoupled: `issue` starts a hardware request and
/// `response` fetches the next pending response, `None` when nothing is
/// pending. The device cannot be addressed concurrently, which callers enforce
/// by holding it through `&mut`.
#[async_trait]
pub trait ReaderDevice: Send + 'static {
    /// Human-readable device name for logs
    fn name(&self) -> &str;

    /// Acquire the device
    async fn open(&mut self) -> Result<()>;

    /// Begin a hardware request
    async fn issue(&mut self, request: &ReaderRequest) -> Result<()>;

    /// Fetch the next response for the last issued request
    async fn response(&mut self) -> Result<Option<ReaderResponse>>;
}

/// Locates readers attached to the host
#[async_trait]
pub trait ReaderEnumerator: Send + Sync {
    type Device: ReaderDevice;

    /// List attached readers, empty when none are found
    async fn enumerate(&self) -> Result<Vec<Self::Device>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_antenna_write_request() {
        let req = ReaderRequest::write_parameter(PARAM_ANTENNA_SELECT, 0x83);
        assert_eq!(
            req,
            ReaderRequest::WriteSystemParameter {
                address: 9,
                blocks: 1,
                data: vec![0x83],
            }
        );
    }

    #[test]
    fn test_select_tag_targets_ultralight_inventory() {
        match ReaderRequest::select_tag() {
            ReaderRequest::SelectTag {
                tag_type,
                inventory,
            } => {
                assert_eq!(tag_type, TagType::IsoMifareUltralight);
                assert!(inventory);
            }
            other => panic!("Wrong request: {:?}", other),
        }
    }

    #[test]
    fn test_response_constructors() {
        let resp = ReaderResponse::tag_selected(vec![0xAA, 0x11]);
        assert!(resp.success);
        assert_eq!(resp.code, ResponseCode::SelectTagPass);
        assert_eq!(resp.tid, vec![0xAA, 0x11]);

        let resp = ReaderResponse::parameter_data([1, 2, 3, 4]);
        assert_eq!(resp.code, ResponseCode::ReadSystemParameterPass);
        assert_eq!(resp.data.len(), 4);
    }
}
