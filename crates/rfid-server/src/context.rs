//! Reader context shared by the session components

use rfid_core::{AntennaPort, AntennaSelection, ReaderDevice};

/// Label reported before any antenna has been selected
pub const UNSELECTED_LABEL: &str = "80";

/// The reader device together with its current antenna selection
///
/// Owned by the server and lent to one session at a time. The antenna
/// controller is the only writer of the selection; the tag poller reads it to
/// label reports.
pub struct ReaderContext<D: ReaderDevice> {
    device: D,
    selection: Option<AntennaSelection>,
}

impl<D: ReaderDevice> ReaderContext<D> {
    /// Wrap a device with no antenna selected
    pub fn new(device: D) -> Self {
        Self {
            device,
            selection: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Current selection, `None` until the first antenna switch
    pub fn selection(&self) -> Option<&AntennaSelection> {
        self.selection.as_ref()
    }

    /// Currently selected port
    pub fn port(&self) -> Option<AntennaPort> {
        self.selection.as_ref().map(|s| s.port)
    }

    /// Label for tag reports on the current antenna
    pub fn label(&self) -> &str {
        self.selection
            .as_ref()
            .map(|s| s.label.as_str())
            .unwrap_or(UNSELECTED_LABEL)
    }

    pub(crate) fn select(&mut self, selection: AntennaSelection) {
        self.selection = Some(selection);
    }
}
