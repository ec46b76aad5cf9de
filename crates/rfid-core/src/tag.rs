//! Tag read results

/// Payload reported when no tag answered the poll
pub const NO_CARD: &str = "NOCARD";

/// Outcome of one tag poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagReadResult {
    /// A tag was selected on the current antenna
    Found {
        tag_id: Vec<u8>,
        antenna_label: String,
    },
    /// No tag present
    NoCard,
}

impl TagReadResult {
    /// Render the textual report: `<TIDHEX>.<label>` or `NOCARD`
    pub fn report(&self) -> String {
        match self {
            TagReadResult::Found {
                tag_id,
                antenna_label,
            } => format!("{}.{}", format_tid(tag_id), antenna_label),
            TagReadResult::NoCard => NO_CARD.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TagReadResult::Found { .. })
    }
}

/// Format a tag identifier as uppercase hex, two digits per byte
pub fn format_tid(tid: &[u8]) -> String {
    hex::encode_upper(tid)
}
