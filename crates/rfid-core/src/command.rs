//! Single-byte commands sent by the controller

use crate::antenna::AntennaPort;

/// Byte that requests a tag poll on the current antenna
pub const POLL_TAG: u8 = b'T';

/// Byte that ends the session
pub const QUIT: u8 = b'q';

/// A command decoded from one inbound byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch antenna; unmapped codes are carried through and ignored later
    SwitchAntenna(u8),
    /// Poll for a tag on the current antenna
    PollTag,
    /// End the session
    Quit,
}

impl Command {
    /// Decode exactly one command from one byte
    pub fn decode(byte: u8) -> Self {
        match byte {
            POLL_TAG => Command::PollTag,
            QUIT => Command::Quit,
            other => Command::SwitchAntenna(other),
        }
    }

    /// The wire byte for this command
    pub fn encode(self) -> u8 {
        match self {
            Command::SwitchAntenna(code) => code,
            Command::PollTag => POLL_TAG,
            Command::Quit => QUIT,
        }
    }

    /// The port this command selects, if it is a recognized antenna switch
    pub fn antenna(self) -> Option<AntennaPort> {
        match self {
            Command::SwitchAntenna(code) => AntennaPort::from_code(code),
            _ => None,
        }
    }
}

impl From<AntennaPort> for Command {
    fn from(port: AntennaPort) -> Self {
        Command::SwitchAntenna(port.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_poll_and_quit() {
        assert_eq!(Command::decode(b'T'), Command::PollTag);
        assert_eq!(Command::decode(b'q'), Command::Quit);
    }

    #[test]
    fn test_decode_antenna_codes() {
        assert_eq!(Command::decode(b'E'), Command::SwitchAntenna(b'E'));
        assert_eq!(Command::decode(b'E').antenna(), Some(AntennaPort::East));
        assert_eq!(Command::decode(b'P').antenna(), Some(AntennaPort::Id));
    }

    #[test]
    fn test_other_bytes_are_unmapped_switches() {
        // Uppercase Q and lowercase t are not commands
        for byte in [b'Q', b't', b'\n', b'Z'] {
            let cmd = Command::decode(byte);
            assert_eq!(cmd, Command::SwitchAntenna(byte));
            assert_eq!(cmd.antenna(), None);
        }
    }

    #[test]
    fn test_every_byte_decodes() {
        for byte in 0..=u8::MAX {
            assert_eq!(Command::decode(byte).encode(), byte);
        }
    }
}
