//! Command-line arguments

use clap::Parser;
use rfid_core::{AntennaPort, Framing};
use rfid_server::ServerConfig;
use rfid_sim::parse_tag_spec;

/// Serve an RFID reader's antennas to one controller over TCP
///
/// Flags override the matching `RFID_*` environment variables, which override
/// the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "rfid-server", version, long_about = None)]
pub struct CliArgs {
    /// Listen address [default: 0.0.0.0:6666]
    #[arg(long, env = "RFID_BIND", value_name = "ADDR")]
    pub bind: Option<String>,

    /// Reply framing: raw, newline or length-prefixed [default: raw]
    #[arg(long, env = "RFID_FRAMING")]
    pub framing: Option<Framing>,

    /// Response fetches before a parameter write times out [default: 100]
    #[arg(long, env = "RFID_ACK_ATTEMPTS", value_parser = clap::value_parser!(u32).range(1..))]
    pub ack_attempts: Option<u32>,

    /// Cap on response fetches during one tag poll [default: unbounded]
    #[arg(long, env = "RFID_POLL_ATTEMPTS", value_parser = clap::value_parser!(u32).range(1..))]
    pub poll_attempts: Option<u32>,

    /// Serve a simulated reader instead of looking for hardware
    #[arg(long)]
    pub simulate: bool,

    /// Place a tag on the simulated reader, e.g. `E:AA11BB22` (implies --simulate)
    #[arg(long = "sim-tag", value_name = "CODE:HEX", value_parser = parse_tag_spec)]
    pub sim_tags: Vec<(AntennaPort, Vec<u8>)>,
}

impl CliArgs {
    /// Server configuration with every given option applied over the defaults
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(framing) = self.framing {
            config.framing = framing;
        }
        if let Some(attempts) = self.ack_attempts {
            config.ack_attempts = attempts;
        }
        if self.poll_attempts.is_some() {
            config.max_poll_attempts = self.poll_attempts;
        }
        config
    }

    /// Any `--sim-tag` implies `--simulate`
    pub fn simulate(&self) -> bool {
        self.simulate || !self.sim_tags.is_empty()
    }
}
