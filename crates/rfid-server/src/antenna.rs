//! Antenna switching

use crate::config::ServerConfig;
use crate::context::ReaderContext;
use rfid_core::reader::PARAM_ANTENNA_SELECT;
use rfid_core::{
    AntennaPort, AntennaSelection, ReaderDevice, ReaderRequest, ResponseCode, Result, RfidError,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Selects the physical antenna by writing the multiplexer parameter
#[derive(Debug, Clone)]
pub struct AntennaController {
    ack_attempts: u32,
    retry_interval: Duration,
}

impl AntennaController {
    pub fn new(ack_attempts: u32, retry_interval: Duration) -> Self {
        Self {
            ack_attempts: ack_attempts.max(1),
            retry_interval,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.ack_attempts, config.retry_interval)
    }

    /// Switch to the antenna named by `code`
    ///
    /// Returns the selected port, or `None` when the code is not an antenna
    /// code, in which case nothing is written and the selection is unchanged.
    pub async fn switch<D: ReaderDevice>(
        &self,
        ctx: &mut ReaderContext<D>,
        code: u8,
    ) -> Result<Option<AntennaPort>> {
        let Some(port) = AntennaPort::from_code(code) else {
            debug!("Ignoring unmapped antenna code 0x{:02X}", code);
            return Ok(None);
        };

        self.select(ctx, port).await?;
        Ok(Some(port))
    }

    /// Write the port's parameter byte and record the new selection
    pub async fn select<D: ReaderDevice>(
        &self,
        ctx: &mut ReaderContext<D>,
        port: AntennaPort,
    ) -> Result<()> {
        self.write_parameter(ctx.device_mut(), PARAM_ANTENNA_SELECT, port.parameter())
            .await?;
        ctx.select(AntennaSelection::new(port));
        info!(
            "Antenna switched to {} (parameter 0x{:02X})",
            port,
            port.parameter()
        );
        Ok(())
    }

    /// Write one system parameter byte and wait for the reader to acknowledge it
    ///
    /// Fetches responses every `retry_interval` until a
    /// `WriteSystemParameterPass` arrives, giving up with `DeviceTimeout` after
    /// `ack_attempts` fetches.
    pub async fn write_parameter<D: ReaderDevice>(
        &self,
        device: &mut D,
        address: u16,
        value: u8,
    ) -> Result<()> {
        device
            .issue(&ReaderRequest::write_parameter(address, value))
            .await?;

        for attempt in 1..=self.ack_attempts {
            match device.response().await? {
                Some(resp) if resp.code == ResponseCode::WriteSystemParameterPass => {
                    debug!(
                        "Parameter {} = 0x{:02X} acknowledged after {} fetches",
                        address, value, attempt
                    );
                    return Ok(());
                }
                Some(resp) => {
                    debug!("Waiting for write acknowledgement, got {:?}", resp.code);
                }
                None => {}
            }

            if attempt < self.ack_attempts {
                sleep(self.retry_interval).await;
            }
        }

        warn!(
            "Reader {} never acknowledged parameter {} = 0x{:02X}",
            device.name(),
            address,
            value
        );
        Err(RfidError::DeviceTimeout {
            attempts: self.ack_attempts,
        })
    }
}

impl Default for AntennaController {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfid_sim::{SimConfig, SimulatedReader};

    async fn context(config: SimConfig) -> ReaderContext<SimulatedReader> {
        let mut reader = SimulatedReader::with_config(config);
        reader.open().await.unwrap();
        ReaderContext::new(reader)
    }

    fn controller() -> AntennaController {
        AntennaController::new(5, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_switch_writes_table_byte() {
        let expected = [
            (b'N', 0x81, "81"),
            (b'E', 0x82, "82"),
            (b'S', 0x83, "83"),
            (b'W', 0x84, "84"),
            (b'P', 0x8C, "8C"),
        ];

        for (code, parameter, label) in expected {
            let mut ctx = context(SimConfig::default()).await;
            let handle = ctx.device().handle();

            let port = controller().switch(&mut ctx, code).await.unwrap();

            assert_eq!(port.map(|p| p.code()), Some(code));
            assert_eq!(handle.antenna_writes(), vec![parameter]);
            assert_eq!(
                handle.requests(),
                vec![ReaderRequest::WriteSystemParameter {
                    address: 9,
                    blocks: 1,
                    data: vec![parameter],
                }]
            );
            assert_eq!(ctx.label(), label);
        }
    }

    #[tokio::test]
    async fn test_unmapped_code_is_noop() {
        let mut ctx = context(SimConfig::default()).await;
        let handle = ctx.device().handle();
        controller().switch(&mut ctx, b'S').await.unwrap();
        handle.clear_requests();

        let port = controller().switch(&mut ctx, b'X').await.unwrap();

        assert_eq!(port, None);
        assert!(handle.requests().is_empty());
        assert_eq!(ctx.port(), Some(AntennaPort::South));
        assert_eq!(ctx.label(), "83");
    }

    #[tokio::test]
    async fn test_waits_for_delayed_ack() {
        let mut ctx = context(SimConfig {
            ack_delay: 3,
            ..Default::default()
        })
        .await;

        controller().switch(&mut ctx, b'W').await.unwrap();
        assert_eq!(ctx.port(), Some(AntennaPort::West));
    }

    #[tokio::test]
    async fn test_unacknowledged_write_times_out() {
        let mut ctx = context(SimConfig {
            never_ack: true,
            ..Default::default()
        })
        .await;

        let result = controller().switch(&mut ctx, b'E').await;

        assert!(matches!(result, Err(RfidError::DeviceTimeout { attempts: 5 })));
        assert_eq!(ctx.selection(), None);
    }

    #[tokio::test]
    async fn test_rejected_write_is_not_an_ack() {
        let mut ctx = context(SimConfig {
            reject_writes: true,
            ..Default::default()
        })
        .await;
        let handle = ctx.device().handle();

        let result = controller().switch(&mut ctx, b'S').await;

        assert!(matches!(result, Err(RfidError::DeviceTimeout { attempts: 5 })));
        assert_eq!(ctx.selection(), None);
        assert_eq!(handle.antenna(), None);
    }

    #[tokio::test]
    async fn test_ack_later_than_budget_times_out() {
        let mut ctx = context(SimConfig {
            ack_delay: 5,
            ..Default::default()
        })
        .await;

        let result = controller().switch(&mut ctx, b'N').await;
        assert!(matches!(result, Err(RfidError::DeviceTimeout { .. })));
    }
}
