//! Tag polling

use crate::config::ServerConfig;
use crate::context::ReaderContext;
use rfid_core::{ReaderDevice, ReaderRequest, ResponseCode, TagReadResult, format_tid};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Polls the current antenna for a tag
#[derive(Debug, Clone)]
pub struct TagPoller {
    request: ReaderRequest,
    retry_interval: Duration,
    max_attempts: Option<u32>,
}

impl TagPoller {
    pub fn new(retry_interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            request: ReaderRequest::select_tag(),
            retry_interval,
            max_attempts,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.retry_interval, config.max_poll_attempts)
    }

    /// Issue one tag select and follow its responses
    ///
    /// Keeps fetching while the reader answers successfully. The first
    /// `SelectTagPass` yields `Found`; an absent or unsuccessful response means
    /// no tag is in the field. Device faults are reported as `NoCard`.
    pub async fn poll<D: ReaderDevice>(&self, ctx: &mut ReaderContext<D>) -> TagReadResult {
        if let Err(e) = ctx.device_mut().issue(&self.request).await {
            warn!("Failed to issue tag select: {}", e);
            return TagReadResult::NoCard;
        }

        let mut fetches = 0u32;
        loop {
            let response = match ctx.device_mut().response().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Failed to fetch tag select response: {}", e);
                    None
                }
            };

            match response {
                Some(resp) if resp.success => {
                    if resp.code == ResponseCode::SelectTagPass {
                        let antenna_label = ctx.label().to_string();
                        info!("Tag {} on antenna {}", format_tid(&resp.tid), antenna_label);
                        return TagReadResult::Found {
                            tag_id: resp.tid,
                            antenna_label,
                        };
                    }
                }
                _ => break,
            }

            fetches += 1;
            if self.max_attempts.is_some_and(|max| fetches >= max) {
                debug!("Tag poll gave up after {} fetches", fetches);
                break;
            }
            sleep(self.retry_interval).await;
        }

        debug!("No card on antenna {}", ctx.label());
        TagReadResult::NoCard
    }
}

impl Default for TagPoller {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antenna::AntennaController;
    use rfid_core::AntennaPort;
    use rfid_sim::{SimConfig, SimulatedReader};

    async fn context_on(
        config: SimConfig,
        port: AntennaPort,
    ) -> ReaderContext<SimulatedReader> {
        let mut reader = SimulatedReader::with_config(config);
        reader.open().await.unwrap();
        let mut ctx = ReaderContext::new(reader);
        AntennaController::new(3, Duration::from_millis(1))
            .select(&mut ctx, port)
            .await
            .unwrap();
        ctx
    }

    fn poller() -> TagPoller {
        TagPoller::new(Duration::from_millis(1), None)
    }

    #[tokio::test]
    async fn test_no_tag_is_no_card() {
        let mut ctx = context_on(SimConfig::default(), AntennaPort::North).await;
        assert_eq!(poller().poll(&mut ctx).await, TagReadResult::NoCard);
    }

    #[tokio::test]
    async fn test_found_after_inventory_responses() {
        let mut ctx = context_on(
            SimConfig {
                select_delay: 4,
                ..Default::default()
            },
            AntennaPort::East,
        )
        .await;
        ctx.device()
            .handle()
            .place_tag(AntennaPort::East, vec![0xAA, 0x11, 0xBB, 0x22]);

        let result = poller().poll(&mut ctx).await;

        assert_eq!(
            result,
            TagReadResult::Found {
                tag_id: vec![0xAA, 0x11, 0xBB, 0x22],
                antenna_label: "82".into(),
            }
        );
        assert_eq!(result.report(), "AA11BB22.82");
    }

    #[tokio::test]
    async fn test_id_antenna_label() {
        let mut ctx = context_on(SimConfig::default(), AntennaPort::Id).await;
        ctx.device().handle().place_tag(AntennaPort::Id, vec![0x04, 0xFE]);

        let result = poller().poll(&mut ctx).await;
        assert_eq!(result.report(), "04FE.8C");
    }

    #[tokio::test]
    async fn test_tag_on_other_antenna_is_no_card() {
        let mut ctx = context_on(SimConfig::default(), AntennaPort::South).await;
        ctx.device().handle().place_tag(AntennaPort::West, vec![0x01]);

        assert_eq!(poller().poll(&mut ctx).await, TagReadResult::NoCard);
    }

    #[tokio::test]
    async fn test_attempt_cap() {
        let mut ctx = context_on(
            SimConfig {
                select_delay: 10,
                ..Default::default()
            },
            AntennaPort::North,
        )
        .await;
        ctx.device().handle().place_tag(AntennaPort::North, vec![0x01]);

        let capped = TagPoller::new(Duration::from_millis(1), Some(3));
        assert_eq!(capped.poll(&mut ctx).await, TagReadResult::NoCard);
    }

    #[tokio::test]
    async fn test_device_fault_is_no_card() {
        // Never opened, so every request fails
        let mut ctx = ReaderContext::new(SimulatedReader::new());
        assert_eq!(poller().poll(&mut ctx).await, TagReadResult::NoCard);
    }
}
