//! Reply encoding

use rfid_core::{Framing, Result, RfidError, TagReadResult};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Renders poll results and writes them to the client
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder {
    framing: Framing,
}

impl ResponseEncoder {
    pub fn new(framing: Framing) -> Self {
        Self { framing }
    }

    /// ASCII reply payload: `<TIDHEX>.<label>` or `NOCARD`
    pub fn encode(result: &TagReadResult) -> Vec<u8> {
        result.report().into_bytes()
    }

    /// Reply payload wrapped in the configured framing
    pub fn frame(&self, result: &TagReadResult) -> Result<Vec<u8>> {
        self.framing.frame(&Self::encode(result))
    }

    /// Write one reply and flush it
    pub async fn send<W>(&self, writer: &mut W, result: &TagReadResult) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let bytes = self.frame(result)?;
        writer
            .write_all(&bytes)
            .await
            .map_err(|e| RfidError::Transport(format!("Reply write failed: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| RfidError::Transport(format!("Reply flush failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_encode_found() {
        let result = TagReadResult::Found {
            tag_id: vec![0xAB, 0xCD],
            antenna_label: "81".into(),
        };
        assert_eq!(ResponseEncoder::encode(&result), b"ABCD.81".to_vec());
    }

    #[test]
    fn test_encode_no_card() {
        assert_eq!(
            ResponseEncoder::encode(&TagReadResult::NoCard),
            b"NOCARD".to_vec()
        );
    }

    #[test]
    fn test_frame_newline() {
        let encoder = ResponseEncoder::new(Framing::Newline);
        assert_eq!(
            encoder.frame(&TagReadResult::NoCard).unwrap(),
            b"NOCARD\n".to_vec()
        );
    }

    #[tokio::test]
    async fn test_send_writes_exact_bytes() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let encoder = ResponseEncoder::default();

        let result = TagReadResult::Found {
            tag_id: vec![0xAA, 0x11, 0xBB, 0x22],
            antenna_label: "8C".into(),
        };
        encoder.send(&mut server, &result).await.unwrap();
        drop(server);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"AA11BB22.8C".to_vec());
    }

    #[tokio::test]
    async fn test_send_to_closed_peer_fails() {
        let (client, mut server) = tokio::io::duplex(8);
        drop(client);

        let result = ResponseEncoder::default()
            .send(&mut server, &TagReadResult::NoCard)
            .await;
        assert!(matches!(result, Err(RfidError::Transport(_))));
    }
}
