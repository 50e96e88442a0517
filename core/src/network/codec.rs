//! # Framing
//!
//! No length prefix on the wire: a frame is "the first complete JSON value
//! readable from the stream". We grow a buffer as bytes arrive and probe it
//! with `serde_json::Deserializer::from_slice` after every read; trailing
//! bytes past the first value are simply discarded, since every connection
//! in this protocol carries at most one request and one response.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CodecError;
use crate::network::messages::Message;

/// Reads one [`Message`] from `stream`, or `Ok(None)` if the peer closed the
/// connection before sending anything (an orderly "nothing to say").
///
/// A close *after* some bytes arrived but before a full JSON value could be
/// parsed is a framing error, not `None` — the peer started a message and
/// never finished it.
pub async fn read_message<R: AsyncRead + Unpin>(
    stream: &mut R,
) -> Result<Option<Message>, CodecError> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        if let Some(msg) = try_parse(&buf)? {
            return Ok(Some(msg));
        }

        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|_| CodecError::Framing { byte_count: buf.len() })?;

        if n == 0 {
            return if buf.is_empty() {
                Ok(None)
            } else {
                Err(CodecError::Framing { byte_count: buf.len() })
            };
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Attempts to parse the first complete JSON value out of `buf`. Returns
/// `Ok(None)` if `buf` holds a valid-so-far-but-incomplete prefix; `Err` if
/// the bytes already present can never form valid JSON (malformed, not
/// merely truncated).
fn try_parse(buf: &[u8]) -> Result<Option<Message>, CodecError> {
    if buf.is_empty() {
        return Ok(None);
    }
    let mut de = serde_json::Deserializer::from_slice(buf).into_iter::<Message>();
    match de.next() {
        Some(Ok(msg)) => Ok(Some(msg)),
        Some(Err(e)) if e.is_eof() => Ok(None),
        Some(Err(e)) => Err(CodecError::Malformed(e)),
        None => Ok(None),
    }
}

/// Serializes `message` to a single JSON frame, newline-terminated so a
/// byte-stream log of traffic stays human-readable.
pub fn encode(message: &Message) -> Vec<u8> {
    let mut bytes = serde_json::to_vec(message).expect("Message always serializes");
    bytes.push(b'\n');
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PeerId;
    use crate::network::messages::Gossip;

    fn sample() -> Message {
        Message::Gossip(Gossip {
            host: "localhost".into(),
            port: 8270,
            id: "abc".into(),
            peer_id: PeerId::new("p1"),
        })
    }

    #[tokio::test]
    async fn reads_a_full_frame() {
        let frame = encode(&sample());
        let mut cursor = std::io::Cursor::new(frame);
        let msg = read_message(&mut cursor).await.unwrap().unwrap();
        assert!(matches!(msg, Message::Gossip(_)));
    }

    #[tokio::test]
    async fn empty_close_returns_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_message(&mut cursor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_close_is_a_framing_error() {
        let mut frame = encode(&sample());
        frame.truncate(frame.len() - 5);
        let mut cursor = std::io::Cursor::new(frame);
        assert!(read_message(&mut cursor).await.is_err());
    }

    #[tokio::test]
    async fn trailing_bytes_after_first_value_are_ignored() {
        let mut frame = encode(&sample());
        frame.extend_from_slice(b"garbage that is not json");
        let mut cursor = std::io::Cursor::new(frame);
        let msg = read_message(&mut cursor).await.unwrap().unwrap();
        assert!(matches!(msg, Message::Gossip(_)));
    }
}
