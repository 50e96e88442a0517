//! # Transport
//!
//! This protocol has two shapes of wire interaction:
//!
//! - **Fire-and-forget**: open a connection, write one frame, close. Used
//!   for GOSSIP, GOSSIP_REPLY, ANNOUNCE, DELETE, and unsolicited FILE_DATA
//!   pushes. The sender doesn't wait for a reply.
//! - **Request/response**: open a connection, write one frame, keep it open
//!   and wait for exactly one frame back, then close. Used for GET_FILE.
//!
//! Every dial is bounded by [`config::CONNECT_TIMEOUT`]; every
//! request/response wait is bounded by [`config::FETCH_RESPONSE_TIMEOUT`].

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config;
use crate::error::TransportError;
use crate::identity::Endpoint;
use crate::network::codec::{self, read_message};
use crate::network::messages::Message;

/// Binds a listener for incoming P2P connections.
pub async fn bind(endpoint: &Endpoint) -> std::io::Result<TcpListener> {
    TcpListener::bind(endpoint.address()).await
}

async fn dial(endpoint: &Endpoint) -> Result<TcpStream, TransportError> {
    let addr = endpoint.address();
    match timeout(config::CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(TransportError::Connect { addr, source }),
        Err(_) => Err(TransportError::ConnectTimeout { addr }),
    }
}

/// Opens a connection to `endpoint`, writes `message`, and closes without
/// waiting for a reply.
pub async fn send(endpoint: &Endpoint, message: &Message) -> Result<(), TransportError> {
    let mut stream = dial(endpoint).await?;
    let frame = codec::encode(message);
    stream
        .write_all(&frame)
        .await
        .map_err(|source| TransportError::Send {
            addr: endpoint.address(),
            source,
        })?;
    let _ = stream.shutdown().await;
    Ok(())
}

/// Opens a connection to `endpoint`, writes `request`, and waits up to
/// [`config::FETCH_RESPONSE_TIMEOUT`] for a single reply frame on the same
/// connection.
pub async fn request(endpoint: &Endpoint, request: &Message) -> Result<Message, TransportError> {
    let mut stream = dial(endpoint).await?;
    let frame = codec::encode(request);
    stream
        .write_all(&frame)
        .await
        .map_err(|source| TransportError::Send {
            addr: endpoint.address(),
            source,
        })?;

    match timeout(config::FETCH_RESPONSE_TIMEOUT, read_message(&mut stream)).await {
        Ok(Ok(Some(msg))) => Ok(msg),
        Ok(Ok(None)) => Err(TransportError::ResponseTimeout),
        Ok(Err(e)) => Err(TransportError::Codec(e)),
        Err(_) => Err(TransportError::ResponseTimeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PeerId;
    use crate::network::messages::{Gossip, GetFile};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn send_delivers_one_frame_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = Endpoint::new("127.0.0.1", addr.port());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let msg = Message::Gossip(Gossip {
            host: "h".into(),
            port: 1,
            id: "i".into(),
            peer_id: PeerId::new("p"),
        });
        send(&endpoint, &msg).await.unwrap();

        let received = server.await.unwrap();
        assert!(!received.is_empty());
    }

    #[tokio::test]
    async fn request_returns_response_on_same_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = Endpoint::new("127.0.0.1", addr.port());

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _req = read_message(&mut stream).await.unwrap();
            let reply = Message::GetFile(GetFile { file_id: "unused".into() });
            stream.write_all(&codec::encode(&reply)).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let req = Message::GetFile(GetFile { file_id: "cid".into() });
        let reply = request(&endpoint, &req).await.unwrap();
        assert!(matches!(reply, Message::GetFile(_)));
    }

    #[tokio::test]
    async fn request_to_dead_peer_fails_fast_with_connect_error() {
        let endpoint = Endpoint::new("127.0.0.1", 1);
        let req = Message::GetFile(GetFile { file_id: "cid".into() });
        assert!(request(&endpoint, &req).await.is_err());
    }
}
