//! Session channel over WebSocket.
//!
//! Outgoing envelopes go through an mpsc queue drained by a writer task;
//! incoming envelopes are parsed by a reader task and delivered as
//! [`ChannelEvent`]s, so the session never touches the socket directly.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use gambit_shared::protocol::ChannelMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::error::ChannelError;

/// What the reader task delivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Message(ChannelMessage),
    /// The server closed the connection or it failed
    Closed,
}

/// Publishing side of the session channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    async fn publish(&self, message: &ChannelMessage) -> Result<(), ChannelError>;
}

/// WebSocket URL of a session's channel
///
/// `http://host:port` becomes `ws://host:port/ws/{session_id}` (`https` becomes `wss`).
pub fn channel_url(server: &str, session_id: &str) -> String {
    let server = server.trim_end_matches('/');
    let ws_base = match server.strip_prefix("http") {
        Some(rest) => format!("ws{}", rest),
        None => server.to_string(),
    };
    format!("{}/ws/{}", ws_base, session_id)
}

/// Publisher backed by the writer task
pub struct WebSocketPublisher {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl WebSocketPublisher {
    /// Ask the writer task to close the connection
    pub fn close(&self) {
        self.outgoing.send(Message::Close(None)).ok();
    }
}

#[async_trait]
impl ChannelPublisher for WebSocketPublisher {
    async fn publish(&self, message: &ChannelMessage) -> Result<(), ChannelError> {
        let json = serde_json::to_string(message)
            .map_err(|e| ChannelError::Connection(e.to_string()))?;
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| ChannelError::Closed)
    }
}

/// Open the channel of `session_id`
///
/// # Errors
///
/// `SessionFull` (HTTP 409) and `SessionNotFound` (HTTP 404) when the server
/// refuses the seat, `Connection` for anything else.
pub async fn connect_channel(
    server: &str,
    session_id: &str,
) -> Result<(WebSocketPublisher, mpsc::UnboundedReceiver<ChannelEvent>), ChannelError> {
    let url = channel_url(server, session_id);
    let (ws_stream, _response) = connect_async(&url).await.map_err(|e| match e {
        WsError::Http(response) => match response.status().as_u16() {
            409 => ChannelError::SessionFull(session_id.to_string()),
            404 => ChannelError::SessionNotFound(session_id.to_string()),
            status => ChannelError::Connection(format!("HTTP {}", status)),
        },
        other => ChannelError::Connection(other.to_string()),
    })?;
    tracing::info!("Connected to {}", url);

    let (mut write, mut read) = ws_stream.split();
    let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Writer: drain the outgoing queue into the socket
    tokio::spawn(async move {
        while let Some(message) = outgoing_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = write.send(message).await {
                tracing::warn!("Failed to send message: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Reader: parse envelopes and hand them to the session loop
    tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ChannelMessage>(text.as_str()) {
                        Ok(envelope) => {
                            if event_tx.send(ChannelEvent::Message(envelope)).is_err() {
                                return;
                            }
                        }
                        Err(e) => tracing::warn!("Ignoring malformed channel message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        event_tx.send(ChannelEvent::Closed).ok();
    });

    Ok((
        WebSocketPublisher {
            outgoing: outgoing_tx,
        },
        event_rx,
    ))
}
