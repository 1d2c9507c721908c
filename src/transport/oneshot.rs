//! Connect-send-disconnect delivery to a single fixed receiver.
//!
//! A fresh connection is opened for every message and closed right after
//! the frame is written, so the receiver never holds an idle socket. A
//! failed send is not retried: the next cycle opens a new connection anyway.

use async_trait::async_trait;
use futures_util::SinkExt;
use std::io::ErrorKind;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::protocol::Message};
use tracing::{debug, info};

use crate::error::TransportError;
use crate::message::OutgoingMessage;

use super::Delivery;

#[derive(Clone, Debug)]
pub struct OneShotSender {
    url: String,
}

impl OneShotSender {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        let payload = message.to_json()?;
        info!("📤 [ONESHOT] Sending: {}", payload);

        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| self.connect_error(e))?;

        ws.send(Message::Text(payload)).await?;

        if let Err(e) = ws.close(None).await {
            debug!("[ONESHOT] Close handshake incomplete: {}", e);
        }
        info!("📤 [ONESHOT] Sent (disconnected)");
        Ok(())
    }

    /// Announce the caster to the receiver once at startup.
    pub async fn greet(&self, greeting: &str) -> Result<(), TransportError> {
        info!("👋 [ONESHOT] Startup greeting to {}", self.url);
        self.send(&OutgoingMessage::chat(greeting)).await
    }

    fn connect_error(&self, err: tungstenite::Error) -> TransportError {
        match &err {
            tungstenite::Error::Io(io) if io.kind() == ErrorKind::ConnectionRefused => {
                TransportError::ReceiverNotRunning { url: self.url.clone() }
            }
            _ => TransportError::WebSocket(err),
        }
    }
}

#[async_trait]
impl Delivery for OneShotSender {
    async fn deliver(&self, message: &OutgoingMessage) -> Result<usize, TransportError> {
        self.send(message).await.map(|_| 1)
    }
}
