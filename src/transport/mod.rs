pub mod broadcast;
pub mod oneshot;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::message::OutgoingMessage;

pub use broadcast::{ClientRegistry, ClientSink};
pub use oneshot::OneShotSender;

/// Where a cycle's message goes.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Suspend until delivering makes sense. Called once, before the first cycle.
    async fn wait_until_ready(&self) {}

    /// Deliver one message, returning how many receivers got it.
    async fn deliver(&self, message: &OutgoingMessage) -> Result<usize, TransportError>;
}
