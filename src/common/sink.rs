//! Delivery sinks for rendered messages.
//!
//! Every `OnlineUser` owns a sink. The transport decides what a sink does;
//! the engine only hands it finished messages.

use tokio::sync::mpsc;

use crate::common::error::DeliveryError;
use crate::markup::RenderedMessage;

/// Something that can receive a rendered message.
pub trait MessageSink: Send + Sync {
    fn send(&self, message: RenderedMessage) -> Result<(), DeliveryError>;
}

/// Sink backed by an unbounded mpsc channel.
///
/// The receiving half usually belongs to the connection task of the user.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    recipient: String,
    tx: mpsc::UnboundedSender<RenderedMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new(recipient: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<RenderedMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                recipient: recipient.into(),
                tx,
            },
            rx,
        )
    }
}

impl MessageSink for ChannelSink {
    fn send(&self, message: RenderedMessage) -> Result<(), DeliveryError> {
        self.tx.send(message).map_err(|_| DeliveryError::Disconnected {
            recipient: self.recipient.clone(),
        })
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn send(&self, _message: RenderedMessage) -> Result<(), DeliveryError> {
        Ok(())
    }
}
