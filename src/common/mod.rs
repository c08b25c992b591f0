//! Common types shared across the engine.

pub mod error;
pub mod sink;
pub mod types;

pub use error::{ConfigError, DeliveryError, ExpansionError, ServiceError};
pub use sink::{ChannelSink, MessageSink, NullSink};
pub use types::{
    Channel, OnlineUser, ServerId, SpyColor, FORMATTED_CHAT_PERMISSION, SILENT_JOIN_PERMISSION,
    SILENT_QUIT_PERMISSION,
};
