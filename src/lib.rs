//! chatcast - locale-driven message templating and scoped broadcast for
//! multi-server chat networks.
//!
//! Templates come from per-language locale tables, get their placeholders
//! resolved against the sender, recipients and group, are deserialized into
//! rich text once and delivered to the users a broadcast scope reaches.

pub mod broadcast;
pub mod common;
pub mod config;
pub mod locale;
pub mod markup;
pub mod service;

pub use broadcast::{BroadcastRouter, BroadcastScope, DeliveryReport};
pub use common::{Channel, ConfigError, OnlineUser, ServerId, ServiceError, SpyColor};
pub use config::Config;
pub use locale::LocaleStore;
pub use markup::{Component, RenderedMessage, TextFormatter};
pub use service::{Collaborators, MessageService};
