//! Broadcast scopes and delivery.

pub mod router;

pub use router::{BroadcastRouter, BroadcastScope, DeliveryReport};
