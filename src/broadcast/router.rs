//! Scope-based fan-out of rendered messages.
//!
//! The router is context free: the scope and the originating server are passed
//! in on every call.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::types::{OnlineUser, ServerId};
use crate::markup::RenderedMessage;

/// Who receives a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BroadcastScope {
    /// Everyone on the network.
    #[default]
    Global,
    /// Only users on the originating server.
    Local,
    /// Filtered like `Local`. The transport forwards the formatted message
    /// instead of having the backend re-format it.
    LocalPassthrough,
}

impl TryFrom<String> for BroadcastScope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| {
            format!(
                "unknown broadcast scope '{}' (use: global, local, local_passthrough)",
                value
            )
        })
    }
}

impl BroadcastScope {
    /// Parse a scope from a config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "global" => Some(BroadcastScope::Global),
            "local" => Some(BroadcastScope::Local),
            "local_passthrough" | "passthrough" => Some(BroadcastScope::LocalPassthrough),
            _ => None,
        }
    }

    /// Whether delivery stays on the originating server.
    pub fn is_local(&self) -> bool {
        matches!(self, BroadcastScope::Local | BroadcastScope::LocalPassthrough)
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, BroadcastScope::LocalPassthrough)
    }

    /// Whether `user` is in scope of a broadcast from `origin`.
    pub fn reaches(&self, user: &OnlineUser, origin: &ServerId) -> bool {
        !self.is_local() || user.server() == origin
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Recipients whose sink accepted the message.
    pub delivered: usize,
    /// Users outside the scope.
    pub skipped: usize,
    /// Recipients whose sink rejected the message.
    pub failed: usize,
}

/// Delivers rendered messages to the users a scope selects.
#[derive(Debug, Clone, Copy, Default)]
pub struct BroadcastRouter;

impl BroadcastRouter {
    pub fn new() -> Self {
        Self
    }

    /// Deliver `message` to every user in `online_users` that `scope` reaches
    /// from `origin`. A failing recipient is logged and does not stop the rest.
    pub fn deliver(
        &self,
        message: &RenderedMessage,
        scope: BroadcastScope,
        origin: &ServerId,
        online_users: &[OnlineUser],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for user in online_users {
            if !scope.reaches(user, origin) {
                report.skipped += 1;
                continue;
            }
            if send_to(user, message) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        debug!(
            "Broadcast ({:?} from {}): {} delivered, {} skipped, {} failed",
            scope, origin, report.delivered, report.skipped, report.failed
        );
        report
    }

    /// Deliver `message` to each of `recipients` regardless of server.
    pub fn deliver_to(&self, message: &RenderedMessage, recipients: &[OnlineUser]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for user in recipients {
            if send_to(user, message) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

/// Send to one user, logging a rejection. Returns whether it was accepted.
pub(crate) fn send_to(user: &OnlineUser, message: &RenderedMessage) -> bool {
    match user.sink().send(message.clone()) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to deliver message to {}: {}", user.name(), e);
            false
        }
    }
}
