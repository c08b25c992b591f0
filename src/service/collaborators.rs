//! Interfaces the engine consumes from the surrounding server.
//!
//! Each trait has a small in-memory implementation so the engine can run
//! standalone and be tested without a proxy behind it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::common::error::ExpansionError;
use crate::common::types::OnlineUser;

/// Source of the currently connected users.
pub trait PresenceDirectory: Send + Sync {
    /// Snapshot of the connected set. May differ between calls.
    fn online_users(&self) -> Vec<OnlineUser>;
}

/// Expands placeholders the engine does not know about (ranks, prefixes,
/// custom variables).
///
/// Implementations must leave ordinal and group tokens such as `%1%` or
/// `%group_amount%` untouched.
#[async_trait]
pub trait PlaceholderExpander: Send + Sync {
    async fn expand(&self, user: &OnlineUser, template: &str) -> Result<String, ExpansionError>;
}

/// Capability checks.
pub trait PermissionOracle: Send + Sync {
    fn has(&self, user: &OnlineUser, capability: &str, allow_console_override: bool) -> bool;
}

/// Per-player text overrides (custom join and quit messages).
pub trait PerPlayerOverride: Send + Sync {
    fn lookup(&self, user: &OnlineUser, key: &str) -> Option<String>;
}

/// Presence directory over a fixed list of users.
#[derive(Debug, Clone, Default)]
pub struct StaticPresence {
    users: Vec<OnlineUser>,
}

impl StaticPresence {
    pub fn new(users: Vec<OnlineUser>) -> Self {
        Self { users }
    }
}

impl PresenceDirectory for StaticPresence {
    fn online_users(&self) -> Vec<OnlineUser> {
        self.users.clone()
    }
}

/// Reads the permission set carried by each `OnlineUser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedPermissions;

impl PermissionOracle for GrantedPermissions {
    fn has(&self, user: &OnlineUser, capability: &str, allow_console_override: bool) -> bool {
        (allow_console_override && user.is_console()) || user.permissions().contains(capability)
    }
}

/// Expander that returns templates unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExpander;

#[async_trait]
impl PlaceholderExpander for NoopExpander {
    async fn expand(&self, _user: &OnlineUser, template: &str) -> Result<String, ExpansionError> {
        Ok(template.to_string())
    }
}

/// Expander for the context placeholders every deployment has:
/// `%name%`, `%username%` and `%server%`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextExpander;

#[async_trait]
impl PlaceholderExpander for ContextExpander {
    async fn expand(&self, user: &OnlineUser, template: &str) -> Result<String, ExpansionError> {
        Ok(template
            .replace("%name%", user.name())
            .replace("%username%", user.name())
            .replace("%server%", user.server().as_str()))
    }
}

/// Override table keyed by user name and override key.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<(String, String), String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, user: impl Into<String>, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert((user.into(), key.into()), text.into());
        self
    }
}

impl PerPlayerOverride for OverrideTable {
    fn lookup(&self, user: &OnlineUser, key: &str) -> Option<String> {
        self.entries
            .get(&(user.name().to_string(), key.to_string()))
            .cloned()
    }
}
