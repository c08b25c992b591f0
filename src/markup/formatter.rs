//! Privilege-aware embedding of user text into markup.
//!
//! Every path that puts user-authored text into a markup string goes through
//! `TextFormatter::escape_if_unprivileged` (or `escape` for paths that never
//! trust the sender) before the string is deserialized.

use std::sync::Arc;

use crate::common::types::{OnlineUser, FORMATTED_CHAT_PERMISSION};
use crate::markup::codec::MarkupCodec;
use crate::markup::color::Color;
use crate::markup::component::{Component, RenderedMessage};
use crate::service::collaborators::PermissionOracle;

/// Wraps the markup codec with the formatted-chat policy.
#[derive(Clone)]
pub struct TextFormatter {
    codec: Arc<dyn MarkupCodec>,
    permissions: Arc<dyn PermissionOracle>,
}

impl TextFormatter {
    pub fn new(codec: Arc<dyn MarkupCodec>, permissions: Arc<dyn PermissionOracle>) -> Self {
        Self { codec, permissions }
    }

    /// Whether the sender may use markup in chat text.
    pub fn may_format(&self, sender: &OnlineUser) -> bool {
        self.permissions
            .has(sender, FORMATTED_CHAT_PERMISSION, false)
    }

    /// Embed `text` verbatim for senders with formatted chat, escaped otherwise.
    pub fn escape_if_unprivileged(&self, text: &str, sender: &OnlineUser) -> String {
        if self.may_format(sender) {
            text.to_string()
        } else {
            self.codec.escape(text)
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.codec.escape(text)
    }

    /// Deserialize a fully assembled markup string.
    pub fn deserialize(&self, markup: &str) -> RenderedMessage {
        self.codec.deserialize(markup)
    }
}

/// Last non-null color in a pre-order walk of `component`.
///
/// A child's color replaces the one found so far, so the deepest, rightmost
/// colored node wins.
pub fn last_color(component: &Component) -> Option<Color> {
    component
        .children()
        .iter()
        .filter_map(last_color)
        .last()
        .or(component.color())
}
