//! The message pipeline.
//!
//! A message is in one of two states:
//! - `PendingMessage`: a template waiting for the external placeholder
//!   expander (the only await point),
//! - `ExpandedMessage`: context placeholders resolved; group aggregation,
//!   named substitutions, text appending and rendering are synchronous.
//!
//! User text is appended after every substitution so it is never scanned
//! for placeholders, and the markup is deserialized once at the end.

use tracing::{debug, error};

use crate::common::error::ExpansionError;
use crate::common::types::OnlineUser;
use crate::locale::{aggregate, placeholder_tokens, PlaceholderSet};
use crate::markup::{RenderedMessage, TextFormatter};
use crate::service::collaborators::PlaceholderExpander;

/// A template awaiting context expansion for `context`.
#[derive(Debug)]
pub struct PendingMessage<'a> {
    context: &'a OnlineUser,
    template: String,
}

impl<'a> PendingMessage<'a> {
    pub fn new(context: &'a OnlineUser, template: impl Into<String>) -> Self {
        Self {
            context,
            template: template.into(),
        }
    }

    /// Run the external expander.
    pub async fn expand(self, expander: &dyn PlaceholderExpander) -> Result<ExpandedMessage, ExpansionError> {
        let markup = expander
            .expand(self.context, &self.template)
            .await
            .map_err(|e| {
                error!("Failed to expand placeholders for {}: {}", self.context.name(), e);
                e
            })?;
        Ok(ExpandedMessage {
            markup,
            text_start: None,
        })
    }
}

/// Markup with context placeholders resolved.
#[derive(Debug, Clone)]
pub struct ExpandedMessage {
    markup: String,
    /// Byte offset where appended user text begins.
    text_start: Option<usize>,
}

impl ExpandedMessage {
    /// Substitute named values. Must run before any user text is appended.
    pub fn substitute(mut self, placeholders: &PlaceholderSet) -> Self {
        debug_assert!(self.text_start.is_none(), "substitution after user text");
        self.markup = placeholders.apply(&self.markup);
        self
    }

    /// Rewrite a token prefix, e.g. `%receiver_` to `%`, ahead of another
    /// expansion pass.
    pub fn rewrite_prefix(mut self, prefix: &str) -> Self {
        debug_assert!(self.text_start.is_none(), "substitution after user text");
        self.markup = self.markup.replace(prefix, "%");
        self
    }

    /// Fill the group placeholders from `recipients`. The first recipient is
    /// the primary addressee. Nothing happens for a single recipient.
    pub fn apply_group(self, recipients: &[OnlineUser], delimiter: &str, formatter: &TextFormatter) -> Self {
        if recipients.len() <= 1 {
            return self;
        }
        let placeholders = aggregate(recipients, true, delimiter)
            .placeholders(|list| formatter.escape(list))
            .into_iter()
            .fold(PlaceholderSet::new(), |set, (token, value)| set.with(token, value));
        self.substitute(&placeholders)
    }

    /// Append text that has already been escaped as required.
    pub fn append_text(mut self, text: &str) -> Self {
        self.text_start.get_or_insert(self.markup.len());
        self.markup.push_str(text);
        self
    }

    /// Start another expansion pass against a different context user.
    pub fn into_pending(self, context: &OnlineUser) -> PendingMessage<'_> {
        PendingMessage::new(context, self.markup)
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Deserialize the assembled markup.
    pub fn render(self, formatter: &TextFormatter) -> RenderedMessage {
        self.log_unresolved();
        formatter.deserialize(&self.markup)
    }

    fn log_unresolved(&self) {
        let template = &self.markup[..self.text_start.unwrap_or(self.markup.len())];
        let unresolved = placeholder_tokens(template);
        if !unresolved.is_empty() {
            debug!("Leaving unresolved placeholders verbatim: {}", unresolved.join(", "));
        }
    }
}
