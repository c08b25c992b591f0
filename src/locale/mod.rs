//! Locale templates and the placeholder protocol.

pub mod aggregate;
pub mod resolver;
pub mod store;

pub use aggregate::{aggregate, subscript_number, GroupSummary};
pub use resolver::{placeholder_tokens, resolve, PlaceholderSet};
pub use store::{LocaleStore, DEFAULT_LANGUAGE};
