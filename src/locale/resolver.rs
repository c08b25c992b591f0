//! Placeholder substitution.
//!
//! Ordinal tokens (`%1%`, `%2%`, ...) are replaced positionally; named tokens
//! (`%group_amount%`, `%spy_color%`, ...) are replaced by plain string
//! substitution. Unmatched tokens are left in the output verbatim.

use std::sync::OnceLock;

use fancy_regex::Regex;

/// Ordinal and named values to substitute into a template.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSet {
    ordinals: Vec<String>,
    named: Vec<(String, String)>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from ordinal values only.
    pub fn ordinals<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ordinals: values.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }

    /// Add a named value. `token` includes the surrounding `%`.
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.push((token.into(), value.into()));
        self
    }

    /// Substitute ordinals first, then named values in insertion order.
    pub fn apply(&self, template: &str) -> String {
        let resolved = resolve(template, &self.ordinals);
        self.named
            .iter()
            .fold(resolved, |text, (token, value)| text.replace(token.as_str(), value))
    }
}

/// Replace `%i%` with the i-th value (1-indexed) for every value.
pub fn resolve<S: AsRef<str>>(template: &str, ordinals: &[S]) -> String {
    ordinals
        .iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, value)| {
            text.replace(&format!("%{}%", i + 1), value.as_ref())
        })
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%[A-Za-z0-9_]+%").expect("placeholder pattern is valid"))
}

/// Placeholder tokens still present in `text`, in order of appearance.
pub fn placeholder_tokens(text: &str) -> Vec<&str> {
    token_pattern()
        .find_iter(text)
        .flatten()
        .map(|m| m.as_str())
        .collect()
}
