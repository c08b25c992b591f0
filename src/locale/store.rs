//! Loaded locale templates keyed by message identifier.

use std::collections::BTreeMap;

use tracing::debug;

/// Language whose templates back every other language.
pub const DEFAULT_LANGUAGE: &str = "en-gb";

/// Read-only mapping from message identifier to raw template.
///
/// Missing and empty templates are both reported as `None`; callers treat that
/// as "do not send".
#[derive(Debug, Clone, Default)]
pub struct LocaleStore {
    locales: BTreeMap<String, String>,
}

impl LocaleStore {
    pub fn new(locales: BTreeMap<String, String>) -> Self {
        Self { locales }
    }

    /// Layer a selected language over a fallback language.
    ///
    /// Ids the selected language defines win, including ones it sets to an
    /// empty string to suppress a message.
    pub fn layered(selected: &BTreeMap<String, String>, fallback: &BTreeMap<String, String>) -> Self {
        let mut locales = fallback.clone();
        let mut overridden = 0usize;
        for (id, text) in selected {
            if locales.insert(id.clone(), text.clone()).is_some() {
                overridden += 1;
            }
        }
        debug!(
            "Layered {} locales over {} fallback entries ({} overridden)",
            selected.len(),
            fallback.len(),
            overridden
        );
        Self { locales }
    }

    /// Build the store for `language` from a set of languages, falling back to
    /// `DEFAULT_LANGUAGE` for ids the language does not define.
    pub fn for_language(languages: &BTreeMap<String, BTreeMap<String, String>>, language: &str) -> Self {
        let empty = BTreeMap::new();
        let fallback = languages.get(DEFAULT_LANGUAGE).unwrap_or(&empty);
        match languages.get(language) {
            Some(selected) if language != DEFAULT_LANGUAGE => Self::layered(selected, fallback),
            _ => Self::new(fallback.clone()),
        }
    }

    /// Template for `id`, or `None` when it is absent or empty.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.locales
            .get(id)
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    /// Identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl FromIterator<(String, String)> for LocaleStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
