//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use std::collections::HashSet;
use std::sync::OnceLock;

use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use crate::locale::DEFAULT_LANGUAGE;

fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]{2,3}-[a-z]{2,3}$").expect("language pattern is valid"))
}

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Language
    if !language_pattern().is_match(&config.language).unwrap_or(false) {
        errors.push(format!(
            "language '{}' is not a language code like 'en-gb'",
            config.language
        ));
    }
    if !config.locales.is_empty() && !config.locales.contains_key(&config.language) {
        errors.push(format!("locales has no entries for language '{}'", config.language));
    }
    if !config.locales.is_empty() && !config.locales.contains_key(DEFAULT_LANGUAGE) {
        warn!(
            "locales has no '{}' entries - ids missing from '{}' will not be sent",
            DEFAULT_LANGUAGE, config.language
        );
    }

    // Private message formats
    let formats = &config.message_command.format;
    for (name, format) in [
        ("inbound", &formats.inbound),
        ("outbound", &formats.outbound),
        ("group_inbound", &formats.group_inbound),
        ("group_outbound", &formats.group_outbound),
    ] {
        if format.is_empty() {
            errors.push(format!("message_command.format.{} is required", name));
        }
    }

    // Channels
    let mut seen = HashSet::new();
    for (i, channel) in config.channels.iter().enumerate() {
        if channel.id.is_empty() {
            errors.push(format!("channels[{}].id is required", i));
            continue;
        }
        if !seen.insert(channel.id.to_lowercase()) {
            errors.push(format!("channels[{}].id '{}' is defined twice", i, channel.id));
        }
        if channel.format.is_empty() {
            errors.push(format!("channels[{}].format is required", i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
