//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `CHATCAST_CONFIG` - Path of the config file
//! - `CHATCAST_LANGUAGE` - Locale language, e.g. "de-de"
//! - `CHATCAST_JOIN_QUIT_SCOPE` - Broadcast scope for join and quit messages

use std::env;

use tracing::warn;

use crate::broadcast::BroadcastScope;
use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "CHATCAST";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(language) = env::var(format!("{}_LANGUAGE", ENV_PREFIX)) {
        if !language.is_empty() {
            config.language = language.to_lowercase();
        }
    }

    if let Ok(scope) = env::var(format!("{}_JOIN_QUIT_SCOPE", ENV_PREFIX)) {
        match BroadcastScope::parse(&scope) {
            Some(scope) => config.join_and_quit.broadcast_scope = scope,
            None => warn!(
                "Ignoring {}_JOIN_QUIT_SCOPE: unknown broadcast scope '{}'",
                ENV_PREFIX, scope
            ),
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `CHATCAST_CONFIG` environment variable, otherwise returns "chatcast.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "chatcast.conf".to_string())
}
