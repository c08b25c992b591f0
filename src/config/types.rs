//! Configuration type definitions.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::broadcast::BroadcastScope;
use crate::common::types::Channel;
use crate::locale::DEFAULT_LANGUAGE;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Language whose locales are used, e.g. "en-gb".
    #[serde(default = "default_language")]
    pub language: String,
    /// Locale templates per language: language -> message id -> template.
    #[serde(default)]
    pub locales: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub message_command: MessageCommandConfig,
    #[serde(default)]
    pub social_spy: SocialSpyConfig,
    #[serde(default)]
    pub local_spy: LocalSpyConfig,
    #[serde(default)]
    pub join_and_quit: JoinAndQuitConfig,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            locales: BTreeMap::new(),
            message_command: MessageCommandConfig::default(),
            social_spy: SocialSpyConfig::default(),
            local_spy: LocalSpyConfig::default(),
            join_and_quit: JoinAndQuitConfig::default(),
            channels: Vec::new(),
        }
    }
}

impl Config {
    /// Look up a configured channel by id (case-insensitive).
    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.channels
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
            .map(ChannelConfig::to_channel)
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Private message settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageCommandConfig {
    #[serde(default)]
    pub format: PrivateMessageFormats,
}

/// Formats for private messages. The message text is appended to the
/// resolved format.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrivateMessageFormats {
    pub inbound: String,
    pub outbound: String,
    pub group_inbound: String,
    pub group_outbound: String,
}

impl Default for PrivateMessageFormats {
    fn default() -> Self {
        Self {
            inbound: "<#00fb9a>%name% <gray>→</gray> You<gray>:</gray> <white>".to_string(),
            outbound: "<#00fb9a>You <gray>→</gray> %name%<gray>:</gray> <white>".to_string(),
            group_inbound:
                "<#00fb9a>%name% <gray>→</gray> You <gray>(+%group_amount%)</gray><gray>:</gray> <white>"
                    .to_string(),
            group_outbound:
                "<#00fb9a>You <gray>→</gray> %name% <gray>(+%group_amount%: %group_members_comma_separated%)</gray><gray>:</gray> <white>"
                    .to_string(),
        }
    }
}

/// Social spy settings. `%sender_*%` tokens are expanded against the sender
/// and `%receiver_*%` tokens against the first receiver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialSpyConfig {
    pub format: String,
    pub group_format: String,
}

impl Default for SocialSpyConfig {
    fn default() -> Self {
        Self {
            format: "%spy_color%%sender_name% → %receiver_name%: ".to_string(),
            group_format:
                "%spy_color%%sender_name% → %receiver_name% (+%group_amount_subscript%): ".to_string(),
        }
    }
}

/// Local spy settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSpyConfig {
    pub format: String,
}

impl Default for LocalSpyConfig {
    fn default() -> Self {
        Self {
            format: "%spy_color%[%channel%] %name%: ".to_string(),
        }
    }
}

/// Join and quit message settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JoinAndQuitConfig {
    pub join: FormatConfig,
    pub quit: FormatConfig,
    pub broadcast_scope: BroadcastScope,
}

impl Default for JoinAndQuitConfig {
    fn default() -> Self {
        Self {
            join: FormatConfig::new("<yellow>%name% joined the network"),
            quit: FormatConfig::new("<yellow>%name% left the network"),
            broadcast_scope: BroadcastScope::Global,
        }
    }
}

/// A single format string. Empty disables the message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub format: String,
}

impl FormatConfig {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

/// A chat channel definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub format: String,
    #[serde(default)]
    pub broadcast_scope: BroadcastScope,
}

impl ChannelConfig {
    pub fn to_channel(&self) -> Channel {
        Channel {
            id: self.id.clone(),
            format: self.format.clone(),
            broadcast_scope: self.broadcast_scope,
        }
    }
}
