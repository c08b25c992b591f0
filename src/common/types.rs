//! Shared types used across the engine.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::broadcast::BroadcastScope;
use crate::common::sink::MessageSink;
use crate::markup::Color;

/// Capability that suppresses a user's join message.
pub const SILENT_JOIN_PERMISSION: &str = "chatcast.silent_join";

/// Capability that suppresses a user's quit message.
pub const SILENT_QUIT_PERMISSION: &str = "chatcast.silent_quit";

/// Capability that lets a user's chat text carry markup tags.
pub const FORMATTED_CHAT_PERMISSION: &str = "chatcast.formatted_chat";

/// Identifier of the backend server a user is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A connected participant.
///
/// Cheap to clone: the permission set and the sink are shared. The engine only
/// reads users; the presence tracker owns them.
#[derive(Clone)]
pub struct OnlineUser {
    name: String,
    server: ServerId,
    permissions: Arc<HashSet<String>>,
    console: bool,
    sink: Arc<dyn MessageSink>,
}

impl OnlineUser {
    /// Create a player with no permissions.
    pub fn new(name: impl Into<String>, server: impl Into<ServerId>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            permissions: Arc::new(HashSet::new()),
            console: false,
            sink,
        }
    }

    /// Create the console user. It passes every check that allows console override.
    pub fn console(server: impl Into<ServerId>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            console: true,
            ..Self::new("CONSOLE", server, sink)
        }
    }

    /// Grant a permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.permissions).insert(permission.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &ServerId {
        &self.server
    }

    pub fn permissions(&self) -> &HashSet<String> {
        &self.permissions
    }

    pub fn is_console(&self) -> bool {
        self.console
    }

    pub fn sink(&self) -> &dyn MessageSink {
        self.sink.as_ref()
    }
}

impl fmt::Debug for OnlineUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnlineUser")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("permissions", &self.permissions)
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

/// A chat channel as seen by the engine.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Channel identifier, also used for `%channel%`.
    pub id: String,
    /// Format template the sender's text is appended to.
    pub format: String,
    /// Who receives messages sent in this channel.
    pub broadcast_scope: BroadcastScope,
}

/// Color a spy has chosen for mirrored messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl SpyColor {
    pub const ALL: [SpyColor; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkAqua,
        Self::DarkRed,
        Self::DarkPurple,
        Self::Gold,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Aqua,
        Self::Red,
        Self::LightPurple,
        Self::Yellow,
        Self::White,
    ];

    /// Lowercase name, which is also the markup color name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkAqua => "dark_aqua",
            Self::DarkRed => "dark_red",
            Self::DarkPurple => "dark_purple",
            Self::Gold => "gold",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::LightPurple => "light_purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }

    /// Opening tag substituted for `%spy_color%`.
    pub fn tag(&self) -> String {
        format!("<{}>", self.name())
    }

    pub fn color(&self) -> Color {
        // Every spy color name is a named markup color.
        Color::from_name(self.name()).unwrap_or(Color::WHITE)
    }
}
