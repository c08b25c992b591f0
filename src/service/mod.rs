//! The message service and the collaborators it depends on.

pub mod collaborators;
pub mod orchestrator;
pub mod pipeline;

pub use collaborators::{
    ContextExpander, GrantedPermissions, NoopExpander, OverrideTable, PerPlayerOverride,
    PermissionOracle, PlaceholderExpander, PresenceDirectory, StaticPresence,
};
pub use orchestrator::{Collaborators, MessageService, JOIN_MESSAGE_KEY, QUIT_MESSAGE_KEY};
pub use pipeline::{ExpandedMessage, PendingMessage};
