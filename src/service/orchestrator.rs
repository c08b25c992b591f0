//! Message service: composes the pipeline per message kind.
//!
//! Every operation follows the same order: context placeholders (async), group
//! aggregates, spy and channel tokens, escaped user text, one deserialization,
//! delivery.

use std::sync::Arc;

use tracing::debug;

use crate::broadcast::router::send_to;
use crate::broadcast::{BroadcastRouter, BroadcastScope, DeliveryReport};
use crate::common::error::ServiceResult;
use crate::common::types::{
    Channel, OnlineUser, ServerId, SpyColor, SILENT_JOIN_PERMISSION, SILENT_QUIT_PERMISSION,
};
use crate::config::types::Config;
use crate::locale::{LocaleStore, PlaceholderSet};
use crate::markup::{MarkupCodec, MiniMarkup, RenderedMessage, TextFormatter};
use crate::service::collaborators::{
    ContextExpander, GrantedPermissions, OverrideTable, PerPlayerOverride, PermissionOracle,
    PlaceholderExpander, PresenceDirectory, StaticPresence,
};
use crate::service::pipeline::PendingMessage;

/// Override key for a player's custom join message.
pub const JOIN_MESSAGE_KEY: &str = "join_message";

/// Override key for a player's custom quit message.
pub const QUIT_MESSAGE_KEY: &str = "quit_message";

const SPY_COLOR: &str = "%spy_color%";
const CHANNEL: &str = "%channel%";

/// The external services the message service depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub presence: Arc<dyn PresenceDirectory>,
    pub expander: Arc<dyn PlaceholderExpander>,
    pub permissions: Arc<dyn PermissionOracle>,
    pub overrides: Arc<dyn PerPlayerOverride>,
    pub codec: Arc<dyn MarkupCodec>,
}

impl Collaborators {
    /// In-memory collaborators over a fixed set of online users.
    pub fn standalone(online_users: Vec<OnlineUser>) -> Self {
        Self {
            presence: Arc::new(StaticPresence::new(online_users)),
            expander: Arc::new(ContextExpander),
            permissions: Arc::new(GrantedPermissions),
            overrides: Arc::new(OverrideTable::new()),
            codec: Arc::new(MiniMarkup),
        }
    }
}

/// Join or quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Join,
    Quit,
}

impl Presence {
    fn silent_permission(&self) -> &'static str {
        match self {
            Presence::Join => SILENT_JOIN_PERMISSION,
            Presence::Quit => SILENT_QUIT_PERMISSION,
        }
    }

    fn override_key(&self) -> &'static str {
        match self {
            Presence::Join => JOIN_MESSAGE_KEY,
            Presence::Quit => QUIT_MESSAGE_KEY,
        }
    }
}

/// Resolves templates and delivers them.
pub struct MessageService {
    locales: LocaleStore,
    config: Arc<Config>,
    presence: Arc<dyn PresenceDirectory>,
    expander: Arc<dyn PlaceholderExpander>,
    permissions: Arc<dyn PermissionOracle>,
    overrides: Arc<dyn PerPlayerOverride>,
    formatter: TextFormatter,
    router: BroadcastRouter,
}

impl MessageService {
    /// Create a service using the locales of the configured language.
    pub fn new(config: Arc<Config>, collaborators: Collaborators) -> Self {
        let locales = LocaleStore::for_language(&config.locales, &config.language);
        Self::with_locales(locales, config, collaborators)
    }

    pub fn with_locales(locales: LocaleStore, config: Arc<Config>, collaborators: Collaborators) -> Self {
        let formatter = TextFormatter::new(collaborators.codec, Arc::clone(&collaborators.permissions));
        Self {
            locales,
            config,
            presence: collaborators.presence,
            expander: collaborators.expander,
            permissions: collaborators.permissions,
            overrides: collaborators.overrides,
            formatter,
            router: BroadcastRouter::new(),
        }
    }

    pub fn locales(&self) -> &LocaleStore {
        &self.locales
    }

    pub fn formatter(&self) -> &TextFormatter {
        &self.formatter
    }

    /// Send locale `id` to `user`, substituting ordinal placeholders.
    /// Returns whether anything was delivered.
    pub fn send_locale(&self, user: &OnlineUser, id: &str, ordinals: &[&str]) -> bool {
        let Some(message) = self.render_locale(id, ordinals) else {
            debug!("Locale '{}' is missing or empty, not sending", id);
            return false;
        };
        send_to(user, &message)
    }

    /// Render locale `id` once and broadcast it under `scope` from `origin`.
    /// Returns `None` when the locale is suppressed.
    pub fn broadcast_locale(
        &self,
        origin: &ServerId,
        scope: BroadcastScope,
        id: &str,
        ordinals: &[&str],
    ) -> Option<DeliveryReport> {
        let Some(message) = self.render_locale(id, ordinals) else {
            debug!("Locale '{}' is missing or empty, not broadcasting", id);
            return None;
        };
        Some(
            self.router
                .deliver(&message, scope, origin, &self.presence.online_users()),
        )
    }

    fn render_locale(&self, id: &str, ordinals: &[&str]) -> Option<RenderedMessage> {
        let template = self.locales.get(id)?;
        let markup = PlaceholderSet::ordinals(ordinals.iter().copied()).apply(template);
        Some(self.formatter.deserialize(&markup))
    }

    /// Assemble a channel message: format, then the sender's text, rendered
    /// as one markup string so tags the format leaves open style the text.
    async fn render_channel_message(
        &self,
        sender: &OnlineUser,
        channel: &Channel,
        text: &str,
    ) -> ServiceResult<RenderedMessage> {
        let text = self.formatter.escape_if_unprivileged(text, sender);
        Ok(PendingMessage::new(sender, channel.format.as_str())
            .expand(self.expander.as_ref())
            .await?
            .substitute(&PlaceholderSet::new().with(CHANNEL, channel.id.as_str()))
            .append_text(&text)
            .render(&self.formatter))
    }

    /// Send `sender`'s channel message to one `target`.
    pub async fn send_channel_message(
        &self,
        target: &OnlineUser,
        sender: &OnlineUser,
        channel: &Channel,
        text: &str,
    ) -> ServiceResult {
        if channel.format.is_empty() {
            debug!("Channel '{}' has an empty format, not sending", channel.id);
            return Ok(());
        }
        let message = self.render_channel_message(sender, channel, text).await?;
        send_to(target, &message);
        Ok(())
    }

    /// Send `sender`'s channel message to everyone the channel's scope
    /// reaches from the sender's server.
    pub async fn broadcast_channel_message(
        &self,
        sender: &OnlineUser,
        channel: &Channel,
        text: &str,
    ) -> ServiceResult<DeliveryReport> {
        if channel.format.is_empty() {
            debug!("Channel '{}' has an empty format, not sending", channel.id);
            return Ok(DeliveryReport::default());
        }
        let message = self.render_channel_message(sender, channel, text).await?;
        Ok(self.router.deliver(
            &message,
            channel.broadcast_scope,
            sender.server(),
            &self.presence.online_users(),
        ))
    }

    /// Echo a private message back to its sender. The first recipient is the
    /// primary addressee; the others are summarised as a group.
    pub async fn send_outbound_private(
        &self,
        sender: &OnlineUser,
        recipients: &[OnlineUser],
        text: &str,
    ) -> ServiceResult {
        let Some(primary) = recipients.first() else {
            return Ok(());
        };
        let formats = &self.config.message_command.format;
        let format = if recipients.len() > 1 {
            &formats.group_outbound
        } else {
            &formats.outbound
        };
        if format.is_empty() {
            debug!("Outbound private message format is empty, not sending");
            return Ok(());
        }

        let message = PendingMessage::new(primary, format.as_str())
            .expand(self.expander.as_ref())
            .await?
            .apply_group(recipients, ", ", &self.formatter)
            .append_text(&self.formatter.escape_if_unprivileged(text, sender))
            .render(&self.formatter);
        send_to(sender, &message);
        Ok(())
    }

    /// Deliver a private message to every recipient.
    pub async fn send_inbound_private(
        &self,
        recipients: &[OnlineUser],
        sender: &OnlineUser,
        text: &str,
    ) -> ServiceResult {
        if recipients.is_empty() {
            return Ok(());
        }
        let formats = &self.config.message_command.format;
        let format = if recipients.len() > 1 {
            &formats.group_inbound
        } else {
            &formats.inbound
        };
        if format.is_empty() {
            debug!("Inbound private message format is empty, not sending");
            return Ok(());
        }

        let message = PendingMessage::new(sender, format.as_str())
            .expand(self.expander.as_ref())
            .await?
            .apply_group(recipients, ", ", &self.formatter)
            .append_text(&self.formatter.escape_if_unprivileged(text, sender))
            .render(&self.formatter);
        self.router.deliver_to(&message, recipients);
        Ok(())
    }

    /// Mirror a channel message to a local spy. Spy copies always escape the
    /// text.
    pub async fn send_local_spy(
        &self,
        spy: &OnlineUser,
        spy_color: SpyColor,
        sender: &OnlineUser,
        channel: &Channel,
        text: &str,
    ) -> ServiceResult {
        let format = &self.config.local_spy.format;
        if format.is_empty() {
            debug!("Local spy format is empty, not sending");
            return Ok(());
        }

        let message = PendingMessage::new(sender, format.as_str())
            .expand(self.expander.as_ref())
            .await?
            .substitute(
                &PlaceholderSet::new()
                    .with(SPY_COLOR, spy_color.tag())
                    .with(CHANNEL, channel.id.as_str()),
            )
            .append_text(&self.formatter.escape(text))
            .render(&self.formatter);
        send_to(spy, &message);
        Ok(())
    }

    /// Mirror a private message to a social spy.
    ///
    /// `%sender_*%` tokens are expanded against the sender first, then
    /// `%receiver_*%` tokens against the first receiver.
    pub async fn send_social_spy(
        &self,
        spy: &OnlineUser,
        spy_color: SpyColor,
        sender: &OnlineUser,
        receivers: &[OnlineUser],
        text: &str,
    ) -> ServiceResult {
        let Some(primary) = receivers.first() else {
            return Ok(());
        };
        let spy_config = &self.config.social_spy;
        let format = if receivers.len() > 1 {
            &spy_config.group_format
        } else {
            &spy_config.format
        };
        if format.is_empty() {
            debug!("Social spy format is empty, not sending");
            return Ok(());
        }

        let message = PendingMessage::new(sender, format.replace("%sender_", "%"))
            .expand(self.expander.as_ref())
            .await?
            .rewrite_prefix("%receiver_")
            .into_pending(primary)
            .expand(self.expander.as_ref())
            .await?
            .apply_group(receivers, ",", &self.formatter)
            .substitute(&PlaceholderSet::new().with(SPY_COLOR, spy_color.tag()))
            .append_text(&self.formatter.escape(text))
            .render(&self.formatter);
        send_to(spy, &message);
        Ok(())
    }

    /// Announce that `user` joined.
    pub async fn send_join(&self, user: &OnlineUser) -> ServiceResult {
        self.send_presence(user, Presence::Join).await
    }

    /// Announce that `user` left.
    pub async fn send_quit(&self, user: &OnlineUser) -> ServiceResult {
        self.send_presence(user, Presence::Quit).await
    }

    async fn send_presence(&self, user: &OnlineUser, kind: Presence) -> ServiceResult {
        if self.permissions.has(user, kind.silent_permission(), false) {
            debug!("{} is silent, skipping {:?} message", user.name(), kind);
            return Ok(());
        }

        let settings = &self.config.join_and_quit;
        let format = self
            .overrides
            .lookup(user, kind.override_key())
            .unwrap_or_else(|| match kind {
                Presence::Join => settings.join.format.clone(),
                Presence::Quit => settings.quit.format.clone(),
            });
        if format.is_empty() {
            debug!("{:?} message for {} is empty, not sending", kind, user.name());
            return Ok(());
        }

        let message = PendingMessage::new(user, format)
            .expand(self.expander.as_ref())
            .await?
            .render(&self.formatter);
        self.router.deliver(
            &message,
            settings.broadcast_scope,
            user.server(),
            &self.presence.online_users(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::common::error::{ExpansionError, ServiceError};
    use crate::common::sink::ChannelSink;
    use crate::common::types::FORMATTED_CHAT_PERMISSION;
    use crate::markup::{Color, RenderedMessage};

    type Inbox = mpsc::UnboundedReceiver<RenderedMessage>;

    fn user(name: &str, server: &str) -> (OnlineUser, Inbox) {
        let (sink, rx) = ChannelSink::new(name);
        (OnlineUser::new(name, server, Arc::new(sink)), rx)
    }

    fn recv_text(inbox: &mut Inbox) -> String {
        inbox.try_recv().expect("message delivered").plain_text()
    }

    fn config() -> Config {
        let mut en = BTreeMap::new();
        en.insert("joined".to_string(), "%1% joined!".to_string());
        en.insert("gift".to_string(), "<gold>%1% gave %2% to %1%".to_string());
        en.insert("suppressed".to_string(), String::new());
        let mut locales = BTreeMap::new();
        locales.insert("en-gb".to_string(), en);

        let mut config = Config {
            locales,
            ..Config::default()
        };
        config.message_command.format.outbound = "You → %name%: ".to_string();
        config.message_command.format.group_outbound =
            "You → %name% (+%group_amount%: %group_members_comma_separated%): ".to_string();
        config.message_command.format.inbound = "%name% → You: ".to_string();
        config.message_command.format.group_inbound =
            "%name% → You (+%group_amount_subscript%): ".to_string();
        config.join_and_quit.join.format = "%name% joined".to_string();
        config.join_and_quit.quit.format = "%name% left".to_string();
        config
    }

    fn service(config: Config, online: Vec<OnlineUser>) -> MessageService {
        MessageService::new(Arc::new(config), Collaborators::standalone(online))
    }

    fn channel(scope: BroadcastScope) -> Channel {
        Channel {
            id: "global".to_string(),
            format: "<gray>[%channel%] <gold>%name%</gold>: ".to_string(),
            broadcast_scope: scope,
        }
    }

    /// Counts expansion and override lookups.
    #[derive(Default)]
    struct Counting {
        expansions: AtomicUsize,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl PlaceholderExpander for Counting {
        async fn expand(&self, user: &OnlineUser, template: &str) -> Result<String, ExpansionError> {
            self.expansions.fetch_add(1, Ordering::SeqCst);
            ContextExpander.expand(user, template).await
        }
    }

    impl PerPlayerOverride for Counting {
        fn lookup(&self, _user: &OnlineUser, _key: &str) -> Option<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    struct FailingExpander;

    /// Fails only when expanding against one user.
    struct FailingFor(&'static str);

    #[async_trait]
    impl PlaceholderExpander for FailingFor {
        async fn expand(&self, user: &OnlineUser, template: &str) -> Result<String, ExpansionError> {
            if user.name() == self.0 {
                return Err(ExpansionError::new(user.name(), "no placeholder data"));
            }
            ContextExpander.expand(user, template).await
        }
    }

    #[async_trait]
    impl PlaceholderExpander for FailingExpander {
        async fn expand(&self, user: &OnlineUser, _template: &str) -> Result<String, ExpansionError> {
            Err(ExpansionError::new(user.name(), "placeholder backend unavailable"))
        }
    }

    #[test]
    fn test_send_locale_substitutes_ordinals() {
        let (alice, mut inbox) = user("Alice", "A");
        let service = service(config(), vec![]);

        assert!(service.send_locale(&alice, "gift", &["Bob", "a cake"]));
        let message = inbox.try_recv().unwrap();
        assert_eq!(message.plain_text(), "Bob gave a cake to Bob");
        assert_eq!(message.spans()[0].color, Color::from_name("gold"));
    }

    #[test]
    fn test_send_locale_missing_or_empty_is_noop() {
        let (alice, mut inbox) = user("Alice", "A");
        let service = service(config(), vec![]);

        assert!(!service.send_locale(&alice, "suppressed", &[]));
        assert!(!service.send_locale(&alice, "no_such_id", &[]));
        assert!(inbox.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_locale_global_reaches_all_servers() {
        let (a, mut a_inbox) = user("a", "A");
        let (b, mut b_inbox) = user("b", "B");
        let service = service(config(), vec![a, b]);

        let report = service
            .broadcast_locale(&ServerId::from("A"), BroadcastScope::Global, "joined", &["Bob"])
            .unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(recv_text(&mut a_inbox), "Bob joined!");
        assert_eq!(recv_text(&mut b_inbox), "Bob joined!");
    }

    #[test]
    fn test_broadcast_locale_suppressed() {
        let (a, mut a_inbox) = user("a", "A");
        let service = service(config(), vec![a]);

        let report =
            service.broadcast_locale(&ServerId::from("A"), BroadcastScope::Global, "suppressed", &[]);
        assert!(report.is_none());
        assert!(a_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_channel_message_escapes_unprivileged_text() {
        let (target, mut inbox) = user("Target", "A");
        let (sender, _) = user("Alice", "A");
        let service = service(config(), vec![]);

        service
            .send_channel_message(&target, &sender, &channel(BroadcastScope::Global), "<red>hi")
            .await
            .unwrap();

        let message = inbox.try_recv().unwrap();
        assert_eq!(message.plain_text(), "[global] Alice: <red>hi");
        // The format's outer color is still open when the text starts.
        let last = message.spans().last().cloned().unwrap();
        assert_eq!(last.text, ": <red>hi");
        assert_eq!(last.color, Color::from_name("gray"));
    }

    #[tokio::test]
    async fn test_channel_message_keeps_open_format_decorations() {
        let (target, mut inbox) = user("Target", "A");
        let (sender, _) = user("Alice", "A");
        let service = service(config(), vec![]);
        let channel = Channel {
            id: "global".to_string(),
            format: "<bold><gold>[g]</gold> %name%: ".to_string(),
            broadcast_scope: BroadcastScope::Global,
        };

        service
            .send_channel_message(&target, &sender, &channel, "hi")
            .await
            .unwrap();

        let message = inbox.try_recv().unwrap();
        let last = message.spans().last().cloned().unwrap();
        assert_eq!(last.text, " Alice: hi");
        assert_eq!(last.color, None);
        assert!(last.decorations.bold);
    }

    #[tokio::test]
    async fn test_channel_message_allows_markup_with_permission() {
        let (target, mut inbox) = user("Target", "A");
        let (sender, _) = user("Alice", "A");
        let sender = sender.with_permission(FORMATTED_CHAT_PERMISSION);
        let service = service(config(), vec![]);

        service
            .send_channel_message(&target, &sender, &channel(BroadcastScope::Global), "<red>hi")
            .await
            .unwrap();

        let message = inbox.try_recv().unwrap();
        assert_eq!(message.plain_text(), "[global] Alice: hi");
        assert_eq!(message.spans().last().unwrap().color, Color::from_name("red"));
    }

    #[tokio::test]
    async fn test_broadcast_channel_message_uses_channel_scope() {
        let (sender, mut sender_inbox) = user("Alice", "A");
        let (local, mut local_inbox) = user("Bob", "A");
        let (remote, mut remote_inbox) = user("Carol", "B");
        let service = service(config(), vec![sender.clone(), local, remote]);

        let report = service
            .broadcast_channel_message(&sender, &channel(BroadcastScope::Local), "hello")
            .await
            .unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(recv_text(&mut sender_inbox), "[global] Alice: hello");
        assert_eq!(recv_text(&mut local_inbox), "[global] Alice: hello");
        assert!(remote_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_outbound_private_single() {
        let (sender, mut sender_inbox) = user("Alice", "A");
        let (bob, mut bob_inbox) = user("Bob", "A");
        let service = service(config(), vec![]);

        service
            .send_outbound_private(&sender, &[bob], "hey")
            .await
            .unwrap();

        assert_eq!(recv_text(&mut sender_inbox), "You → Bob: hey");
        assert!(bob_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_outbound_private_group() {
        let (sender, mut sender_inbox) = user("Alice", "A");
        let (bob, _) = user("Bob", "A");
        let (carol, _) = user("Carol", "B");
        let (dave, _) = user("Dave", "B");
        let service = service(config(), vec![]);

        service
            .send_outbound_private(&sender, &[bob, carol, dave], "hey all")
            .await
            .unwrap();

        assert_eq!(
            recv_text(&mut sender_inbox),
            "You → Bob (+2: Carol, Dave): hey all"
        );
    }

    #[tokio::test]
    async fn test_inbound_private_group_reaches_every_recipient() {
        let (sender, _) = user("Alice", "A");
        let (bob, mut bob_inbox) = user("Bob", "A");
        let (carol, mut carol_inbox) = user("Carol", "B");
        let (dave, mut dave_inbox) = user("Dave", "B");
        let service = service(config(), vec![]);

        service
            .send_inbound_private(&[bob, carol, dave], &sender, "<b>psst")
            .await
            .unwrap();

        for inbox in [&mut bob_inbox, &mut carol_inbox, &mut dave_inbox] {
            assert_eq!(recv_text(inbox), "Alice → You (+₂): <b>psst");
        }
    }

    #[tokio::test]
    async fn test_local_spy() {
        let (spy, mut spy_inbox) = user("Spy", "A");
        let (sender, _) = user("Alice", "B");
        let sender = sender.with_permission(FORMATTED_CHAT_PERMISSION);
        let service = service(config(), vec![]);

        service
            .send_local_spy(&spy, SpyColor::DarkRed, &sender, &channel(BroadcastScope::Local), "<red>x")
            .await
            .unwrap();

        let message = spy_inbox.try_recv().unwrap();
        // Spy copies are escaped even for privileged senders.
        assert_eq!(message.plain_text(), "[global] Alice: <red>x");
        assert!(message
            .spans()
            .iter()
            .all(|s| s.color == Some(SpyColor::DarkRed.color())));
    }

    #[tokio::test]
    async fn test_social_spy_resolves_sender_then_receiver() {
        let (spy, mut spy_inbox) = user("Spy", "A");
        let (sender, _) = user("Alice", "A");
        let (bob, _) = user("Bob", "B");
        let service = service(config(), vec![]);

        service
            .send_social_spy(&spy, SpyColor::Gray, &sender, &[bob], "hi")
            .await
            .unwrap();

        assert_eq!(recv_text(&mut spy_inbox), "Alice → Bob: hi");
    }

    #[tokio::test]
    async fn test_social_spy_group() {
        let (spy, mut spy_inbox) = user("Spy", "A");
        let (sender, _) = user("Alice", "A");
        let (bob, _) = user("Bob", "A");
        let (carol, _) = user("Carol", "A");
        let (dave, _) = user("Dave", "A");
        let mut config = config();
        config.social_spy.group_format =
            "%spy_color%%sender_name% → %receiver_name% +%group_amount% [%group_members_comma_separated%]: "
                .to_string();
        let service = service(config, vec![]);

        service
            .send_social_spy(&spy, SpyColor::Aqua, &sender, &[bob, carol, dave], "hi")
            .await
            .unwrap();

        assert_eq!(recv_text(&mut spy_inbox), "Alice → Bob +2 [Carol,Dave]: hi");
    }

    #[tokio::test]
    async fn test_join_broadcasts_by_scope() {
        let (joiner, mut joiner_inbox) = user("Bob", "A");
        let (remote, mut remote_inbox) = user("Carol", "B");
        let mut config = config();
        config.join_and_quit.broadcast_scope = BroadcastScope::Local;
        let service = service(config, vec![joiner.clone(), remote]);

        service.send_join(&joiner).await.unwrap();

        assert_eq!(recv_text(&mut joiner_inbox), "Bob joined");
        assert!(remote_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_quit_uses_player_override() {
        let (leaver, _) = user("Bob", "A");
        let (other, mut other_inbox) = user("Carol", "B");
        let mut collaborators = Collaborators::standalone(vec![other]);
        collaborators.overrides =
            Arc::new(OverrideTable::new().with("Bob", QUIT_MESSAGE_KEY, "<red>%name% vanished"));
        let service = MessageService::new(Arc::new(config()), collaborators);

        service.send_quit(&leaver).await.unwrap();

        assert_eq!(recv_text(&mut other_inbox), "Bob vanished");
    }

    #[tokio::test]
    async fn test_silent_join_skips_all_work() {
        let (joiner, _) = user("Bob", "A");
        let joiner = joiner.with_permission(SILENT_JOIN_PERMISSION);
        let (other, mut other_inbox) = user("Carol", "A");
        let counting = Arc::new(Counting::default());
        let mut collaborators = Collaborators::standalone(vec![other]);
        collaborators.expander = counting.clone();
        collaborators.overrides = counting.clone();
        let service = MessageService::new(Arc::new(config()), collaborators);

        service.send_join(&joiner).await.unwrap();

        assert_eq!(counting.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(counting.expansions.load(Ordering::SeqCst), 0);
        assert!(other_inbox.try_recv().is_err());

        // Quit is gated separately.
        service.send_quit(&joiner).await.unwrap();
        assert_eq!(counting.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(recv_text(&mut other_inbox), "Bob left");
    }

    #[tokio::test]
    async fn test_silent_quit_skips_all_work() {
        let (leaver, _) = user("Bob", "A");
        let leaver = leaver.with_permission(SILENT_QUIT_PERMISSION);
        let (other, mut other_inbox) = user("Carol", "A");
        let counting = Arc::new(Counting::default());
        let mut collaborators = Collaborators::standalone(vec![other]);
        collaborators.expander = counting.clone();
        collaborators.overrides = counting.clone();
        let service = MessageService::new(Arc::new(config()), collaborators);

        service.send_quit(&leaver).await.unwrap();

        assert_eq!(counting.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(counting.expansions.load(Ordering::SeqCst), 0);
        assert!(other_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_join_format_is_suppressed() {
        let (joiner, mut inbox) = user("Bob", "A");
        let mut config = config();
        config.join_and_quit.join.format = String::new();
        let service = service(config, vec![joiner.clone()]);

        service.send_join(&joiner).await.unwrap();
        assert!(inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_expansion_failure_sends_nothing() {
        let (sender, mut sender_inbox) = user("Alice", "A");
        let (bob, mut bob_inbox) = user("Bob", "A");
        let mut collaborators = Collaborators::standalone(vec![sender.clone(), bob.clone()]);
        collaborators.expander = Arc::new(FailingExpander);
        let service = MessageService::new(Arc::new(config()), collaborators);

        let result = service.send_inbound_private(&[bob], &sender, "hi").await;
        assert!(matches!(result, Err(ServiceError::Expansion(_))));

        let result = service.send_join(&sender).await;
        assert!(result.is_err());

        assert!(sender_inbox.try_recv().is_err());
        assert!(bob_inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_social_spy_receiver_expansion_failure_sends_nothing() {
        let (spy, mut spy_inbox) = user("Spy", "A");
        let (sender, _) = user("Alice", "A");
        let (bob, _) = user("Bob", "B");
        let mut collaborators = Collaborators::standalone(vec![]);
        collaborators.expander = Arc::new(FailingFor("Bob"));
        let service = MessageService::new(Arc::new(config()), collaborators);

        let result = service
            .send_social_spy(&spy, SpyColor::Gray, &sender, &[bob], "hi")
            .await;

        match result {
            Err(ServiceError::Expansion(e)) => assert_eq!(e.user, "Bob"),
            other => panic!("expected receiver expansion failure, got {:?}", other),
        }
        assert!(spy_inbox.try_recv().is_err());
    }
}
