//! Session state machine.
//!
//! The [`Session`] owns the client's view of the relay: connection lifecycle,
//! message log, presence, typing and the active room. It reacts to transport
//! deliveries and local commands and returns [`SessionAction`]s for the caller
//! to execute. It performs no I/O.
//!
//! Deliveries are dispatched by event name through a [`Registry`]. The session
//! attaches one observer on construction and detaches it on
//! [`Session::teardown`], after which every delivery is dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use relaychat_core::{
    Connection, ConnectionState, Environment, LifecycleEvent, MessageLog, ObserverId, Presence,
    PresenceChange, Registry, RoomSwitchCoordinator, StateField, TypingIndicator, TypingSignal,
};
use relaychat_proto::{
    ClientCommand, Message, PresenceNotice, ServerEvent, ServerEventName, User, UserId,
};
use tracing::{debug, info, warn};

use crate::{
    config::{Identity, SessionConfig},
    error::SessionError,
    event::{SessionAction, SessionEvent, SessionNotice},
};

type HandlerResult = Result<Vec<SessionAction>, SessionError>;

/// Handler bound to one server event name.
type Handler<E> = fn(&mut Session<E>, ServerEvent) -> HandlerResult;

/// Client session synchronization core.
pub struct Session<E: Environment> {
    /// Environment for ids and timestamps of synthesized notices.
    env: E,

    /// Tunables.
    config: SessionConfig,

    /// Identity of the last `connect()`. `None` before the first connect.
    identity: Option<Identity>,

    /// Connection lifecycle state machine.
    connection: Connection,

    /// Event name to handler bindings.
    registry: Registry<ServerEventName, Handler<E>>,

    /// Observer holding the session's own bindings. `None` after teardown.
    observer: Option<ObserverId>,

    /// Message log of the active room.
    log: MessageLog,

    /// Users in the active room.
    presence: Presence,

    /// Remote typing snapshot and local typing intent.
    typing: TypingIndicator<E::Instant>,

    /// Active room, known rooms and pending join.
    rooms: RoomSwitchCoordinator<E::Instant>,

    /// Most recent chat or private message received.
    last_message: Option<Message>,
}

impl<E: Environment> Session<E> {
    /// Create a session and attach its event handlers.
    pub fn new(env: E, config: SessionConfig) -> Self {
        let typing = TypingIndicator::new(config.typing_debounce);
        let rooms = RoomSwitchCoordinator::new(&config.default_rooms, config.default_room.clone());

        let mut session = Self {
            env,
            config,
            identity: None,
            connection: Connection::new(),
            registry: Registry::new(),
            observer: None,
            log: MessageLog::new(),
            presence: Presence::new(),
            typing,
            rooms,
            last_message: None,
        };
        session.attach();
        session
    }

    /// Bind a handler for every server event.
    ///
    /// Re-attaching while attached rebinds in place and never duplicates a
    /// binding. Returns the observer holding the bindings.
    pub fn attach(&mut self) -> ObserverId {
        let observer = match self.observer {
            Some(observer) => observer,
            None => self.registry.observer(),
        };

        for name in ServerEventName::ALL {
            self.registry.bind(name, observer, Self::handler_for(name));
        }

        self.observer = Some(observer);
        observer
    }

    fn handler_for(name: ServerEventName) -> Handler<E> {
        match name {
            ServerEventName::Connect => Self::on_connect,
            ServerEventName::Disconnect => Self::on_disconnect,
            ServerEventName::ReconnectAttempt => Self::on_reconnect_attempt,
            ServerEventName::ReconnectFailed => Self::on_reconnect_failed,
            ServerEventName::ReceiveMessage | ServerEventName::PrivateMessage => Self::on_message,
            ServerEventName::MessageHistory => Self::on_message_history,
            ServerEventName::UserList => Self::on_user_list,
            ServerEventName::UserJoined | ServerEventName::UserLeft => Self::on_presence_change,
            ServerEventName::TypingUsers => Self::on_typing_users,
            ServerEventName::RoomJoined => Self::on_room_joined,
        }
    }

    /// Process an event and return resulting actions.
    ///
    /// Errors are logged and the event is dropped without touching state.
    pub fn handle(&mut self, event: SessionEvent<E::Instant>) -> Vec<SessionAction> {
        match self.try_handle(event) {
            Ok(actions) => actions,
            Err(err) if err.is_benign() => {
                debug!(error = %err, "dropped event");
                Vec::new()
            },
            Err(err) => {
                warn!(error = %err, state = %self.connection.state(), "dropped event");
                Vec::new()
            },
        }
    }

    /// Process an event, reporting why it was dropped.
    ///
    /// # Errors
    ///
    /// - `SessionError::StaleDelivery` if the delivery belongs to a superseded
    ///   connection
    /// - `SessionError::Protocol` if the frame is malformed
    /// - `SessionError::Connection` if a lifecycle event is invalid in the
    ///   current state
    /// - `SessionError::Unbound` after teardown
    pub fn try_handle(&mut self, event: SessionEvent<E::Instant>) -> HandlerResult {
        match event {
            SessionEvent::Delivery { epoch, frame } => {
                let current = self.connection.epoch();
                if epoch != current {
                    return Err(SessionError::StaleDelivery { delivered: epoch, current });
                }

                let event = ServerEvent::from_frame(&frame)?;
                self.dispatch(event)
            },
            SessionEvent::Tick { now } => Ok(self.tick(now)),
        }
    }

    fn dispatch(&mut self, event: ServerEvent) -> HandlerResult {
        let name = event.name();
        let handlers: Vec<Handler<E>> = self.registry.handlers(&name).copied().collect();
        if handlers.is_empty() {
            return Err(SessionError::Unbound(name));
        }

        let mut actions = Vec::new();
        for handler in handlers {
            actions.extend(handler(self, event.clone())?);
        }
        Ok(actions)
    }

    fn on_connect(&mut self, _event: ServerEvent) -> HandlerResult {
        let transition = self.connection.handle(LifecycleEvent::Acknowledged)?;
        info!(from = %transition.from, epoch = %self.connection.epoch(), "connected");

        let mut actions = vec![
            SessionAction::Changed(StateField::ConnectionState),
            SessionAction::Changed(StateField::ReconnectionAttempts),
        ];

        // The relay forgets us on every transport loss
        if let Some(identity) = &self.identity {
            let join = ClientCommand::UserJoin {
                username: identity.username.clone(),
                room: self.rooms.active().to_string(),
            };
            actions.extend(self.command(join));
        }

        Ok(actions)
    }

    fn on_disconnect(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::Disconnect { reason } = event else {
            return Ok(Vec::new());
        };

        let transition = self.connection.handle(LifecycleEvent::Lost)?;
        if self.typing.cancel() {
            debug!("local typing cancelled by transport loss");
        }
        info!(%reason, from = %transition.from, to = %transition.to, "transport lost");

        Ok(vec![SessionAction::Changed(StateField::ConnectionState)])
    }

    fn on_reconnect_attempt(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::ReconnectAttempt { attempt } = event else {
            return Ok(Vec::new());
        };

        let transition = self.connection.handle(LifecycleEvent::Attempt(attempt))?;
        if transition.from.is_connected() && self.typing.cancel() {
            debug!("local typing cancelled by transport loss");
        }
        debug!(attempt, attempts = self.connection.attempts(), state = %transition.to, "reconnecting");

        Ok(vec![
            SessionAction::Changed(StateField::ConnectionState),
            SessionAction::Changed(StateField::ReconnectionAttempts),
        ])
    }

    fn on_reconnect_failed(&mut self, _event: ServerEvent) -> HandlerResult {
        self.connection.handle(LifecycleEvent::GaveUp)?;
        self.typing.cancel();
        warn!(attempts = self.connection.attempts(), "reconnection failed; connect again to retry");

        Ok(vec![
            SessionAction::Changed(StateField::ConnectionState),
            SessionAction::Notice(SessionNotice::ReconnectFailed),
        ])
    }

    fn on_message(&mut self, event: ServerEvent) -> HandlerResult {
        let (ServerEvent::ReceiveMessage(message) | ServerEvent::PrivateMessage(message)) = event
        else {
            return Ok(Vec::new());
        };

        self.log.append(message.clone());
        self.last_message = Some(message.clone());

        Ok(vec![SessionAction::Appended(message)])
    }

    fn on_message_history(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::MessageHistory(messages) = event else {
            return Ok(Vec::new());
        };

        debug!(count = messages.len(), "history snapshot");
        self.log.replace_with_history(messages);

        Ok(vec![SessionAction::Changed(StateField::Messages)])
    }

    fn on_user_list(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::UserList(users) = event else {
            return Ok(Vec::new());
        };

        if self.presence.replace_all(users) {
            Ok(vec![SessionAction::Changed(StateField::Users)])
        } else {
            Ok(Vec::new())
        }
    }

    fn on_presence_change(&mut self, event: ServerEvent) -> HandlerResult {
        let (change, PresenceNotice { username, .. }) = match event {
            ServerEvent::UserJoined(notice) => (PresenceChange::Joined, notice),
            ServerEvent::UserLeft(notice) => (PresenceChange::Left, notice),
            _ => return Ok(Vec::new()),
        };

        let message = change.system_message(&username, self.env.random_u64(), self.env.wall_clock());
        self.log.append(message.clone());

        Ok(vec![SessionAction::Appended(message)])
    }

    fn on_typing_users(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::TypingUsers(users) = event else {
            return Ok(Vec::new());
        };

        self.typing.replace_remote(users);
        Ok(vec![SessionAction::Changed(StateField::RemoteTyping)])
    }

    fn on_room_joined(&mut self, event: ServerEvent) -> HandlerResult {
        let ServerEvent::RoomJoined { room } = event else {
            return Ok(Vec::new());
        };

        let switch = self.rooms.confirm(room, &mut self.log, &mut self.typing);
        info!(room = %switch.room, was_pending = switch.was_pending, "room joined");

        let mut actions = vec![
            SessionAction::Changed(StateField::ActiveRoom),
            SessionAction::Changed(StateField::Messages),
            SessionAction::Changed(StateField::RemoteTyping),
        ];
        if switch.newly_known {
            actions.push(SessionAction::Changed(StateField::KnownRooms));
        }
        actions.push(SessionAction::Notice(SessionNotice::RoomSwitched { room: switch.room }));

        Ok(actions)
    }

    fn tick(&mut self, now: E::Instant) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if let Some(signal) = self.typing.tick(now) {
            actions.extend(self.typing_signal(signal));
        }

        if let Some(timeout) = self.config.join_timeout {
            if let Some(pending) = self.rooms.expire(now, timeout) {
                warn!(room = %pending.room, active = %self.rooms.active(), "room join not confirmed");
                actions.push(SessionAction::Notice(SessionNotice::JoinTimedOut { room: pending.room }));
            }
        }

        actions
    }

    /// Request a connection as `identity`.
    ///
    /// No-op while connecting, connected or reconnecting. The identity's room
    /// is entered on the first acknowledgment unless a room switch has already
    /// been confirmed in this session.
    pub fn connect(&mut self, identity: Identity) -> Vec<SessionAction> {
        if !self.is_attached() {
            debug!("connect after teardown ignored");
            return Vec::new();
        }

        match self.connection.connect() {
            Ok(epoch) => {
                info!(username = %identity.username, room = %identity.room, %epoch, "connecting");
                if let Some(stale) = self.rooms.abandon() {
                    debug!(room = %stale.room, "pending join dropped by reconnect");
                }
                let mut actions =
                    vec![SessionAction::Open { epoch }, SessionAction::Changed(StateField::ConnectionState)];
                if self.rooms.select_initial(&identity.room) {
                    actions.push(SessionAction::Changed(StateField::ActiveRoom));
                }
                self.identity = Some(identity);
                actions
            },
            Err(err) => {
                debug!(error = %err, "connect ignored");
                Vec::new()
            },
        }
    }

    /// Tear down the connection. Idempotent.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        if !self.connection.disconnect() {
            return Vec::new();
        }

        self.typing.cancel();
        info!(epoch = %self.connection.epoch(), "disconnected");

        vec![
            SessionAction::Close,
            SessionAction::Changed(StateField::ConnectionState),
            SessionAction::Changed(StateField::ReconnectionAttempts),
        ]
    }

    /// Broadcast `text` to the active room.
    ///
    /// The text is trimmed; blank messages are dropped. Sending ends local
    /// typing immediately.
    pub fn send_message(&mut self, text: &str) -> Vec<SessionAction> {
        let message = text.trim();
        if let Err(err) = self.ready_to_send(message) {
            debug!(error = %err, "message dropped");
            return Vec::new();
        }

        let mut actions: Vec<_> =
            self.command(ClientCommand::SendMessage { message: message.to_string() }).into_iter().collect();
        if let Some(signal) = self.typing.stop() {
            actions.extend(self.typing_signal(signal));
        }
        actions
    }

    /// Send `text` privately to user `to`.
    pub fn send_private_message(&mut self, to: UserId, text: &str) -> Vec<SessionAction> {
        let message = text.trim();
        if let Err(err) = self.ready_to_send(message) {
            debug!(error = %err, %to, "private message dropped");
            return Vec::new();
        }

        self.command(ClientCommand::PrivateMessage { to, message: message.to_string() })
            .into_iter()
            .collect()
    }

    fn ready_to_send(&self, message: &str) -> Result<(), SessionError> {
        if !self.connection.state().is_connected() {
            return Err(SessionError::NotConnected);
        }
        if message.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        Ok(())
    }

    /// Report local typing activity at `now`.
    ///
    /// `true` is a keystroke: the first one after idle emits `typing(true)`,
    /// later ones only push the debounce deadline back. `false` stops typing
    /// immediately.
    pub fn set_typing(&mut self, is_typing: bool, now: E::Instant) -> Vec<SessionAction> {
        if !self.connection.state().is_connected() {
            return Vec::new();
        }

        let signal = if is_typing { self.typing.keystroke(now) } else { self.typing.stop() };
        signal.map(|signal| self.typing_signal(signal)).unwrap_or_default()
    }

    fn typing_signal(&self, signal: TypingSignal) -> Vec<SessionAction> {
        let mut actions: Vec<_> =
            self.command(ClientCommand::Typing(signal.is_typing())).into_iter().collect();
        actions.push(SessionAction::Changed(StateField::LocalTyping));
        actions
    }

    /// Ask the server to move us to `room`.
    ///
    /// Nothing changes locally until the server confirms with `room_joined`.
    pub fn join_room(&mut self, room: &str, now: E::Instant) -> Vec<SessionAction> {
        if !self.connection.state().is_connected() {
            debug!(%room, "join dropped: not connected");
            return Vec::new();
        }

        match self.rooms.request(room, now) {
            Ok(room_name) => {
                info!(room = %room_name, "join requested");
                self.command(ClientCommand::JoinRoom { room_name }).into_iter().collect()
            },
            Err(err) => {
                debug!(error = %err, "join ignored");
                Vec::new()
            },
        }
    }

    /// Request history of the active room older than `before`.
    pub fn load_messages(&mut self, before: DateTime<Utc>) -> Vec<SessionAction> {
        if !self.connection.state().is_connected() {
            return Vec::new();
        }

        let room = self.rooms.active().to_string();
        self.command(ClientCommand::LoadMessages { room, before }).into_iter().collect()
    }

    /// Request the page of history before the oldest loaded message.
    pub fn load_older(&mut self) -> Vec<SessionAction> {
        let before = self.log.first().map_or_else(|| self.env.wall_clock(), Message::timestamp);
        self.load_messages(before)
    }

    /// Tear the session down.
    ///
    /// Disconnects, cancels the typing deadline and removes every handler
    /// binding. Later deliveries and commands are dropped.
    pub fn teardown(&mut self) -> Vec<SessionAction> {
        let actions = self.disconnect();
        self.typing.cancel();
        self.rooms.abandon();

        if let Some(observer) = self.observer.take() {
            let removed = self.registry.detach(observer);
            debug!(removed, %observer, "session torn down");
        }

        actions
    }

    fn command(&self, command: ClientCommand) -> Option<SessionAction> {
        let name = command.name();
        match command.into_frame() {
            Ok(frame) => Some(SessionAction::Send(frame)),
            Err(err) => {
                warn!(error = %err, command = %name, "failed to encode command");
                None
            },
        }
    }

    /// Connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Reconnect attempts since the last successful connect.
    pub fn reconnection_attempts(&self) -> u32 {
        self.connection.attempts()
    }

    /// Message log of the active room, in arrival order.
    pub fn messages(&self) -> &[Message] {
        self.log.entries()
    }

    /// Most recent chat or private message received.
    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    /// Users in the active room.
    pub fn users(&self) -> &[User] {
        self.presence.users()
    }

    /// Look up a present user by name.
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.presence.find_by_name(username)
    }

    /// Remote users currently typing.
    pub fn typing_users(&self) -> &[String] {
        self.typing.remote()
    }

    /// Display line for remote typing. `None` if nobody is typing.
    pub fn typing_summary(&self) -> Option<String> {
        self.typing.summary()
    }

    /// True while the local user is considered typing.
    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// Active room.
    pub fn active_room(&self) -> &str {
        self.rooms.active()
    }

    /// Known rooms, in discovery order.
    pub fn known_rooms(&self) -> &[String] {
        self.rooms.known()
    }

    /// Room awaiting a join confirmation.
    pub fn pending_join(&self) -> Option<&str> {
        self.rooms.pending().map(|pending| pending.room.as_str())
    }

    /// Identity of the last connect.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Current connection epoch.
    pub fn epoch(&self) -> relaychat_core::Epoch {
        self.connection.epoch()
    }

    /// True until [`Session::teardown`].
    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Number of live handler bindings.
    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Debounce window of local typing.
    pub fn typing_debounce(&self) -> Duration {
        self.typing.debounce()
    }

    /// Environment.
    pub fn env(&self) -> &E {
        &self.env
    }
}
