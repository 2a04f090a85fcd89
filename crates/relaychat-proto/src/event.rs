//! Event names and typed events for both directions.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    Frame, Message, PresenceNotice, User, UserId,
    errors::{ProtocolError, Result},
    payloads::{
        chat::{LoadMessages, PrivateMessageRequest, SendMessage},
        session::{Disconnect, ReconnectAttempt, RoomJoined, UserJoin},
    },
};

/// Names of server-to-client notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServerEventName {
    /// Transport connected (or reconnected).
    Connect,
    /// Transport lost.
    Disconnect,
    /// Transport is retrying.
    ReconnectAttempt,
    /// Transport gave up retrying.
    ReconnectFailed,
    /// Room broadcast.
    ReceiveMessage,
    /// Direct message.
    PrivateMessage,
    /// History snapshot for the active room.
    MessageHistory,
    /// Presence snapshot.
    UserList,
    /// A user entered the room.
    UserJoined,
    /// A user left the room.
    UserLeft,
    /// Typing snapshot.
    TypingUsers,
    /// Room switch confirmed.
    RoomJoined,
}

impl ServerEventName {
    /// Every server event name.
    pub const ALL: [Self; 12] = [
        Self::Connect,
        Self::Disconnect,
        Self::ReconnectAttempt,
        Self::ReconnectFailed,
        Self::ReceiveMessage,
        Self::PrivateMessage,
        Self::MessageHistory,
        Self::UserList,
        Self::UserJoined,
        Self::UserLeft,
        Self::TypingUsers,
        Self::RoomJoined,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::ReconnectAttempt => "reconnect_attempt",
            Self::ReconnectFailed => "reconnect_failed",
            Self::ReceiveMessage => "receive_message",
            Self::PrivateMessage => "private_message",
            Self::MessageHistory => "message_history",
            Self::UserList => "user_list",
            Self::UserJoined => "user_joined",
            Self::UserLeft => "user_left",
            Self::TypingUsers => "typing_users",
            Self::RoomJoined => "room_joined",
        }
    }

    /// Look up a wire name. `None` if unknown.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == name)
    }

    /// True for the notifications synthesized by the transport.
    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::Connect | Self::Disconnect | Self::ReconnectAttempt | Self::ReconnectFailed
        )
    }
}

impl fmt::Display for ServerEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of client-to-server commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEventName {
    /// Present identity and initial room.
    UserJoin,
    /// Broadcast to the room.
    SendMessage,
    /// Direct message.
    PrivateMessage,
    /// Local typing state.
    Typing,
    /// Request a room switch.
    JoinRoom,
    /// Request older history.
    LoadMessages,
}

impl ClientEventName {
    /// Every client event name.
    pub const ALL: [Self; 6] = [
        Self::UserJoin,
        Self::SendMessage,
        Self::PrivateMessage,
        Self::Typing,
        Self::JoinRoom,
        Self::LoadMessages,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserJoin => "user_join",
            Self::SendMessage => "send_message",
            Self::PrivateMessage => "private_message",
            Self::Typing => "typing",
            Self::JoinRoom => "join_room",
            Self::LoadMessages => "load_messages",
        }
    }

    /// Look up a wire name. `None` if unknown.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == name)
    }
}

impl fmt::Display for ClientEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded server-to-client notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Transport connected.
    Connect,
    /// Transport lost.
    Disconnect {
        /// Why the transport closed.
        reason: String,
    },
    /// Transport retry in progress.
    ReconnectAttempt {
        /// One-based attempt number.
        attempt: u32,
    },
    /// Transport gave up.
    ReconnectFailed,
    /// Room broadcast.
    ReceiveMessage(Message),
    /// Direct message.
    PrivateMessage(Message),
    /// History snapshot, oldest first.
    MessageHistory(Vec<Message>),
    /// Presence snapshot.
    UserList(Vec<User>),
    /// A user entered.
    UserJoined(PresenceNotice),
    /// A user left.
    UserLeft(PresenceNotice),
    /// Usernames currently typing.
    TypingUsers(Vec<String>),
    /// Room switch confirmed.
    RoomJoined {
        /// Confirmed room.
        room: String,
    },
}

impl ServerEvent {
    /// Wire name of this event.
    pub fn name(&self) -> ServerEventName {
        match self {
            Self::Connect => ServerEventName::Connect,
            Self::Disconnect { .. } => ServerEventName::Disconnect,
            Self::ReconnectAttempt { .. } => ServerEventName::ReconnectAttempt,
            Self::ReconnectFailed => ServerEventName::ReconnectFailed,
            Self::ReceiveMessage(_) => ServerEventName::ReceiveMessage,
            Self::PrivateMessage(_) => ServerEventName::PrivateMessage,
            Self::MessageHistory(_) => ServerEventName::MessageHistory,
            Self::UserList(_) => ServerEventName::UserList,
            Self::UserJoined(_) => ServerEventName::UserJoined,
            Self::UserLeft(_) => ServerEventName::UserLeft,
            Self::TypingUsers(_) => ServerEventName::TypingUsers,
            Self::RoomJoined { .. } => ServerEventName::RoomJoined,
        }
    }

    /// Decode a frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownEvent` if the name is not a server event
    /// - `ProtocolError::InvalidPayload` / `MissingField` if the payload is
    ///   malformed
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let name = ServerEventName::parse(&frame.event)
            .ok_or_else(|| ProtocolError::UnknownEvent(frame.event.clone()))?;

        let event = match name {
            ServerEventName::Connect => Self::Connect,
            ServerEventName::Disconnect => {
                // Transports may close without giving a reason
                let reason = if frame.data.is_null() {
                    String::new()
                } else {
                    frame.payload::<Disconnect>()?.into_reason()
                };
                Self::Disconnect { reason }
            },
            ServerEventName::ReconnectAttempt => {
                Self::ReconnectAttempt { attempt: frame.payload::<ReconnectAttempt>()?.attempt() }
            },
            ServerEventName::ReconnectFailed => Self::ReconnectFailed,
            ServerEventName::ReceiveMessage => Self::ReceiveMessage(frame.payload()?),
            ServerEventName::PrivateMessage => Self::PrivateMessage(frame.payload()?),
            ServerEventName::MessageHistory => Self::MessageHistory(frame.payload()?),
            ServerEventName::UserList => Self::UserList(frame.payload()?),
            ServerEventName::UserJoined => Self::UserJoined(frame.payload()?),
            ServerEventName::UserLeft => Self::UserLeft(frame.payload()?),
            ServerEventName::TypingUsers => Self::TypingUsers(frame.payload()?),
            ServerEventName::RoomJoined => {
                Self::RoomJoined { room: frame.payload::<RoomJoined>()?.into_room_name() }
            },
        };

        Ok(event)
    }

    /// Encode into a frame, using the bare form for scalar payloads.
    pub fn into_frame(self) -> Result<Frame> {
        let name = self.name().as_str();
        match self {
            Self::Connect | Self::ReconnectFailed => Ok(Frame::bare(name)),
            Self::Disconnect { reason } => Frame::new(name, &reason),
            Self::ReconnectAttempt { attempt } => Frame::new(name, &attempt),
            Self::ReceiveMessage(message) | Self::PrivateMessage(message) => {
                Frame::new(name, &message)
            },
            Self::MessageHistory(messages) => Frame::new(name, &messages),
            Self::UserList(users) => Frame::new(name, &users),
            Self::UserJoined(notice) | Self::UserLeft(notice) => Frame::new(name, &notice),
            Self::TypingUsers(users) => Frame::new(name, &users),
            Self::RoomJoined { room } => Frame::new(name, &room),
        }
    }
}

/// Client-to-server command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Present identity and initial room.
    UserJoin {
        /// Display name.
        username: String,
        /// Room to enter.
        room: String,
    },
    /// Broadcast to the active room.
    SendMessage {
        /// Message text.
        message: String,
    },
    /// Direct message.
    PrivateMessage {
        /// Addressee.
        to: UserId,
        /// Message text.
        message: String,
    },
    /// Local typing state.
    Typing(bool),
    /// Request a room switch.
    JoinRoom {
        /// Target room.
        room_name: String,
    },
    /// Request history older than `before`.
    LoadMessages {
        /// Room to page through.
        room: String,
        /// Upper bound (exclusive) on message timestamps.
        before: DateTime<Utc>,
    },
}

impl ClientCommand {
    /// Wire name of this command.
    pub fn name(&self) -> ClientEventName {
        match self {
            Self::UserJoin { .. } => ClientEventName::UserJoin,
            Self::SendMessage { .. } => ClientEventName::SendMessage,
            Self::PrivateMessage { .. } => ClientEventName::PrivateMessage,
            Self::Typing(_) => ClientEventName::Typing,
            Self::JoinRoom { .. } => ClientEventName::JoinRoom,
            Self::LoadMessages { .. } => ClientEventName::LoadMessages,
        }
    }

    /// Encode into a frame.
    pub fn into_frame(self) -> Result<Frame> {
        let name = self.name().as_str();
        match self {
            Self::UserJoin { username, room } => Frame::new(name, &UserJoin { username, room }),
            Self::SendMessage { message } => Frame::new(name, &SendMessage { message }),
            Self::PrivateMessage { to, message } => {
                Frame::new(name, &PrivateMessageRequest { to, message })
            },
            Self::Typing(is_typing) => Frame::new(name, &is_typing),
            Self::JoinRoom { room_name } => Frame::new(name, &room_name),
            Self::LoadMessages { room, before } => Frame::new(name, &LoadMessages { room, before }),
        }
    }

    /// Decode a frame (relay side and tests).
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let name = ClientEventName::parse(&frame.event)
            .ok_or_else(|| ProtocolError::UnknownEvent(frame.event.clone()))?;

        let command = match name {
            ClientEventName::UserJoin => {
                let UserJoin { username, room } = frame.payload()?;
                Self::UserJoin { username, room }
            },
            ClientEventName::SendMessage => {
                let SendMessage { message } = frame.payload()?;
                Self::SendMessage { message }
            },
            ClientEventName::PrivateMessage => {
                let PrivateMessageRequest { to, message } = frame.payload()?;
                Self::PrivateMessage { to, message }
            },
            ClientEventName::Typing => Self::Typing(frame.payload()?),
            ClientEventName::JoinRoom => {
                Self::JoinRoom { room_name: frame.payload::<RoomJoined>()?.into_room_name() }
            },
            ClientEventName::LoadMessages => {
                let LoadMessages { room, before } = frame.payload()?;
                Self::LoadMessages { room, before }
            },
        };

        Ok(command)
    }
}
