//! Application state machine.
//!
//! [`App`] owns what only the user interface cares about: which screen is
//! shown, the composer buffer and cursor, scrollback, window focus and the
//! status line. Everything synchronized with the relay lives in the session.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.

use relaychat_client::{Identity, SessionNotice};

use crate::{AppAction, AppEvent, KeyInput, compose};

/// Lines scrolled per page key.
const PAGE: usize = 10;

/// Screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Username prompt.
    Login,
    /// Room view with composer.
    Chat,
}

/// Application state machine.
#[derive(Debug, Clone)]
pub struct App {
    screen: Screen,
    /// Relay URL, shown in the status bar.
    server_url: String,
    /// Room entered on first connect.
    default_room: String,
    /// Identity of the last login. `None` until the user logs in.
    identity: Option<Identity>,
    /// Composer contents.
    input: String,
    /// Cursor position in characters.
    cursor: usize,
    /// Lines scrolled back from the newest message.
    scroll: usize,
    /// Upper bound of `scroll`; keeps the oldest message on screen.
    scroll_limit: usize,
    terminal_size: (u16, u16),
    focused: bool,
    status_message: Option<String>,
}

impl App {
    /// Create an App showing the login screen.
    pub fn new(server_url: impl Into<String>, default_room: impl Into<String>) -> Self {
        Self {
            screen: Screen::Login,
            server_url: server_url.into(),
            default_room: default_room.into(),
            identity: None,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            scroll_limit: 0,
            terminal_size: (80, 24),
            focused: true,
            status_message: None,
        }
    }

    /// Create an App already logged in as `identity`.
    ///
    /// The runtime connects immediately on start.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.default_room.clone_from(&identity.room);
        self.identity = Some(identity);
        self.screen = Screen::Chat;
        self
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Focus(focused) => {
                self.focused = focused;
                vec![]
            },
            AppEvent::Key(key) => self.key(key),
        }
    }

    fn key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => vec![AppAction::Quit],
            KeyInput::Enter => self.submit(),
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
                self.edited()
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return vec![];
                }
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.input.remove(at);
                self.edited()
            },
            KeyInput::Delete => {
                if self.cursor >= self.input.chars().count() {
                    return vec![];
                }
                let at = self.byte_offset(self.cursor);
                self.input.remove(at);
                self.edited()
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.cursor = (self.cursor + 1).min(self.input.chars().count());
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.cursor = self.input.chars().count();
                vec![AppAction::Render]
            },
            KeyInput::PageUp => {
                self.scroll = self.scroll.saturating_add(PAGE).min(self.scroll_limit);
                vec![AppAction::Render]
            },
            KeyInput::PageDown => {
                self.scroll = self.scroll.saturating_sub(PAGE);
                vec![AppAction::Render]
            },
            KeyInput::Tab => match self.screen {
                Screen::Chat => vec![AppAction::NextRoom, AppAction::Render],
                Screen::Login => vec![],
            },
        }
    }

    /// Composer changed. Chat text counts as typing; slash commands don't.
    fn edited(&mut self) -> Vec<AppAction> {
        if self.screen == Screen::Chat && !self.input.starts_with('/') {
            vec![AppAction::Keystroke, AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input.char_indices().nth(chars).map_or(self.input.len(), |(i, _)| i)
    }

    fn take_input(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    fn submit(&mut self) -> Vec<AppAction> {
        match self.screen {
            Screen::Login => self.submit_login(),
            Screen::Chat => {
                let input = self.take_input();
                let mut actions = match input.strip_prefix('/') {
                    Some(command) => self.command(command),
                    None => self.submit_message(&input),
                };
                actions.push(AppAction::Render);
                actions
            },
        }
    }

    fn submit_login(&mut self) -> Vec<AppAction> {
        let name = match compose::username(&self.input) {
            Ok(name) => name.to_string(),
            Err(err) => {
                self.status_message = Some(err.to_string());
                return vec![AppAction::Render];
            },
        };

        self.take_input();
        let identity = Identity::new(name, self.default_room.clone());
        self.identity = Some(identity.clone());
        self.screen = Screen::Chat;
        self.status_message = None;

        vec![AppAction::Connect { identity }, AppAction::Render]
    }

    fn submit_message(&mut self, input: &str) -> Vec<AppAction> {
        match compose::message(input) {
            Ok(text) => {
                self.scroll = 0;
                vec![AppAction::SendMessage { text: text.to_string() }]
            },
            Err(compose::ComposeError::Empty(_)) => vec![],
            Err(err) => {
                self.status_message = Some(err.to_string());
                vec![]
            },
        }
    }

    fn command(&mut self, line: &str) -> Vec<AppAction> {
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match name {
            "join" => match compose::room_name(rest) {
                Ok(room) => vec![AppAction::JoinRoom { room: room.to_string() }],
                Err(_) => self.usage("/join <room>"),
            },
            "msg" => {
                let Some((to, text)) = rest.split_once(' ') else {
                    return self.usage("/msg <user> <text>");
                };
                match compose::message(text) {
                    Ok(text) => vec![AppAction::SendPrivate { to: to.to_string(), text: text.to_string() }],
                    Err(err) => {
                        self.status_message = Some(err.to_string());
                        vec![]
                    },
                }
            },
            "older" => vec![AppAction::LoadOlder],
            "attach" if !rest.is_empty() => vec![AppAction::Attach { path: rest.to_string() }],
            "attach" => self.usage("/attach <path>"),
            "connect" => match &self.identity {
                Some(identity) => vec![AppAction::Connect { identity: identity.clone() }],
                None => vec![],
            },
            "disconnect" => vec![AppAction::Disconnect],
            "quit" => vec![AppAction::Quit],
            other => {
                self.status_message = Some(format!("Unknown command: /{other}"));
                vec![]
            },
        }
    }

    fn usage(&mut self, usage: &str) -> Vec<AppAction> {
        self.status_message = Some(format!("Usage: {usage}"));
        vec![]
    }

    /// Surface a session notice on the status line.
    pub fn notice(&mut self, notice: &SessionNotice) {
        self.status_message = Some(match notice {
            SessionNotice::JoinTimedOut { room } => format!("Could not join #{room}"),
            SessionNotice::ReconnectFailed => "Reconnection failed. Type /connect to retry".into(),
            SessionNotice::RoomSwitched { room } => {
                self.scroll = 0;
                format!("Joined #{room}")
            },
        });
    }

    /// Bound scrollback to a log of `lines` entries.
    pub fn set_log_len(&mut self, lines: usize) {
        self.scroll_limit = lines.saturating_sub(1);
        self.scroll = self.scroll.min(self.scroll_limit);
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Screen currently shown.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Relay URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Identity of the last login.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Composer contents.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Lines scrolled back from the newest message.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// True while the host window has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_app() -> App {
        App::new("ws://localhost:5000", "general").with_identity(Identity::new("alice", "general"))
    }

    fn type_str(app: &mut App, text: &str) -> Vec<AppAction> {
        text.chars().flat_map(|c| app.handle(AppEvent::Key(KeyInput::Char(c)))).collect()
    }

    fn enter(app: &mut App) -> Vec<AppAction> {
        app.handle(AppEvent::Key(KeyInput::Enter))
    }

    #[test]
    fn login_connects_with_default_room() {
        let mut app = App::new("ws://localhost:5000", "general");
        type_str(&mut app, "  alice ");

        let actions = enter(&mut app);

        assert_eq!(actions, vec![
            AppAction::Connect { identity: Identity::new("alice", "general") },
            AppAction::Render,
        ]);
        assert_eq!(app.screen(), Screen::Chat);
        assert_eq!(app.input(), "");
    }

    #[test]
    fn login_rejects_long_names() {
        let mut app = App::new("ws://localhost:5000", "general");
        type_str(&mut app, &"a".repeat(21));

        assert_eq!(enter(&mut app), vec![AppAction::Render]);
        assert_eq!(app.screen(), Screen::Login);
        assert!(app.status_message().is_some());
    }

    #[test]
    fn typing_chat_text_emits_keystrokes() {
        let mut app = chat_app();
        let actions = type_str(&mut app, "hi");

        assert_eq!(actions.iter().filter(|a| **a == AppAction::Keystroke).count(), 2);
    }

    #[test]
    fn typing_commands_is_not_typing() {
        let mut app = chat_app();
        let actions = type_str(&mut app, "/join x");

        assert!(!actions.contains(&AppAction::Keystroke));
    }

    #[test]
    fn enter_sends_trimmed_message() {
        let mut app = chat_app();
        type_str(&mut app, "  hello  ");

        assert_eq!(enter(&mut app), vec![
            AppAction::SendMessage { text: "hello".into() },
            AppAction::Render
        ]);
        assert_eq!(app.input(), "");
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn blank_enter_sends_nothing() {
        let mut app = chat_app();
        type_str(&mut app, "   ");

        assert_eq!(enter(&mut app), vec![AppAction::Render]);
    }

    #[test]
    fn slash_commands() {
        let cases = [
            ("/join  random ", AppAction::JoinRoom { room: "random".into() }),
            ("/msg bob hi there", AppAction::SendPrivate { to: "bob".into(), text: "hi there".into() }),
            ("/older", AppAction::LoadOlder),
            ("/attach notes.txt", AppAction::Attach { path: "notes.txt".into() }),
            ("/disconnect", AppAction::Disconnect),
            ("/connect", AppAction::Connect { identity: Identity::new("alice", "general") }),
            ("/quit", AppAction::Quit),
        ];

        for (line, expected) in cases {
            let mut app = chat_app();
            type_str(&mut app, line);
            assert_eq!(enter(&mut app), vec![expected, AppAction::Render], "{line}");
        }
    }

    #[test]
    fn unknown_command_sets_status() {
        let mut app = chat_app();
        type_str(&mut app, "/dance");

        assert_eq!(enter(&mut app), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("Unknown command: /dance"));
    }

    #[test]
    fn cursor_editing_handles_multibyte() {
        let mut app = chat_app();
        type_str(&mut app, "héllo");
        app.handle(AppEvent::Key(KeyInput::Home));
        app.handle(AppEvent::Key(KeyInput::Right));
        app.handle(AppEvent::Key(KeyInput::Delete));

        assert_eq!(app.input(), "hllo");

        app.handle(AppEvent::Key(KeyInput::End));
        app.handle(AppEvent::Key(KeyInput::Backspace));
        assert_eq!(app.input(), "hll");
        assert_eq!(app.cursor(), 3);
    }

    #[test]
    fn tab_cycles_rooms_only_in_chat() {
        let mut chat = chat_app();
        assert_eq!(chat.handle(AppEvent::Key(KeyInput::Tab)), vec![
            AppAction::NextRoom,
            AppAction::Render
        ]);

        let mut login = App::new("ws://localhost:5000", "general");
        assert!(login.handle(AppEvent::Key(KeyInput::Tab)).is_empty());
    }

    #[test]
    fn scrollback_stops_at_oldest_message() {
        let mut app = chat_app();
        app.set_log_len(16);

        for _ in 0..5 {
            app.handle(AppEvent::Key(KeyInput::PageUp));
        }
        assert_eq!(app.scroll(), 15);

        app.handle(AppEvent::Key(KeyInput::PageDown));
        assert_eq!(app.scroll(), 5);

        app.set_log_len(3);
        assert_eq!(app.scroll(), 2);

        app.set_log_len(0);
        app.handle(AppEvent::Key(KeyInput::PageUp));
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn focus_is_tracked() {
        let mut app = chat_app();
        app.handle(AppEvent::Focus(false));
        assert!(!app.is_focused());
    }
}
