//! Property-based tests for the App state machine.
//!
//! Arbitrary key sequences must never corrupt the composer, and submitted
//! text must always satisfy the composer rules.

use proptest::prelude::*;
use relaychat_app::{
    App, AppAction, AppEvent, KeyInput, Screen,
    compose::{MAX_MESSAGE_LEN, MAX_USERNAME_LEN},
};
use relaychat_client::Identity;

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        8 => prop::char::any().prop_filter("printable", |c| !c.is_control()).prop_map(KeyInput::Char),
        2 => Just(KeyInput::Char(' ')),
        1 => Just(KeyInput::Char('/')),
        2 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::PageUp),
        1 => Just(KeyInput::PageDown),
    ]
}

proptest! {
    #[test]
    fn prop_cursor_stays_in_bounds(keys in prop::collection::vec(key_strategy(), 0..200)) {
        let mut app = App::new("ws://localhost:5000", "general");

        for key in keys {
            app.handle(AppEvent::Key(key));
            prop_assert!(app.cursor() <= app.input().chars().count());
        }
    }

    #[test]
    fn prop_submissions_are_valid(keys in prop::collection::vec(key_strategy(), 0..300)) {
        let mut app = App::new("ws://localhost:5000", "general");

        for key in keys {
            for action in app.handle(AppEvent::Key(key)) {
                match action {
                    AppAction::Connect { identity } => {
                        prop_assert_eq!(identity.username.trim(), identity.username.as_str());
                        prop_assert!(!identity.username.is_empty());
                        prop_assert!(identity.username.chars().count() <= MAX_USERNAME_LEN);
                    },
                    AppAction::SendMessage { text } | AppAction::SendPrivate { text, .. } => {
                        prop_assert_eq!(text.trim(), text.as_str());
                        prop_assert!(!text.is_empty());
                        prop_assert!(text.chars().count() <= MAX_MESSAGE_LEN);
                    },
                    AppAction::JoinRoom { room } => {
                        prop_assert!(!room.is_empty());
                        prop_assert_eq!(room.trim(), room.as_str());
                    },
                    _ => {},
                }
            }
        }
    }

    #[test]
    fn prop_scroll_stays_within_log(
        lines in 0usize..40,
        keys in prop::collection::vec(key_strategy(), 0..100),
    ) {
        let mut app = App::new("ws://localhost:5000", "general");
        app.set_log_len(lines);

        for key in keys {
            app.handle(AppEvent::Key(key));
            prop_assert!(app.scroll() <= lines.saturating_sub(1));
        }
    }

    #[test]
    fn prop_login_screen_never_types(keys in prop::collection::vec(key_strategy(), 0..100)) {
        let mut app = App::new("ws://localhost:5000", "general");

        for key in keys {
            let was_login = app.screen() == Screen::Login;
            let actions = app.handle(AppEvent::Key(key));
            if was_login {
                prop_assert!(!actions.contains(&AppAction::Keystroke));
            }
        }
    }
}

#[test]
fn preset_identity_starts_in_chat() {
    let app = App::new("ws://localhost:5000", "general")
        .with_identity(Identity::new("alice", "random"));

    assert_eq!(app.screen(), Screen::Chat);
    assert_eq!(app.identity().map(|i| i.room.as_str()), Some("random"));
}
