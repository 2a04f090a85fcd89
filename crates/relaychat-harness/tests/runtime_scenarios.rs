//! End-to-end tests of the runtime loop on the simulation driver.
//!
//! # Test Strategy
//!
//! Each test simulates what a user does in the terminal:
//! 1. Type a username, a message or a slash command
//! 2. Let the production `Runtime` route it through App and Session
//! 3. Inject the server pushes a relay would answer with
//! 4. Verify the frames sent, the status line and the session state
//!
//! Every render checks the standard invariants.

use relaychat_app::{App, AppEvent, FileInfo, KeyInput, Notification, Runtime, Screen, notify};
use relaychat_client::{ConnectionState, Epoch, Identity, Session, SessionConfig};
use relaychat_harness::{InvariantRegistry, SimDriver, SimEnv, frames};
use relaychat_proto::{ClientCommand, Frame, UserId};

const URL: &str = "ws://localhost:5000";

type SimRuntime = Runtime<SimDriver, SimEnv>;

/// Runtime plus a probe sharing the driver's state.
fn runtime(app: App) -> (SimRuntime, SimDriver) {
    let env = SimEnv::with_seed(42);
    let driver = SimDriver::new(env.clone()).with_invariants(InvariantRegistry::standard());
    let probe = driver.clone();
    let session = Session::new(env, SessionConfig::default());
    (Runtime::new(driver, app, session), probe)
}

/// Step until every injected input has been processed.
async fn settle(runtime: &mut SimRuntime) {
    while runtime.driver().has_pending() {
        runtime.step().await.unwrap();
    }
}

/// Step `n` times with nothing queued; each step advances the clock.
async fn idle(runtime: &mut SimRuntime, n: usize) {
    for _ in 0..n {
        runtime.step().await.unwrap();
    }
}

fn commands(frames: Vec<Frame>) -> Vec<ClientCommand> {
    frames.iter().map(|frame| ClientCommand::from_frame(frame).unwrap()).collect()
}

/// Alice connected to #general with bob present. Outgoing frames drained.
async fn logged_in() -> (SimRuntime, SimDriver) {
    let app = App::new(URL, "general").with_identity(Identity::new("alice", "general"));
    let (mut runtime, probe) = runtime(app);
    runtime.start().await.unwrap();

    probe.inject_frame(frames::connect());
    probe.inject_frame(frames::message_history(vec![]));
    probe.inject_frame(frames::user_list(&[(1, "alice"), (2, "bob")]));
    settle(&mut runtime).await;
    probe.take_outgoing();

    (runtime, probe)
}

#[tokio::test]
async fn login_opens_transport_and_presents_identity() {
    let (mut runtime, probe) = runtime(App::new(URL, "general"));
    runtime.start().await.unwrap();
    assert!(probe.opened().is_empty());

    probe.inject_line("alice");
    settle(&mut runtime).await;

    assert_eq!(runtime.app().screen(), Screen::Chat);
    assert_eq!(probe.opened(), vec![Epoch::new(1)]);
    assert_eq!(runtime.session().connection_state(), ConnectionState::Connecting);
    assert!(probe.take_outgoing().is_empty());

    probe.inject_frame(frames::connect());
    settle(&mut runtime).await;

    assert_eq!(runtime.session().connection_state(), ConnectionState::Connected);
    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::UserJoin { username: "alice".into(), room: "general".into() }]
    );
}

#[tokio::test]
async fn blank_login_stays_on_login_screen() {
    let (mut runtime, probe) = runtime(App::new(URL, "general"));
    runtime.start().await.unwrap();

    probe.inject_line("   ");
    settle(&mut runtime).await;

    assert_eq!(runtime.app().screen(), Screen::Login);
    assert!(runtime.app().status_message().is_some());
    assert!(probe.opened().is_empty());
}

#[tokio::test]
async fn preset_identity_connects_on_start() {
    let app = App::new(URL, "general").with_identity(Identity::new("alice", "help"));
    let (mut runtime, probe) = runtime(app);

    runtime.start().await.unwrap();

    assert_eq!(probe.opened(), vec![Epoch::new(1)]);
    assert_eq!(runtime.session().active_room(), "help");
    assert!(probe.renders() >= 1);
}

/// Typing a message and pressing Enter.
///
/// - First keystroke starts typing
/// - Enter sends the trimmed text and stops typing at once
#[tokio::test]
async fn chat_line_sends_message_between_typing_signals() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_line("hello there ");
    settle(&mut runtime).await;

    assert_eq!(
        commands(probe.take_outgoing()),
        vec![
            ClientCommand::Typing(true),
            ClientCommand::SendMessage { message: "hello there".into() },
            ClientCommand::Typing(false),
        ]
    );
    assert_eq!(runtime.app().input(), "");
}

#[tokio::test]
async fn idle_composer_stops_typing_after_debounce() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_text("hi");
    settle(&mut runtime).await;
    assert_eq!(commands(probe.take_outgoing()), vec![ClientCommand::Typing(true)]);

    // 100ms per idle step, one second debounce
    idle(&mut runtime, 5).await;
    assert!(probe.take_outgoing().is_empty());
    assert!(runtime.session().is_typing());

    idle(&mut runtime, 10).await;
    assert_eq!(commands(probe.take_outgoing()), vec![ClientCommand::Typing(false)]);
    assert!(!runtime.session().is_typing());
}

#[tokio::test]
async fn slash_commands_do_not_count_as_typing() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_text("/older");
    settle(&mut runtime).await;

    assert!(probe.take_outgoing().is_empty());
    assert!(!runtime.session().is_typing());
}

#[tokio::test]
async fn private_message_resolves_username() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_line("/msg bob see you at 5");
    settle(&mut runtime).await;

    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::PrivateMessage { to: UserId::Number(2), message: "see you at 5".into() }]
    );
}

#[tokio::test]
async fn private_message_to_absent_user_sets_status() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_line("/msg zed hi");
    settle(&mut runtime).await;

    assert!(probe.take_outgoing().is_empty());
    assert_eq!(runtime.app().status_message(), Some("No user named zed"));
}

#[tokio::test]
async fn join_command_switches_on_confirmation() {
    let (mut runtime, probe) = logged_in().await;
    probe.inject_frame(frames::receive_message(1, "bob", "hi", 1_700_000_000));
    settle(&mut runtime).await;

    probe.inject_line("/join random");
    settle(&mut runtime).await;
    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::JoinRoom { room_name: "random".into() }]
    );
    assert_eq!(runtime.session().active_room(), "general");
    assert_eq!(runtime.session().messages().len(), 1);

    probe.inject_frame(frames::room_joined("random"));
    settle(&mut runtime).await;

    assert_eq!(runtime.session().active_room(), "random");
    assert!(runtime.session().messages().is_empty());
    assert_eq!(runtime.app().status_message(), Some("Joined #random"));
}

#[tokio::test]
async fn unconfirmed_join_times_out() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_line("/join random");
    settle(&mut runtime).await;
    probe.take_outgoing();

    // Ten seconds of idle ticks
    idle(&mut runtime, 110).await;

    assert_eq!(runtime.session().pending_join(), None);
    assert_eq!(runtime.session().active_room(), "general");
    assert_eq!(runtime.app().status_message(), Some("Could not join #random"));
}

#[tokio::test]
async fn tab_cycles_to_next_known_room() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_event(AppEvent::Key(KeyInput::Tab));
    settle(&mut runtime).await;

    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::JoinRoom { room_name: "random".into() }]
    );
}

#[tokio::test]
async fn attachment_is_sent_as_label() {
    let (mut runtime, probe) = logged_in().await;
    probe.add_file("cat.png", FileInfo { name: "cat.png".into(), size: 2048, mime: "image/png".into() });

    probe.inject_line("/attach cat.png");
    settle(&mut runtime).await;

    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::SendMessage { message: "[FILE] cat.png (2.0KB)".into() }]
    );
}

#[tokio::test]
async fn rejected_attachments_set_status() {
    let (mut runtime, probe) = logged_in().await;
    probe.add_file("movie.mp4", FileInfo { name: "movie.mp4".into(), size: 1024, mime: "video/mp4".into() });

    probe.inject_line("/attach movie.mp4");
    probe.inject_line("/attach missing.txt");
    settle(&mut runtime).await;

    assert!(probe.take_outgoing().is_empty());
    let status = runtime.app().status_message().unwrap_or_default();
    assert!(status.starts_with("Cannot attach missing.txt"), "status: {status}");
}

/// Desktop notifications only while unfocused and only for other users.
#[tokio::test]
async fn notifications_follow_focus_and_sender() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_frame(frames::receive_message(1, "bob", "while focused", 1_700_000_000));
    settle(&mut runtime).await;
    assert!(probe.take_notifications().is_empty());

    probe.inject_event(AppEvent::Focus(false));
    probe.inject_frame(frames::receive_message(2, "alice", "my own", 1_700_000_001));
    probe.inject_frame(frames::user_joined("carol"));
    probe.inject_frame(frames::private_message(3, "bob", "psst", 1_700_000_002));
    settle(&mut runtime).await;

    assert_eq!(
        probe.take_notifications(),
        vec![Notification {
            title: "New message from bob".into(),
            body: "psst".into(),
            tag: notify::NOTIFICATION_TAG,
        }]
    );
}

/// Loss, two retries and a successful reconnect, invariants checked on every
/// render along the way.
#[tokio::test]
async fn reconnect_cycle_rejoins_active_room() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_frame(frames::disconnect("transport close"));
    probe.inject_frame(frames::reconnect_attempt(1));
    probe.inject_frame(frames::reconnect_attempt(2));
    settle(&mut runtime).await;
    assert_eq!(runtime.session().connection_state(), ConnectionState::Reconnecting);
    assert_eq!(runtime.session().reconnection_attempts(), 2);

    probe.inject_frame(frames::connect());
    settle(&mut runtime).await;

    assert_eq!(runtime.session().connection_state(), ConnectionState::Connected);
    assert_eq!(runtime.session().reconnection_attempts(), 0);
    assert_eq!(
        commands(probe.take_outgoing()),
        vec![ClientCommand::UserJoin { username: "alice".into(), room: "general".into() }]
    );
}

#[tokio::test]
async fn failed_reconnect_recovers_with_connect_command() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_frame(frames::disconnect("transport close"));
    probe.inject_frame(frames::reconnect_attempt(1));
    probe.inject_frame(frames::reconnect_failed());
    settle(&mut runtime).await;

    assert_eq!(runtime.session().connection_state(), ConnectionState::Failed);
    assert_eq!(runtime.app().status_message(), Some("Reconnection failed. Type /connect to retry"));

    probe.inject_line("/connect");
    settle(&mut runtime).await;

    assert_eq!(probe.opened(), vec![Epoch::new(1), Epoch::new(2)]);
    assert_eq!(runtime.session().connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn disconnect_command_closes_and_blocks_sends() {
    let (mut runtime, probe) = logged_in().await;
    let old = runtime.session().epoch();

    probe.inject_line("/disconnect");
    settle(&mut runtime).await;
    assert_eq!(probe.closes(), 1);
    assert_eq!(probe.open_epoch(), None);
    assert_eq!(runtime.session().connection_state(), ConnectionState::Disconnected);

    probe.inject_line("hello");
    settle(&mut runtime).await;
    assert!(probe.take_outgoing().is_empty());
    assert_eq!(runtime.app().status_message(), Some("Not connected"));

    // A frame that was in flight on the closed connection
    probe.inject_frame_at(old, frames::receive_message(9, "bob", "late", 1_700_000_000));
    settle(&mut runtime).await;
    assert!(runtime.session().messages().is_empty());
}

#[tokio::test]
async fn scrollback_is_bounded_by_the_log() {
    let (mut runtime, probe) = logged_in().await;
    for id in 1..=3 {
        probe.inject_frame(frames::receive_message(id, "bob", "hi", 1_700_000_000));
    }
    settle(&mut runtime).await;

    for _ in 0..4 {
        probe.inject_event(AppEvent::Key(KeyInput::PageUp));
    }
    settle(&mut runtime).await;
    assert_eq!(runtime.app().scroll(), 2);

    // A shorter history snapshot pulls the view back in range
    probe.inject_frame(frames::message_history(vec![frames::chat_json(
        7,
        "bob",
        "only",
        1_600_000_000,
    )]));
    settle(&mut runtime).await;
    assert_eq!(runtime.app().scroll(), 0);
}

#[tokio::test]
async fn quit_tears_down_and_stops_driver() {
    let (mut runtime, probe) = logged_in().await;

    probe.inject_event(AppEvent::Key(KeyInput::Esc));
    let quit = runtime.step().await.unwrap();
    assert!(quit);

    runtime.shutdown().await.unwrap();
    assert!(probe.is_stopped());
    assert_eq!(probe.closes(), 1);
}

#[tokio::test]
async fn run_loop_exits_on_quit() {
    let app = App::new(URL, "general").with_identity(Identity::new("alice", "general"));
    let (runtime, probe) = runtime(app);
    probe.inject_event(AppEvent::Key(KeyInput::Esc));

    runtime.run().await.unwrap();

    assert_eq!(probe.opened(), vec![Epoch::new(1)]);
    assert!(probe.is_stopped());
}
