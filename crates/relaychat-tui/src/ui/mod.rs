//! UI rendering
//!
//! Rendering functions that convert App and session state into terminal output
//! using ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod login;
mod rooms;
mod status;
mod users;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};
use relaychat_app::{App, Screen};
use relaychat_client::{Environment, Session};

/// Render the entire UI.
pub fn render<E: Environment>(frame: &mut Frame, app: &App, session: &Session<E>) {
    let area = frame.area();
    match app.screen() {
        Screen::Login => login::render(frame, app, area),
        Screen::Chat => render_chat_screen(frame, app, session),
    }
}

fn render_chat_screen<E: Environment>(frame: &mut Frame, app: &App, session: &Session<E>) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const TYPING_HEIGHT: u16 = 1;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(TYPING_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, typing_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, session, app, *main_area);
    chat::render_typing(frame, session, *typing_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, session, *status_area);
}

/// Render the main area (rooms sidebar, chat, users sidebar).
fn render_main_area<E: Environment>(frame: &mut Frame, session: &Session<E>, app: &App, area: Rect) {
    const ROOM_SIDEBAR_WIDTH: u16 = 16;
    const USER_SIDEBAR_WIDTH: u16 = 18;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(ROOM_SIDEBAR_WIDTH),
            Constraint::Min(CHAT_AREA_MIN_WIDTH),
            Constraint::Length(USER_SIDEBAR_WIDTH),
        ])
        .split(area);

    let [rooms_area, chat_area, users_area] = chunks.as_ref() else {
        return;
    };

    rooms::render(frame, session, *rooms_area);
    chat::render(frame, app, session, *chat_area);
    users::render(frame, session, *users_area);
}
