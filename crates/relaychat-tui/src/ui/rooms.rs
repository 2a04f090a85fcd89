//! Rooms sidebar
//!
//! Displays the known rooms, the active one highlighted.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use relaychat_client::{Environment, Session};

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const PENDING_MARKER: &str = "~";
const EMPTY_MARKER: &str = "";

enum RoomDisplayState {
    Active,
    Pending,
    Normal,
}

/// Render the rooms sidebar.
pub fn render<E: Environment>(frame: &mut Frame, session: &Session<E>, area: Rect) {
    let items: Vec<ListItem> = session
        .known_rooms()
        .iter()
        .map(|room| {
            let state = if room == session.active_room() {
                RoomDisplayState::Active
            } else if session.pending_join() == Some(room.as_str()) {
                RoomDisplayState::Pending
            } else {
                RoomDisplayState::Normal
            };

            let (prefix, suffix, style) = match state {
                RoomDisplayState::Active => (
                    ACTIVE_PREFIX,
                    EMPTY_MARKER,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                RoomDisplayState::Pending => {
                    (INACTIVE_PREFIX, PENDING_MARKER, Style::default().fg(Color::Cyan))
                },
                RoomDisplayState::Normal => (INACTIVE_PREFIX, EMPTY_MARKER, Style::default()),
            };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("#{room}"), style),
                Span::styled(suffix, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Rooms ");
    frame.render_widget(List::new(items).block(block), area);
}
