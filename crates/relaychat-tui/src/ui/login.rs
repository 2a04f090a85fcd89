//! Login screen
//!
//! Username prompt shown until the first connect.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use relaychat_app::App;

const BOX_WIDTH: u16 = 48;
const BOX_HEIGHT: u16 = 7;
const PROMPT: &str = "Username: ";

/// Render the login prompt centered in `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [row] = Layout::vertical([Constraint::Length(BOX_HEIGHT)]).flex(Flex::Center).areas(area);
    let [dialog] = Layout::horizontal([Constraint::Length(BOX_WIDTH)]).flex(Flex::Center).areas(row);

    let status = app.status_message().map_or_else(
        || Line::from(Span::styled("Press Enter to join, Esc to quit", Style::default().fg(Color::DarkGray))),
        |message| Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
    );

    let lines = vec![
        Line::from(Span::styled(app.server_url().to_string(), Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(vec![
            Span::styled(PROMPT, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.input().to_string()),
        ]),
        Line::from(""),
        status,
    ];

    let block = Block::default().borders(Borders::ALL).title(" relaychat ");
    frame.render_widget(Paragraph::new(lines).block(block), dialog);

    let cursor_x = dialog
        .x
        .saturating_add(1 + PROMPT.len() as u16)
        .saturating_add(app.cursor() as u16)
        .min(dialog.right().saturating_sub(2));
    frame.set_cursor_position((cursor_x, dialog.y.saturating_add(3)));
}
