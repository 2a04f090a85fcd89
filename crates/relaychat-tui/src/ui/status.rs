//! Status bar
//!
//! Displays connection status, the relay address and transient messages.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use relaychat_app::App;
use relaychat_client::{ConnectionState, Environment, Session};

/// Render the status bar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App, session: &Session<E>, area: Rect) {
    let connection_status = match session.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ConnectionState::Reconnecting => Span::styled(
            format!("Reconnecting (attempt {})...", session.reconnection_attempts()),
            Style::default().fg(Color::Yellow),
        ),
        ConnectionState::Failed => Span::styled(
            "Connection failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let user = session.identity().map_or_else(String::new, |id| format!(" as {}", id.username));
    let info = format!(" | {}{user} | #{}", app.server_url(), session.active_room());

    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::styled(info, Style::default().fg(Color::Gray)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::White)));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
