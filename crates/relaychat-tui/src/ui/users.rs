//! Users sidebar

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use relaychat_client::{Environment, Session};

/// Render the users present in the active room.
pub fn render<E: Environment>(frame: &mut Frame, session: &Session<E>, area: Rect) {
    let me = session.identity().map(|identity| identity.username.as_str());

    let items: Vec<ListItem> = session
        .users()
        .iter()
        .map(|user| {
            let typing = session.typing_users().contains(&user.username);
            let style = if me == Some(user.username.as_str()) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(vec![
                Span::styled(user.username.clone(), style),
                Span::styled(if typing { " ..." } else { "" }, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = format!(" Users ({}) ", session.users().len());
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(List::new(items).block(block), area);
}
