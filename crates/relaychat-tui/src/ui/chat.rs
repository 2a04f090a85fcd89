//! Chat area
//!
//! Displays the message log of the active room and the typing line.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use relaychat_app::App;
use relaychat_client::{Environment, Session};
use relaychat_proto::Message;

const BORDER_SIZE: u16 = 2;
const TIME_FORMAT: &str = "%H:%M";

/// Render the chat area.
pub fn render<E: Environment>(frame: &mut Frame, app: &App, session: &Session<E>, area: Rect) {
    let title = match session.pending_join() {
        Some(pending) => format!(" #{} (joining #{pending}) ", session.active_room()),
        None => format!(" #{} ", session.active_room()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = if session.messages().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        session.messages().iter().map(|message| ListItem::new(message_line(message))).collect()
    };

    // Newest at the bottom; scroll counts lines back from the newest
    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let end = items.len().saturating_sub(app.scroll());
    let start = end.saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(start).take(end - start).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_line(message: &Message) -> Line<'static> {
    let time = message.timestamp().with_timezone(&chrono::Local).format(TIME_FORMAT).to_string();
    let time = Span::styled(format!("{time} "), Style::default().fg(Color::DarkGray));

    match message {
        Message::System(notice) => Line::from(vec![
            time,
            Span::styled(
                format!("* {}", notice.message),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Message::Chat(chat) => {
            let color = if chat.is_private { Color::Magenta } else { Color::Green };
            let mut spans = vec![
                time,
                Span::styled(
                    format!("<{}>", chat.sender),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ];
            if chat.is_private {
                spans.push(Span::styled("(private) ", Style::default().fg(Color::Magenta)));
            }
            spans.push(Span::raw(chat.message.clone()));
            Line::from(spans)
        },
    }
}

/// Render who else is typing.
pub fn render_typing<E: Environment>(frame: &mut Frame, session: &Session<E>, area: Rect) {
    let text = session.typing_summary().unwrap_or_default();
    let paragraph = Paragraph::new(format!(" {text}"))
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
    frame.render_widget(paragraph, area);
}
