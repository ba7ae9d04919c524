use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::Profile;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, profile: &Profile, now: DateTime<Local>) {
    let title_line = Line::from(vec![
        Span::styled("  🔥 ", theme::ember()),
        Span::styled("focusforge", theme::ember().add_modifier(Modifier::BOLD)),
    ]);

    let meta_line = Line::from(vec![
        Span::styled(profile.rank(), theme::gold()),
        Span::styled(format!("  ·  Level {}", profile.level()), theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(now.format("%A, %b %d").to_string(), theme::dim()),
    ]);

    let text = vec![title_line, Line::from(""), meta_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::ember().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
