use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::Boost;
use crate::tui::theme;
use crate::utils::format::format_remaining;

pub fn render<'b>(
    frame: &mut Frame,
    area: Rect,
    active: impl Iterator<Item = &'b Boost>,
    multiplier: u32,
    now: DateTime<Utc>,
) {
    let title = if multiplier > 1 {
        format!(" Boosts · x{} XP ", multiplier)
    } else {
        " Boosts ".to_string()
    };
    let block = Block::default()
        .title(Span::styled(title, theme::ember()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    for boost in active {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  ⚡ {}", boost.name),
                theme::gold().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} left", format_remaining(boost.remaining_secs(now))),
                theme::dim(),
            ),
        ]));
    }
    if lines.len() == 1 {
        lines.push(Line::from(Span::styled("  No active boosts", theme::dim())));
        lines.push(Line::from(Span::styled("  [b] visit the shop", theme::dim())));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
