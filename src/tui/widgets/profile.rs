use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::models::profile::XP_PER_LEVEL;
use crate::models::Profile;
use crate::tui::theme;
use crate::utils::format::format_minutes;

pub fn render(frame: &mut Frame, area: Rect, profile: &Profile) {
    let block = Block::default()
        .title(Span::styled(" Profile ", theme::ember()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(inner);

    let title = Line::from(vec![
        Span::styled(
            format!("  {}", profile.rank()),
            theme::gold().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  Level {}", profile.level()), theme::bold()),
    ]);
    frame.render_widget(Paragraph::new(title), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(theme::gauge(theme::EMBER))
        .ratio(profile.level_progress().clamp(0.0, 1.0))
        .label(Span::styled(
            format!("{}/{} XP", profile.xp_into_level(), XP_PER_LEVEL),
            theme::bold(),
        ));
    let gauge_area = Rect {
        x: rows[2].x + 2,
        width: rows[2].width.saturating_sub(4),
        ..rows[2]
    };
    frame.render_widget(gauge, gauge_area);

    let mut meta = vec![
        Span::styled("  ◆ ", theme::gold()),
        Span::styled(format!("{} coins", profile.coins), theme::gold()),
        Span::styled(
            format!(
                "  ·  {} focused  ·  {} sessions",
                format_minutes(profile.total_focus_minutes),
                profile.total_sessions
            ),
            theme::dim(),
        ),
    ];
    if let Some(next) = profile.next_rank() {
        meta.push(Span::styled(
            format!("  ·  {} at Lv {}", next.name, next.min_level),
            theme::dim(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(meta)), rows[4]);
}
