use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{Profile, WeeklyGrid};
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, profile: &Profile, weekly: &WeeklyGrid, goal_minutes: u32) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::ember()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    // Filled proportional to streak/30
    let bar = progress_bar(profile.streak, 30, 12);

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, theme::ember()),
        Span::styled(
            format!("  {} days", profile.streak),
            theme::ember().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ·  ❄ {}", profile.streak_freezes), theme::blue()),
    ]);

    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for day in &weekly.days {
        let (dot, style) = if day.sessions == 0 {
            ("○", theme::dim())
        } else if day.goal_ratio(goal_minutes) >= 1.0 {
            ("●", theme::green().add_modifier(Modifier::BOLD))
        } else {
            ("◑", theme::gold())
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled("  ", theme::dim()));
    }

    let meta_line = Line::from(Span::styled(
        format!(
            "  Week: {} active day(s)  ·  goal {}m/day",
            weekly.active_days(),
            goal_minutes
        ),
        theme::dim(),
    ));

    let text = vec![
        Line::from(""),
        streak_line,
        Line::from(""),
        Line::from(dot_spans),
        meta_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
