use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::engine::{SessionKind, SessionTimer, TimerPhase};
use crate::tui::theme;
use crate::utils::format::format_clock;

pub const MOTIVATION: &[&str] = &[
    "Stay focused. Every minute counts.",
    "Deep work builds deep skill.",
    "One task. Full attention.",
    "You're forging something worthwhile.",
    "Distractions can wait. This can't.",
    "Small sessions, big streaks.",
    "Keep the flame steady.",
];

/// Seconds each motivational line stays on screen.
const MOTIVATION_SECS: u32 = 30;

pub fn motivation_for(elapsed_secs: u32) -> &'static str {
    let idx = (elapsed_secs / MOTIVATION_SECS) as usize % MOTIVATION.len();
    MOTIVATION[idx]
}

/// Extra lines under the countdown.
pub struct SessionInfo<'t> {
    pub task: Option<&'t str>,
    pub distractions: Option<u32>,
    pub motivation: Option<&'t str>,
}

pub fn render(frame: &mut Frame, area: Rect, timer: &SessionTimer, info: &SessionInfo<'_>) {
    let accent = match timer.kind() {
        SessionKind::Focus => theme::EMBER,
        SessionKind::Break => theme::BLUE,
    };

    let status = match timer.phase() {
        TimerPhase::Idle => "ready",
        TimerPhase::Running => "running",
        TimerPhase::Paused => "paused",
        TimerPhase::Complete => "done",
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} · {} ", timer.kind().display_name(), status),
            ratatui::style::Style::default().fg(accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(accent))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(8),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(inner);

    render_countdown(frame, rows[1], timer, accent);

    let gauge = Gauge::default()
        .gauge_style(theme::gauge(accent))
        .ratio((timer.progress() / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(format!("{:.0}%", timer.progress()), theme::bold()));
    frame.render_widget(gauge, centered(rows[3], rows[3].width.saturating_sub(8).min(60)));

    if let Some(task) = info.task {
        let line = Line::from(vec![
            Span::styled("Working on  ", theme::dim()),
            Span::styled(task, theme::bold()),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), rows[5]);
    }

    if let Some(count) = info.distractions {
        let style = if count == 0 { theme::green() } else { theme::red() };
        let line = Line::from(Span::styled(format!("Distractions: {}", count), style));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), rows[6]);
    }

    if let Some(message) = info.motivation {
        let line = Line::from(Span::styled(
            message,
            theme::dim().add_modifier(Modifier::ITALIC),
        ));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), rows[7]);
    }
}

fn render_countdown(frame: &mut Frame, area: Rect, timer: &SessionTimer, accent: Color) {
    let text = format_clock(timer.remaining_secs());
    let chars = text.chars().count() as u16;

    // Full pixels need 8x8 cells per glyph; fall back to quadrants, then plain text.
    let (size, cell_w, cell_h) = if area.width >= chars * 8 && area.height >= 8 {
        (PixelSize::Full, 8, 8)
    } else if area.width >= chars * 4 && area.height >= 4 {
        (PixelSize::Quadrant, 4, 4)
    } else {
        let line = Line::from(Span::styled(
            text,
            ratatui::style::Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        return;
    };

    let style = if timer.is_paused() {
        theme::dim()
    } else {
        ratatui::style::Style::default().fg(accent)
    };
    let big = BigText::builder()
        .pixel_size(size)
        .style(style)
        .lines(vec![Line::from(text)])
        .build();

    let target = Rect {
        height: cell_h.min(area.height),
        ..centered(area, chars * cell_w)
    };
    frame.render_widget(big, target);
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motivation_rotates_every_thirty_seconds() {
        assert_eq!(motivation_for(0), MOTIVATION[0]);
        assert_eq!(motivation_for(29), MOTIVATION[0]);
        assert_eq!(motivation_for(30), MOTIVATION[1]);
        assert_eq!(motivation_for(30 * MOTIVATION.len() as u32), MOTIVATION[0]);
    }

    #[test]
    fn centered_clamps_to_area() {
        let area = Rect::new(10, 0, 20, 1);
        assert_eq!(centered(area, 10), Rect::new(15, 0, 10, 1));
        assert_eq!(centered(area, 50), area);
    }
}
