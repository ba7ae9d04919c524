use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(16, 14, 13);
pub const SURFACE: Color = Color::Rgb(27, 23, 21);
pub const BORDER: Color = Color::Rgb(58, 47, 40);
pub const TEXT: Color = Color::Rgb(236, 224, 208);
pub const TEXT_DIM: Color = Color::Rgb(128, 114, 100);
pub const EMBER: Color = Color::Rgb(232, 118, 58);
pub const GOLD: Color = Color::Rgb(214, 172, 72);
pub const GREEN: Color = Color::Rgb(104, 168, 96);
pub const BLUE: Color = Color::Rgb(92, 140, 196);
pub const RED: Color = Color::Rgb(196, 78, 62);
pub const EMPTY: Color = Color::Rgb(40, 34, 30);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn ember() -> Style {
    Style::default().fg(EMBER)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

/// Break sessions and cooldowns.
pub fn blue() -> Style {
    Style::default().fg(BLUE)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn gauge(color: Color) -> Style {
    Style::default().fg(color).bg(EMPTY)
}
