use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::engine::Shop;
use crate::models::{ItemEffect, CATALOG};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, shop: &Shop<'_>, coins: u64, selected: usize) {
    let block = Block::default()
        .title(Span::styled(" Shop ", theme::ember()))
        .title(
            Line::from(Span::styled(
                format!(" ◆ {} coins ", coins),
                theme::gold().add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let rows = CATALOG.iter().map(|item| {
        let owned = item.effect == ItemEffect::Medal && shop.owns(item.id);
        let (price, price_style) = if owned {
            ("Owned".to_string(), theme::green())
        } else if shop.can_afford(item, coins) {
            (format!("{}", item.price), theme::gold())
        } else {
            (format!("{}", item.price), theme::red())
        };
        Row::new(vec![
            Cell::from(Span::styled(item.effect.category().display_name(), theme::dim())),
            Cell::from(Span::styled(item.name, theme::bold())),
            Cell::from(Span::styled(item.description, theme::dim())),
            Cell::from(Span::styled(price, price_style)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec!["Category", "Item", "Effect", "Price"]).style(theme::ember()),
    )
    .row_highlight_style(theme::ember().add_modifier(Modifier::BOLD | Modifier::REVERSED))
    .highlight_symbol("▸ ")
    .block(block);

    let mut state = TableState::default().with_selected(Some(selected.min(CATALOG.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}
