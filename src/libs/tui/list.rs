use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
};

use crate::libs::tui::theme::Theme;

/// Bordered pick list. Items flagged `false` are drawn dimmed.
pub fn draw_list(f: &mut Frame, area: Rect, items: &[(String, bool)], selected: usize, title: &str) {
    let theme = Theme::dark();
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|(label, enabled)| {
            let fg = if *enabled { theme.fg } else { theme.accent_soft };
            ListItem::new(Span::styled(label.clone(), Style::default().fg(fg)))
        })
        .collect();
    let list = List::new(list_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(format!(" {title} "), Style::default().fg(theme.accent))),
        )
        .highlight_style(
            Style::default()
                .bg(theme.accent_soft)
                .fg(theme.fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn list_next(selected: usize, len: usize) -> usize {
    if len == 0 || selected + 1 >= len {
        0
    } else {
        selected + 1
    }
}

pub fn list_prev(selected: usize, len: usize) -> usize {
    if selected == 0 {
        len.saturating_sub(1)
    } else {
        selected - 1
    }
}
