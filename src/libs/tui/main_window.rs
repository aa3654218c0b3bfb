use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear},
};

use crate::libs::tui::theme::Theme;

pub fn draw_main_window(f: &mut Frame, area: Rect) {
    let theme = Theme::dark();
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent_soft))
        .style(Style::default().bg(theme.bg).fg(theme.fg));
    f.render_widget(block, area);
}
