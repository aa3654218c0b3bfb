use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::libs::tui::theme::Theme;

/// One-line status bar: green for success, red for errors.
pub fn draw_status(f: &mut Frame, area: Rect, text: &str, ok: bool) {
    let theme = Theme::dark();
    let color = if ok { theme.good } else { theme.bad };
    let p = Paragraph::new(Span::styled(text, Style::default().fg(color))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent_soft)),
    );
    f.render_widget(p, area);
}
