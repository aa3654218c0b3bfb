use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::libs::tui::theme::Theme;

pub fn draw_input(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let theme = Theme::dark();
    let line = Line::from(vec![
        Span::styled(value, Style::default().fg(theme.fg)),
        Span::styled(if focused { "_" } else { "" }, Style::default().fg(theme.accent)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(format!(" {label} "), Style::default().fg(theme.muted)))
        .border_style(Style::default().fg(if focused {
            theme.accent
        } else {
            theme.accent_soft
        }));
    f.render_widget(Paragraph::new(line).block(block), area);
}

/// Stack of 3-row inputs from the top of `area`. Returns the rows used.
pub fn draw_inputs<'a, 'b>(
    f: &mut Frame,
    area: Rect,
    fields: impl Iterator<Item = (&'a str, &'b str, bool)>,
) -> u16 {
    let mut y = area.y;
    for (label, value, focused) in fields {
        if y + 3 > area.y + area.height {
            break;
        }
        draw_input(f, Rect::new(area.x, y, area.width, 3), label, value, focused);
        y += 3;
    }
    y - area.y
}
