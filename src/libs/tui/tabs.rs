use ratatui::{prelude::*, widgets::Paragraph};

use crate::libs::tui::theme::Theme;

/// One-row tab strip.
/// - `hovered`: tab under the mouse
/// - `disabled`: tabs drawn dimmed (still clickable; the view explains why)
/// - `out_areas`: filled with per-tab hit rects for mouse handling
pub fn draw_tab_strip(
    f: &mut Frame,
    area: Rect,
    labels: &[&str],
    hovered: Option<usize>,
    active: usize,
    disabled: &[bool],
    out_areas: &mut Vec<Rect>,
) {
    let theme = Theme::dark();
    let widths: Vec<Constraint> = labels
        .iter()
        .map(|s| Constraint::Length(s.chars().count() as u16 + 4))
        .collect();

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);

    out_areas.clear();
    for (i, rect) in row.iter().copied().enumerate() {
        out_areas.push(rect);
        let is_active = active == i;
        let fg = if is_active {
            Color::Cyan
        } else if disabled.get(i).copied().unwrap_or(false) {
            theme.accent_soft
        } else if hovered == Some(i) {
            Color::LightBlue
        } else {
            theme.fg
        };

        let style = Style::default()
            .fg(fg)
            .add_modifier(if is_active { Modifier::BOLD } else { Modifier::empty() });
        let p = Paragraph::new(Line::from(Span::styled(format!(" {} ", labels[i]), style)))
            .alignment(Alignment::Center);
        f.render_widget(p, rect);
    }
}

/// Index of the rect containing (x, y).
pub fn hit_test(areas: &[Rect], x: u16, y: u16) -> Option<usize> {
    areas
        .iter()
        .position(|r| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height)
}
