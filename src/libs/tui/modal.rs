use ratatui::{
    layout::Margin,
    prelude::*,
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
};

use crate::libs::tui::theme::Theme;

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);

    horiz[1]
}

/// Overlay dialog: clears what is underneath, zebra rows, optional footer
/// (key hints) on the last row.
pub fn draw_modal(f: &mut Frame, area: Rect, title: &str, lines: &[String], footer: Option<&str>) {
    let theme = Theme::dark();
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut content: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let mut txt = s.clone();
            let missing = inner_width.saturating_sub(txt.chars().count());
            txt.push_str(&" ".repeat(missing));
            let bg = if idx % 2 == 0 { theme.bg } else { theme.accent_soft };
            Line::from(Span::styled(txt, Style::default().fg(theme.fg).bg(bg)))
        })
        .collect();
    if let Some(hint) = footer {
        content.push(Line::raw(""));
        content.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(format!(" {title} "), Style::default().fg(theme.accent)));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(content).block(block), area);
}

/// Scrollable panel of pre-styled lines. `empty` is shown when there is
/// nothing to list. Returns the clamped scroll position.
pub fn draw_modal_lines(
    f: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'_>>,
    empty: &str,
    vertical_scroll: usize,
    scroll_state: &mut ScrollbarState,
) -> usize {
    let theme = Theme::dark();
    let content: Vec<Line> = if lines.is_empty() {
        vec![Line::from(Span::styled(
            empty.to_string(),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        lines
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(format!(" {title} "), Style::default().fg(theme.accent)));

    let content_len = content.len();
    let viewport_len_text = area.height.saturating_sub(2) as usize;
    let scroll_pos = vertical_scroll.min(content_len.saturating_sub(viewport_len_text));
    let p = Paragraph::new(content)
        .scroll((scroll_pos as u16, 0))
        .block(block);
    f.render_widget(p, area);

    if content_len > viewport_len_text {
        let mut s = core::mem::take(scroll_state);
        let viewport_for_scroll = area.inner(Margin::new(0, 1)).height as usize;
        s = s
            .content_length(content_len)
            .viewport_content_length(viewport_for_scroll)
            .position(scroll_pos);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓")),
            area.inner(Margin::new(0, 1)),
            &mut s,
        );
        *scroll_state = s;
    }
    scroll_pos
}
