use ratatui::{
    layout::Margin,
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::libs::tui::theme::Theme;

#[derive(Clone)]
pub struct BoxProps {
    pub offset: (u16, u16),
    /// Zero on either axis means "fit": full width, or as tall as the lines.
    pub size: (u16, u16),
    pub border_color: Color,
    pub title: String,
}

impl Default for BoxProps {
    fn default() -> Self {
        Self {
            offset: (0, 0),
            size: (0, 0),
            border_color: Theme::dark().accent,
            title: String::new(),
        }
    }
}

/// Rounded panel sized to its lines. Returns the height it took, so callers
/// can stack panels in a column.
pub fn draw_box(f: &mut Frame, area: Rect, lines: Vec<Line<'_>>, props: &BoxProps) -> u16 {
    let needed_h = (lines.len() as u16).saturating_add(2).max(3);
    let max_w = area.width.saturating_sub(props.offset.0);
    let max_h = area.height.saturating_sub(props.offset.1);
    let mut outer = Rect {
        x: area.x.saturating_add(props.offset.0),
        y: area.y.saturating_add(props.offset.1),
        width: max_w,
        height: needed_h.min(max_h),
    };
    if props.size.0 > 0 {
        outer.width = props.size.0.min(max_w);
    }
    if props.size.1 > 0 {
        outer.height = props.size.1.max(needed_h).min(max_h);
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(props.border_color));
    if !props.title.is_empty() {
        block = block.title(Span::styled(
            format!(" {} ", props.title),
            Style::default()
                .fg(props.border_color)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(block, outer);

    let inner = outer.inner(Margin::new(1, 1));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    outer.height
}
