//! Content area rendering, one module per routed page.

pub mod add_book;
pub mod book_detail;
pub mod books;
pub mod checkouts;
pub mod login;
pub mod users;

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::styles;

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// A bordered box holding a single centered message
pub fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, style: Style) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), style)),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title.to_string())
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        );
    frame.render_widget(paragraph, area);
}

/// One `Label: [value]` row of a form
pub fn form_field<'a>(label: &str, value: &str, focused: bool, masked: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown = if masked {
        "*".repeat(value.chars().count().min(24))
    } else {
        value.to_string()
    };
    let cursor = if focused { "▌" } else { "" };

    Line::from(vec![
        Span::styled(format!("  {:>14}: [", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", shown, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// A form's submit button
pub fn form_button<'a>(label: &str, focused: bool) -> Line<'a> {
    if focused {
        Line::from(vec![
            Span::raw("                  ["),
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style()),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("                  ["),
            Span::styled(format!("   {}   ", label), styles::list_item_style()),
            Span::raw("]"),
        ])
    }
}

/// Form error line, if there is one
pub fn form_error<'a>(error: Option<&str>) -> Option<Line<'a>> {
    error.map(|e| Line::from(Span::styled(format!("  {}", e), styles::error_style())))
}
