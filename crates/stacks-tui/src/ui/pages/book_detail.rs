use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use stacks_core::Role;

use crate::app::App;
use crate::ui::styles;

use super::render_message;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref error) = app.page_error {
        render_message(frame, area, " Book Details ", error, styles::error_style());
        return;
    }

    let Some(ref book) = app.book else {
        render_message(frame, area, " Book Details ", "Loading...", styles::muted_style());
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(book.title.as_str(), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Author:       ", styles::muted_style()),
            Span::raw(book.author.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Genre:        ", styles::muted_style()),
            Span::raw(book.genre.as_str()),
        ]),
        Line::from(vec![
            Span::styled("ISBN:         ", styles::muted_style()),
            Span::raw(book.isbn.as_deref().unwrap_or("-")),
        ]),
        Line::from(vec![
            Span::styled("Availability: ", styles::muted_style()),
            Span::styled(
                book.availability_display(),
                styles::availability_style(book.is_available()),
            ),
        ]),
        Line::from(""),
    ];

    if !book.is_available() {
        lines.push(Line::from(Span::styled(
            "No copies available for checkout",
            styles::highlight_style(),
        )));
    } else if app.has_role(Role::Student) {
        lines.push(Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[o]", styles::help_key_style()),
            Span::styled(" to check out this book", styles::muted_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Book Details ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
