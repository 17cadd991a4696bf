use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::forms::BookField;
use crate::ui::styles;

use super::{form_button, form_error, form_field};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.book_form;
    let mut lines = vec![Line::from("")];

    for field in BookField::ALL {
        let focused = form.focus == field;
        if field == BookField::Submit {
            lines.push(Line::from(""));
            lines.push(form_button(field.label(), focused));
        } else {
            lines.push(form_field(field.label(), form.value(field), focused, false));
        }
    }

    if let Some(line) = form_error(app.form_error.as_deref()) {
        lines.push(Line::from(""));
        lines.push(line);
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Add New Book ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
