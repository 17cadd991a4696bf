use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::forms::{UserField, UserForm};
use crate::ui::styles;

use super::{centered_rect_fixed, form_button, form_error, form_field};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    render_user_table(frame, app, area);

    if let Some(ref form) = app.user_form {
        render_user_form(frame, form, app.form_error.as_deref(), area);
    }
}

fn render_user_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Username"),
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Role"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.user_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(user.username.as_str()),
                Cell::from(user.full_name()),
                Cell::from(user.email.as_str()),
                Cell::from(user.user_type.display_name()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(28),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    let title = format!(" Users ({}) ", app.users.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(app.user_form.is_none())),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.users.is_empty() {
        state.select(Some(app.user_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_user_form(frame: &mut Frame, form: &UserForm, error: Option<&str>, area: Rect) {
    let height = if error.is_some() { 15 } else { 13 };
    let popup = centered_rect_fixed(60, height, area);

    frame.render_widget(Clear, popup);

    let mut lines = vec![Line::from("")];
    for field in UserField::ALL {
        let focused = form.focus == field;
        match field {
            UserField::Submit => {
                lines.push(Line::from(""));
                lines.push(form_button(field.label(), focused));
            }
            UserField::Role => {
                let mut line = form_field(field.label(), form.value(field), focused, false);
                line.spans
                    .push(Span::styled(" (Space to toggle)", styles::muted_style()));
                lines.push(line);
            }
            _ => lines.push(form_field(
                field.label(),
                form.value(field),
                focused,
                field == UserField::Password,
            )),
        }
    }

    if let Some(line) = form_error(error) {
        lines.push(Line::from(""));
        lines.push(line);
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Create New User ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, popup);
}
