use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoginFocus};
use crate::ui::styles;

use super::{centered_rect_fixed, form_button, form_field};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(52, height, area);

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Sign in to the library", styles::title_style())),
        Line::from(""),
        form_field(
            "Username",
            &app.login_username,
            app.login_focus == LoginFocus::Username,
            false,
        ),
        form_field(
            "Password",
            &app.login_password,
            app.login_focus == LoginFocus::Password,
            true,
        ),
        Line::from(""),
        form_button("Login", app.login_focus == LoginFocus::Button),
    ];

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Login ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
