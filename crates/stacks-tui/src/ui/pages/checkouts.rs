use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use stacks_core::models::{Checkout, CheckoutFilter};

use crate::app::{App, AppState};
use crate::ui::styles;

use super::render_message;

/// A student's own loans
pub fn render_mine(frame: &mut Frame, app: &App, area: Rect) {
    if app.checkouts.is_empty() && !app.page_loading {
        render_message(
            frame,
            area,
            " My Checked Out Books ",
            "You have no books checked out.",
            styles::muted_style(),
        );
        return;
    }

    let header = ["Book Title", "Author", "Checkout Date", "Return Date", "Status"];
    let rows = app
        .checkouts
        .iter()
        .map(|c| {
            vec![
                Cell::from(c.book.title.as_str()),
                Cell::from(c.book.author.as_deref().unwrap_or("")),
                Cell::from(c.checkout_date_display()),
                Cell::from(c.return_date_display()),
                status_cell(c),
            ]
        })
        .collect();
    let widths = [
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let title = format!(" My Checked Out Books ({}) ", app.checkouts.len());
    render_table(frame, app, area, title, &header, rows, &widths);
}

/// Every loan, for librarians
pub fn render_management(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_toolbar(frame, app, chunks[0]);

    let header = ["Student", "Book", "Checkout Date", "Return Date", "Status"];
    let rows = app
        .checkouts
        .iter()
        .map(|c| {
            let action = if c.is_returned {
                status_cell(c)
            } else {
                Cell::from(Line::from(vec![
                    Span::styled("Checked Out ", styles::highlight_style()),
                    Span::styled("[r] return", styles::muted_style()),
                ]))
            };
            vec![
                Cell::from(c.student_display()),
                Cell::from(c.book.title.as_str()),
                Cell::from(c.checkout_date_display()),
                Cell::from(c.return_date_display()),
                action,
            ]
        })
        .collect();
    let widths = [
        Constraint::Percentage(24),
        Constraint::Percentage(32),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let title = format!(" Checkout Management ({}) ", app.checkouts.len());
    render_table(frame, app, chunks[1], title, &header, rows, &widths);
}

fn render_toolbar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, filter) in [CheckoutFilter::All, CheckoutFilter::Active, CheckoutFilter::Returned]
        .iter()
        .enumerate()
    {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            filter.label(),
            styles::nav_link_style(*filter == app.checkout_filter),
        ));
    }

    let searching = matches!(app.state, AppState::Searching);
    spans.push(Span::styled("    Search: ", styles::muted_style()));
    if app.search_query.is_empty() && !searching {
        spans.push(Span::styled("student or book (/)", styles::muted_style()));
    } else {
        let cursor = if searching { "▌" } else { "" };
        spans.push(Span::styled(
            format!("{}{}", app.search_query, cursor),
            styles::search_style(),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(searching)),
    );
    frame.render_widget(paragraph, area);
}

fn status_cell(checkout: &Checkout) -> Cell<'static> {
    let style = if checkout.is_returned {
        styles::success_style()
    } else {
        styles::highlight_style()
    };
    Cell::from(Span::styled(checkout.status_display(), style))
}

fn render_table(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: String,
    header: &[&'static str],
    rows: Vec<Vec<Cell>>,
    widths: &[Constraint],
) {
    let header = Row::new(header.iter().map(|h| Cell::from(*h)))
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = rows
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            let style = if i == app.checkout_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let table = Table::new(rows, widths.to_vec())
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.checkouts.is_empty() {
        state.select(Some(app.checkout_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
