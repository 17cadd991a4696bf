use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_search(frame, app, chunks[0]);
    render_book_table(frame, app, chunks[1]);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);
    let cursor = if searching { "▌" } else { "" };

    let line = if app.search_query.is_empty() && !searching {
        Line::from(Span::styled(
            " Press / to search by title, author or genre",
            styles::muted_style(),
        ))
    } else {
        Line::from(vec![
            Span::styled(" Search: ", styles::muted_style()),
            Span::styled(format!("{}{}", app.search_query, cursor), styles::search_style()),
        ])
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(searching)),
    );
    frame.render_widget(paragraph, area);
}

fn render_book_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Title"),
        Cell::from("Author"),
        Cell::from("Genre"),
        Cell::from("Available"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .books
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let style = if i == app.book_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(book.title.as_str()),
                Cell::from(book.author.as_str()),
                Cell::from(book.genre.as_str()),
                Cell::from(Span::styled(
                    book.availability_short(),
                    styles::availability_style(book.is_available()),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(28),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    let title = format!(" Library Books ({}) ", app.books.len());

    let table = Table::new(rows, widths)
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
    if !app.books.is_empty() {
        state.select(Some(app.book_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
