use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use stacks_core::router::{NavAccount, NavLink};
use stacks_core::utils::{format_datetime, truncate_string};
use stacks_core::Page;

use crate::app::{App, AppState, View};

use super::pages::{self, add_book, book_detail, books, checkouts, login, users};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Navigation bar
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_nav_bar(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.view {
        View::Page(page) => format!("  Stacks | {}", page.title()),
        View::Loading => "  Stacks".to_string(),
        View::NotFound => "  Stacks | Not Found".to_string(),
    };
    let help_hint = "[?] Help";
    let path = app.path.as_str();

    let used = title.chars().count() + path.chars().count() + help_hint.len() + 4;
    let gap = (area.width as usize).saturating_sub(used) / 2;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(gap)),
        Span::styled(path, styles::muted_style()),
        Span::raw(" ".repeat(gap)),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// Hotkey that jumps to a navigation link
fn link_key(link: &NavLink) -> char {
    match link.path {
        "/checkouts" => 'c',
        "/users" => 'u',
        "/books/new" => 'a',
        "/login" => 'l',
        _ => 'b',
    }
}

fn render_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bar = app.nav_bar();

    let mut spans = vec![Span::raw(" ")];
    for (i, link) in bar.links.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", link_key(link), link.label);
        spans.push(Span::styled(label, styles::nav_link_style(link.path == app.path)));
    }

    // Account area on the right
    let account: Vec<Span> = match bar.account {
        NavAccount::Pending => Vec::new(),
        ref signed_in @ NavAccount::SignedIn { .. } => vec![
            Span::styled(signed_in.label().unwrap_or_default(), styles::highlight_style()),
            Span::styled(" | ", styles::muted_style()),
            Span::styled("[l] Logout", styles::muted_style()),
        ],
        NavAccount::SignedOut { ref login } => vec![Span::styled(
            format!("[{}] {}", link_key(login), login.label),
            styles::nav_link_style(login.path == app.path),
        )],
    };

    let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let right_width: usize = account.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + right_width + 1);
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(account);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Loading => pages::render_message(frame, area, " Stacks ", "Loading...", styles::muted_style()),
        View::NotFound => pages::render_message(
            frame,
            area,
            " Not Found ",
            &format!("Nothing lives at {}. Press [b] to go to the book list.", app.path),
            styles::error_style(),
        ),
        View::Page(page) => match page {
            Page::Login => login::render(frame, app, area),
            Page::BookList => books::render(frame, app, area),
            Page::BookDetail(_) => book_detail::render(frame, app, area),
            Page::AddBook => add_book::render(frame, app, area),
            Page::MyCheckouts => checkouts::render_mine(frame, app, area),
            Page::CheckoutManagement => checkouts::render_management(frame, app, area),
            Page::UserManagement => users::render(frame, app, area),
        },
    }
}

/// Page-specific key hints for the status bar
fn shortcuts(app: &App) -> &'static str {
    match app.current_page() {
        Some(Page::Login) => "[Tab] next field | [Enter] login | [Esc] quit",
        Some(Page::BookList) => "[/] search | [Enter] details | [o] check out | [:] go to | [q]uit",
        Some(Page::BookDetail(_)) => "[o] check out | [Esc] back | [q]uit",
        Some(Page::AddBook) => "[Tab] next field | [Enter] submit | [Esc] cancel",
        Some(Page::MyCheckouts) => "[Enter] book | [q]uit",
        Some(Page::CheckoutManagement) => "[/] search | [f]ilter | [r]eturn | [q]uit",
        Some(Page::UserManagement) if app.user_form.is_some() => {
            "[Tab] next field | [Space] role | [Enter] create | [Esc] cancel"
        }
        Some(Page::UserManagement) => "[n]ew user | [q]uit",
        None => "[:] go to | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;

    if matches!(app.state, AppState::EnteringPath) {
        let prompt = Line::from(vec![
            Span::styled(" Go to: ", styles::highlight_style()),
            Span::styled(format!("{}▌", app.path_input), styles::search_style()),
        ]);
        let paragraph = Paragraph::new(prompt).style(styles::status_bar_style());
        frame.render_widget(paragraph, area);
        return;
    }

    let right_text = format!(" {} ", shortcuts(app));
    let room = width.saturating_sub(right_text.chars().count() + 2);

    let left_text = if app.page_loading {
        " Loading... ".to_string()
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", truncate_string(msg, room))
    } else if let Some(expires) = app.session.expires_at() {
        format!(" Session valid until {} ", format_datetime(&expires))
    } else {
        String::new()
    };

    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = pages::centered_rect_fixed(54, 27, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Stacks", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("b", "Books"),
        help_line("c", "Checkouts"),
        help_line("u", "Users (librarians)"),
        help_line("a", "Add book (librarians)"),
        help_line("l", "Login / logout"),
        help_line(":", "Go to a path, e.g. /books/7"),
        help_line("↑/↓", "Move selection"),
        help_line("Enter", "Open selection"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search"),
        help_line("o", "Check out book (students)"),
        help_line("f", "Cycle checkout filter"),
        help_line("r", "Mark checkout returned"),
        help_line("n", "New user"),
        help_line("Tab", "Next form field"),
        help_line("Space", "Toggle role on the user form"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = pages::centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
