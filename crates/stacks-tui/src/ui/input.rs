//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use stacks_core::router::{HOME_PATH, LOGIN_PATH};
use stacks_core::Page;

use crate::app::{
    can_add_password_char, can_add_path_char, can_add_search_char, can_add_username_char, App,
    AppState, LoginFocus, PAGE_SCROLL_SIZE,
};
use crate::forms::{BookField, UserField};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::EnteringPath) {
        return handle_path_input(app, key);
    }

    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Pages with text entry take every key
    match app.current_page() {
        Some(Page::Login) => return handle_login_input(app, key).await,
        Some(Page::AddBook) => return handle_book_form_input(app, key),
        Some(Page::UserManagement) if app.user_form.is_some() => {
            return handle_user_form_input(app, key);
        }
        _ => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(':') => {
            app.path_input.clear();
            app.state = AppState::EnteringPath;
            return Ok(false);
        }
        KeyCode::Char('b') => {
            app.navigate(HOME_PATH);
            return Ok(false);
        }
        KeyCode::Char('c') => {
            app.navigate("/checkouts");
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.navigate("/users");
            return Ok(false);
        }
        KeyCode::Char('a') => {
            app.navigate("/books/new");
            return Ok(false);
        }
        KeyCode::Char('l') => {
            if app.session.is_authenticated() {
                app.logout();
            } else {
                app.navigate(LOGIN_PATH);
            }
            return Ok(false);
        }
        _ => {}
    }

    handle_page_input(app, key);
    Ok(false)
}

/// Keys for the list and detail pages
fn handle_page_input(app: &mut App, key: KeyEvent) {
    let page = app.current_page();

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Enter => {
            if let Some(path) = app.selected_link() {
                app.navigate(&path);
            }
        }
        KeyCode::Char('/') => {
            if matches!(page, Some(Page::BookList | Page::CheckoutManagement)) {
                app.state = AppState::Searching;
            }
        }
        KeyCode::Char('f') => app.cycle_checkout_filter(),
        KeyCode::Char('r') => app.return_selected_checkout(),
        KeyCode::Char('o') => app.checkout_focused_book(),
        KeyCode::Char('n') => app.open_user_form(),
        KeyCode::Esc => {
            if matches!(page, Some(Page::BookDetail(_))) {
                app.navigate(HOME_PATH);
            }
        }
        _ => {}
    }
}

fn handle_path_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.path_input.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            let path = std::mem::take(&mut app.path_input);
            if !path.is_empty() {
                app.navigate(&path);
            }
        }
        KeyCode::Backspace => {
            app.path_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.path_input.chars().count(), c) {
                app.path_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            if !app.search_query.is_empty() {
                app.search_query.clear();
                app.apply_search();
            }
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.apply_search();
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            if can_add_search_char(app.search_query.chars().count(), c) {
                app.search_query.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Signed in: back to the book list
            if app.session.is_authenticated() {
                app.navigate(HOME_PATH);
            } else {
                app.state = AppState::ConfirmingQuit;
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On success the app navigates home, otherwise login_error is set
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_book_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let form = &mut app.book_form;
    match key.code {
        KeyCode::Esc => app.navigate(HOME_PATH),
        KeyCode::Down | KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => {
            if form.focus == BookField::Submit {
                app.submit_book_form();
            } else {
                form.focus = form.focus.next();
            }
        }
        KeyCode::Backspace => form.pop(),
        KeyCode::Char(c) => form.push(c),
        _ => {}
    }
    Ok(false)
}

fn handle_user_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let Some(form) = app.user_form.as_mut() else {
        return Ok(false);
    };
    match key.code {
        KeyCode::Esc => app.close_user_form(),
        KeyCode::Down | KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::Up | KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => {
            if form.focus == UserField::Submit {
                app.submit_user_form();
            } else {
                form.focus = form.focus.next();
            }
        }
        KeyCode::Backspace => form.pop(),
        KeyCode::Char(c) => form.push(c),
        _ => {}
    }
    Ok(false)
}
