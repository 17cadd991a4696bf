//! Application state management for Stacks.
//!
//! This module contains the `App` struct that owns the session store, the API
//! client and the router, tracks which path is shown, and coordinates the
//! background tasks that load page data.

use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use stacks_core::models::{Book, Checkout, CheckoutFilter, User};
use stacks_core::router::{nav_bar, NavBar, HOME_PATH, LOGIN_PATH};
use stacks_core::{ApiClient, ApiError, Config, LoginError, Page, Resolution, Role, Router, SessionStore};

use crate::forms::{BookForm, UserForm};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a path typed at the `:` prompt.
const MAX_PATH_LENGTH: usize = 200;

/// Maximum length for search input.
const MAX_SEARCH_LENGTH: usize = 100;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// What the content area shows for the current path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Session not initialized yet
    Loading,
    Page(Page),
    NotFound,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EnteringPath,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from page requests running on the runtime.
enum LoadResult {
    Books(Vec<Book>),
    Book(Book),
    Checkouts(Vec<Checkout>),
    Users(Vec<User>),
    CheckedOut,
    Returned,
    BookCreated(Book),
    UserCreated(User),
    Failed(ApiError),
}

/// A result tagged with the navigation generation that requested it.
struct PageMessage {
    generation: u64,
    result: LoadResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    router: Router,

    // Location
    pub state: AppState,
    pub path: String,
    pub view: View,
    /// A request for the current page is in flight
    pub page_loading: bool,
    generation: u64,
    pub path_input: String,
    pub search_query: String,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Page data
    pub books: Vec<Book>,
    pub book_selection: usize,
    pub book: Option<Book>,
    pub checkouts: Vec<Checkout>,
    pub checkout_selection: usize,
    pub checkout_filter: CheckoutFilter,
    pub users: Vec<User>,
    pub user_selection: usize,

    // Forms
    pub book_form: BookForm,
    /// Open while creating a user on the user management page
    pub user_form: Option<UserForm>,
    pub form_error: Option<String>,
    pub page_error: Option<String>,

    // Background task channel
    page_rx: mpsc::Receiver<PageMessage>,
    page_tx: mpsc::Sender<PageMessage>,

    pub status_message: Option<String>,
}

impl App {
    /// Create the application around an already constructed session store.
    /// Call `start()` before the first draw.
    pub fn new(config: Config, session: SessionStore) -> Result<Self> {
        let api_url = config.resolved_api_url();
        debug!(api_url = %api_url, "Using API");
        let api = ApiClient::new(&api_url)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login_username = config.resolved_username().unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            router: Router::new(),

            state: AppState::Normal,
            path: HOME_PATH.to_string(),
            view: View::Loading,
            page_loading: false,
            generation: 0,
            path_input: String::new(),
            search_query: String::new(),

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            books: Vec::new(),
            book_selection: 0,
            book: None,
            checkouts: Vec::new(),
            checkout_selection: 0,
            checkout_filter: CheckoutFilter::default(),
            users: Vec::new(),
            user_selection: 0,

            book_form: BookForm::default(),
            user_form: None,
            form_error: None,
            page_error: None,

            page_rx: rx,
            page_tx: tx,

            status_message: None,
        })
    }

    /// Restore the session and show the home path
    pub fn start(&mut self) {
        self.session.initialize();
        self.sync_token();
        self.navigate(HOME_PATH);
    }

    fn sync_token(&mut self) {
        match self.session.token() {
            Some(token) => self.api.set_token(token.to_string()),
            None => self.api.clear_token(),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to `path`, following any redirect the route guards ask for
    pub fn navigate(&mut self, path: &str) {
        let navigation = self.router.navigate(&self.session, path);
        debug!(requested = path, path = %navigation.path, resolution = ?navigation.resolution, "Navigated");

        self.generation += 1;
        self.page_loading = false;
        self.page_error = None;
        self.path = navigation.path;
        self.view = match navigation.resolution {
            Resolution::Render(page) => View::Page(page),
            Resolution::Loading => View::Loading,
            Resolution::NotFound | Resolution::Redirect(_) => View::NotFound,
        };

        if let View::Page(page) = self.view {
            self.enter_page(page);
        }
    }

    pub fn current_page(&self) -> Option<Page> {
        match self.view {
            View::Page(page) => Some(page),
            View::Loading | View::NotFound => None,
        }
    }

    pub fn nav_bar(&self) -> NavBar {
        nav_bar(&self.session)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.session
            .current_identity()
            .map(|identity| identity.has_role(role))
            .unwrap_or(false)
    }

    /// Reset page state and start loading whatever the page shows
    fn enter_page(&mut self, page: Page) {
        match page {
            Page::Login => {
                self.login_password.clear();
                self.login_error = None;
                self.login_focus = if self.login_username.is_empty() {
                    LoginFocus::Username
                } else {
                    LoginFocus::Password
                };
            }
            Page::BookList => {
                self.search_query.clear();
                self.book_selection = 0;
                self.load_books();
            }
            Page::BookDetail(id) => {
                self.book = None;
                self.load_book(id);
            }
            Page::AddBook => {
                self.book_form = BookForm::default();
                self.form_error = None;
            }
            Page::MyCheckouts | Page::CheckoutManagement => {
                self.search_query.clear();
                self.checkout_selection = 0;
                self.load_checkouts();
            }
            Page::UserManagement => {
                self.user_selection = 0;
                self.user_form = None;
                self.form_error = None;
                self.load_users();
            }
        }
    }

    /// Reload the current page's data, superseding requests still in flight
    pub fn reload(&mut self) {
        self.generation += 1;
        match self.current_page() {
            Some(Page::BookList) => self.load_books(),
            Some(Page::BookDetail(id)) => self.load_book(id),
            Some(Page::MyCheckouts | Page::CheckoutManagement) => self.load_checkouts(),
            Some(Page::UserManagement) => self.load_users(),
            Some(Page::Login | Page::AddBook) | None => {}
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        if username.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;
        let password = self.login_password.clone();

        match self.session.login(&self.api, &username, &password).await {
            Ok(()) => {
                self.sync_token();
                self.login_password.clear();

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.status_message = self
                    .session
                    .current_identity()
                    .map(|identity| format!("Welcome, {}", identity.full_name()));
                self.navigate(HOME_PATH);
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.api.clear_token();
        self.books.clear();
        self.book = None;
        self.checkouts.clear();
        self.users.clear();
        self.navigate(LOGIN_PATH);
    }

    // =========================================================================
    // Background Requests
    // =========================================================================

    fn spawn_request<F, Fut>(&mut self, request: F)
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: Future<Output = LoadResult> + Send + 'static,
    {
        let api = self.api.clone();
        let tx = self.page_tx.clone();
        let generation = self.generation;
        self.page_loading = true;

        tokio::spawn(async move {
            let result = request(api).await;
            if let Err(e) = tx.send(PageMessage { generation, result }).await {
                error!(error = %e, "Failed to send page result - channel closed");
            }
        });
    }

    fn load_books(&mut self) {
        let search = self.search_query.clone();
        self.spawn_request(move |api| async move {
            api.list_books(&search)
                .await
                .map_or_else(LoadResult::Failed, LoadResult::Books)
        });
    }

    fn load_book(&mut self, id: i64) {
        self.spawn_request(move |api| async move {
            api.get_book(id).await.map_or_else(LoadResult::Failed, LoadResult::Book)
        });
    }

    fn load_checkouts(&mut self) {
        // Students always see their own loans; the filter only applies to management
        let filter = if self.current_page() == Some(Page::CheckoutManagement) {
            self.checkout_filter
        } else {
            CheckoutFilter::All
        };
        let search = self.search_query.clone();
        self.spawn_request(move |api| async move {
            api.list_checkouts(filter, &search)
                .await
                .map_or_else(LoadResult::Failed, LoadResult::Checkouts)
        });
    }

    fn load_users(&mut self) {
        self.spawn_request(|api| async move {
            api.list_users().await.map_or_else(LoadResult::Failed, LoadResult::Users)
        });
    }

    /// Check for completed background requests and apply their results
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.page_rx.try_recv() {
            self.process_page_message(message);
        }
    }

    fn process_page_message(&mut self, message: PageMessage) {
        if message.generation != self.generation {
            debug!(
                generation = message.generation,
                current = self.generation,
                "Dropping result for a page that is no longer shown"
            );
            return;
        }
        self.page_loading = false;

        match message.result {
            LoadResult::Books(books) => {
                self.book_selection = self.book_selection.min(books.len().saturating_sub(1));
                self.books = books;
            }
            LoadResult::Book(book) => {
                self.book = Some(book);
            }
            LoadResult::Checkouts(checkouts) => {
                self.checkout_selection = self.checkout_selection.min(checkouts.len().saturating_sub(1));
                self.checkouts = checkouts;
            }
            LoadResult::Users(users) => {
                self.user_selection = self.user_selection.min(users.len().saturating_sub(1));
                self.users = users;
            }
            LoadResult::CheckedOut => {
                info!("Book checked out");
                self.status_message = Some("Book checked out successfully!".to_string());
                self.navigate("/checkouts");
            }
            LoadResult::Returned => {
                self.status_message = Some("Book marked as returned".to_string());
                self.reload();
            }
            LoadResult::BookCreated(book) => {
                info!(book_id = book.id, "Book added");
                self.status_message = Some(format!("Book \"{}\" added successfully!", book.title));
                self.navigate(HOME_PATH);
            }
            LoadResult::UserCreated(user) => {
                info!(user_id = user.id, "User created");
                self.user_form = None;
                self.form_error = None;
                self.status_message = Some(format!("Created {} account for {}", user.user_type, user.username));
                self.reload();
            }
            LoadResult::Failed(e) => self.handle_failure(e),
        }
    }

    fn handle_failure(&mut self, error: ApiError) {
        if matches!(error, ApiError::Unauthorized) && self.session.is_authenticated() {
            warn!("API rejected the session token, logging out");
            self.logout();
            self.status_message = Some("Session expired. Please log in again.".to_string());
            return;
        }

        warn!(error = %error, path = %self.path, "Request failed");
        match self.current_page() {
            Some(Page::AddBook) => self.form_error = Some(error.to_string()),
            Some(Page::UserManagement) if self.user_form.is_some() => {
                self.form_error = Some(error.to_string())
            }
            Some(Page::BookDetail(_)) if self.book.is_none() => {
                self.page_error = Some(match error {
                    ApiError::NotFound(_) => "Book not found".to_string(),
                    other => other.to_string(),
                });
            }
            Some(Page::BookDetail(_)) => {
                self.status_message = Some(format!("Failed to check out book: {}", error));
            }
            _ => self.status_message = Some(error.to_string()),
        }
    }

    // =========================================================================
    // Page Actions
    // =========================================================================

    /// Book under the cursor on the list page, or the one on the detail page
    pub fn focused_book(&self) -> Option<&Book> {
        match self.current_page() {
            Some(Page::BookList) => self.books.get(self.book_selection),
            Some(Page::BookDetail(_)) => self.book.as_ref(),
            _ => None,
        }
    }

    pub fn selected_checkout(&self) -> Option<&Checkout> {
        self.checkouts.get(self.checkout_selection)
    }

    /// Check out the focused book for the signed-in student
    pub fn checkout_focused_book(&mut self) {
        if !self.has_role(Role::Student) {
            self.status_message = Some("Only students can check out books".to_string());
            return;
        }
        let (id, available) = match self.focused_book() {
            Some(book) => (book.id, book.is_available()),
            None => return,
        };
        if !available {
            self.status_message = Some("No copies available for checkout".to_string());
            return;
        }

        self.spawn_request(move |api| async move {
            api.checkout_book(id)
                .await
                .map_or_else(LoadResult::Failed, |()| LoadResult::CheckedOut)
        });
    }

    /// Mark the selected checkout returned (management page only)
    pub fn return_selected_checkout(&mut self) {
        if self.current_page() != Some(Page::CheckoutManagement) {
            return;
        }
        let id = match self.selected_checkout() {
            Some(checkout) if !checkout.is_returned => checkout.id,
            Some(_) => {
                self.status_message = Some("Already returned".to_string());
                return;
            }
            None => return,
        };

        self.spawn_request(move |api| async move {
            api.return_checkout(id)
                .await
                .map_or_else(LoadResult::Failed, |()| LoadResult::Returned)
        });
    }

    pub fn cycle_checkout_filter(&mut self) {
        if self.current_page() != Some(Page::CheckoutManagement) {
            return;
        }
        self.checkout_filter = self.checkout_filter.next();
        self.checkout_selection = 0;
        self.reload();
    }

    /// Search text changed and was submitted
    pub fn apply_search(&mut self) {
        self.book_selection = 0;
        self.checkout_selection = 0;
        self.reload();
    }

    pub fn submit_book_form(&mut self) {
        let book = match self.book_form.to_new_book() {
            Ok(book) => book,
            Err(e) => {
                self.form_error = Some(e.to_string());
                return;
            }
        };
        self.form_error = None;

        self.spawn_request(move |api| async move {
            api.create_book(&book)
                .await
                .map_or_else(LoadResult::Failed, LoadResult::BookCreated)
        });
    }

    pub fn open_user_form(&mut self) {
        if self.current_page() == Some(Page::UserManagement) {
            self.user_form = Some(UserForm::default());
            self.form_error = None;
        }
    }

    pub fn close_user_form(&mut self) {
        self.user_form = None;
        self.form_error = None;
    }

    pub fn submit_user_form(&mut self) {
        let user = match self.user_form.as_ref().map(UserForm::to_new_user) {
            Some(Ok(user)) => user,
            Some(Err(e)) => {
                self.form_error = Some(e.to_string());
                return;
            }
            None => return,
        };
        self.form_error = None;

        self.spawn_request(move |api| async move {
            api.create_user(&user)
                .await
                .map_or_else(LoadResult::Failed, LoadResult::UserCreated)
        });
    }

    /// Path of the page that Enter opens from the current selection
    pub fn selected_link(&self) -> Option<String> {
        match self.current_page()? {
            Page::BookList => self.books.get(self.book_selection).map(|b| Page::BookDetail(b.id).path()),
            Page::MyCheckouts | Page::CheckoutManagement => self
                .selected_checkout()
                .map(|c| Page::BookDetail(c.book.id).path()),
            _ => None,
        }
    }

    // =========================================================================
    // List Selection
    // =========================================================================

    fn selection(&mut self) -> Option<(&mut usize, usize)> {
        match self.current_page()? {
            Page::BookList => Some((&mut self.book_selection, self.books.len())),
            Page::MyCheckouts | Page::CheckoutManagement => {
                Some((&mut self.checkout_selection, self.checkouts.len()))
            }
            Page::UserManagement => Some((&mut self.user_selection, self.users.len())),
            _ => None,
        }
    }

    pub fn select_next(&mut self, step: usize) {
        if let Some((selection, len)) = self.selection() {
            *selection = (*selection + step).min(len.saturating_sub(1));
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        if let Some((selection, _)) = self.selection() {
            *selection = selection.saturating_sub(step);
        }
    }

    pub fn select_first(&mut self) {
        if let Some((selection, _)) = self.selection() {
            *selection = 0;
        }
    }

    pub fn select_last(&mut self) {
        if let Some((selection, len)) = self.selection() {
            *selection = len.saturating_sub(1);
        }
    }
}

/// User-facing text for a failed login
pub fn login_error_message(error: &LoginError) -> String {
    match error {
        LoginError::Rejected(ApiError::Unauthorized) => "Invalid username or password".to_string(),
        LoginError::Rejected(ApiError::Validation(message)) => message.clone(),
        LoginError::Rejected(ApiError::RateLimited) => {
            "Too many attempts. Please wait and try again.".to_string()
        }
        LoginError::Rejected(ApiError::NetworkError(e)) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        LoginError::Rejected(ApiError::NetworkError(_)) => {
            "Unable to connect to server. Check the API address.".to_string()
        }
        LoginError::Rejected(ApiError::ServerError(_)) => {
            "The server had a problem. Please try again later.".to_string()
        }
        other => format!("Login failed: {}", other),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a character may be typed at the path prompt
pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_search_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SEARCH_LENGTH && is_valid_input_char(c)
}

pub fn can_add_field_char(current_len: usize, c: char, max_len: usize) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
