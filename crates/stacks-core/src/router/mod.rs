//! Path routing with role-based guards.
//!
//! The router owns the route table and answers one question per navigation:
//! given the session, what does this path show? Guard decisions come from
//! [`crate::access::decide`]; the navigation bar model in [`nav`] reads the
//! session directly and never goes through the guards.

pub mod nav;
pub mod table;

use tracing::{debug, warn};

use crate::access::{decide, AccessDecision};
use crate::auth::SessionStore;

pub use nav::{nav_bar, NavAccount, NavBar, NavLink};
pub use table::{default_routes, normalize_path, PathParams, RouteEntry, HOME_PATH, LOGIN_PATH};

/// Upper bound on redirects followed by `navigate`
const MAX_REDIRECTS: usize = 4;

/// Screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    BookList,
    BookDetail(i64),
    AddBook,
    MyCheckouts,
    CheckoutManagement,
    UserManagement,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::BookList => "Library Books",
            Page::BookDetail(_) => "Book Details",
            Page::AddBook => "Add New Book",
            Page::MyCheckouts => "My Checked Out Books",
            Page::CheckoutManagement => "Checkout Management",
            Page::UserManagement => "User Management",
        }
    }

    /// Canonical path for the page
    pub fn path(&self) -> String {
        match self {
            Page::Login => LOGIN_PATH.to_string(),
            Page::BookList => HOME_PATH.to_string(),
            Page::BookDetail(id) => format!("/books/{}", id),
            Page::AddBook => "/books/new".to_string(),
            Page::MyCheckouts | Page::CheckoutManagement => "/checkouts".to_string(),
            Page::UserManagement => "/users".to_string(),
        }
    }
}

/// What a single path resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The session has not been initialized yet; show an interim state
    Loading,
    Render(Page),
    Redirect(&'static str),
    NotFound,
}

/// Guard decision for one matching route entry
#[derive(Debug, Clone, Copy)]
pub struct GuardOutcome {
    pub entry: RouteEntry,
    pub page: Page,
    pub decision: AccessDecision,
}

/// Final location after following redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub resolution: Resolution,
}

pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_routes(default_routes())
    }

    pub fn with_routes(routes: Vec<RouteEntry>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Entries matching a normalized path, with the page each would show
    fn matching(&self, path: &str) -> Vec<(RouteEntry, Page)> {
        self.routes
            .iter()
            .filter_map(|entry| {
                let params = entry.match_path(path)?;
                entry.page(&params).map(|page| (*entry, page))
            })
            .collect()
    }

    /// Guard decision of every entry matching `path`. Public entries always
    /// proceed. Must not be called while the session is loading.
    pub fn evaluate(&self, session: &SessionStore, path: &str) -> Vec<GuardOutcome> {
        let path = normalize_path(path);
        self.matching(&path)
            .into_iter()
            .map(|(entry, page)| {
                let decision = if entry.access.is_public() {
                    AccessDecision::Proceed
                } else {
                    decide(session.current_identity(), entry.access.allowed_roles())
                };
                GuardOutcome {
                    entry,
                    page,
                    decision,
                }
            })
            .collect()
    }

    /// Resolve a path against the current session.
    ///
    /// Every matching entry is evaluated, so entries sharing a path are
    /// alternatives and their order in the table is irrelevant.
    pub fn resolve(&self, session: &SessionStore, path: &str) -> Resolution {
        let path = normalize_path(path);
        let matched = self.matching(&path);
        if matched.is_empty() {
            return Resolution::NotFound;
        }

        if let Some((_, page)) = matched.iter().find(|(entry, _)| entry.access.is_public()) {
            return Resolution::Render(*page);
        }

        if session.is_loading() {
            return Resolution::Loading;
        }

        let outcomes = self.evaluate(session, &path);
        let mut admitted = outcomes
            .iter()
            .filter(|o| o.decision == AccessDecision::Proceed);

        if let Some(outcome) = admitted.next() {
            if admitted.next().is_some() {
                warn!(path = %path, "More than one route admits this identity");
            }
            return Resolution::Render(outcome.page);
        }

        if outcomes
            .iter()
            .any(|o| o.decision == AccessDecision::RedirectToLogin)
        {
            Resolution::Redirect(LOGIN_PATH)
        } else {
            Resolution::Redirect(HOME_PATH)
        }
    }

    /// Resolve a path, following redirects to where the user ends up
    pub fn navigate(&self, session: &SessionStore, path: &str) -> Navigation {
        let mut current = normalize_path(path);

        for _ in 0..=MAX_REDIRECTS {
            match self.resolve(session, &current) {
                Resolution::Redirect(to) => {
                    debug!(from = %current, to, "Redirecting");
                    current = to.to_string();
                }
                resolution => {
                    return Navigation {
                        path: current,
                        resolution,
                    }
                }
            }
        }

        warn!(path = %path, "Redirect limit reached");
        Navigation {
            path: current,
            resolution: Resolution::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessRule;
    use crate::auth::token::testing::token_for;
    use crate::auth::{MemoryTokenStore, Role};

    fn session(role: Option<&str>) -> SessionStore {
        let slot = match role {
            Some(role) => MemoryTokenStore::with_token(&token_for(7, role)),
            None => MemoryTokenStore::new(),
        };
        let mut session = SessionStore::new(Box::new(slot));
        session.initialize();
        session
    }

    fn loading_session() -> SessionStore {
        SessionStore::new(Box::new(MemoryTokenStore::with_token(&token_for(7, "librarian"))))
    }

    #[test]
    fn test_guarded_paths_wait_for_initialization() {
        let router = Router::new();
        let session = loading_session();
        for path in ["/", "/books/1", "/checkouts", "/users", "/books/new"] {
            assert_eq!(router.resolve(&session, path), Resolution::Loading, "{}", path);
        }
    }

    #[test]
    fn test_login_renders_while_loading() {
        let router = Router::new();
        assert_eq!(
            router.resolve(&loading_session(), "/login"),
            Resolution::Render(Page::Login)
        );
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let router = Router::new();
        let session = session(None);
        for path in ["/", "/books/3", "/checkouts", "/users", "/books/new"] {
            assert_eq!(router.resolve(&session, path), Resolution::Redirect(LOGIN_PATH), "{}", path);
        }
        assert_eq!(router.resolve(&session, "/login"), Resolution::Render(Page::Login));
    }

    #[test]
    fn test_student_routes() {
        let router = Router::new();
        let session = session(Some("student"));

        assert_eq!(router.resolve(&session, "/"), Resolution::Render(Page::BookList));
        assert_eq!(router.resolve(&session, "/books/9"), Resolution::Render(Page::BookDetail(9)));
        assert_eq!(router.resolve(&session, "/checkouts"), Resolution::Render(Page::MyCheckouts));
        assert_eq!(router.resolve(&session, "/users"), Resolution::Redirect(HOME_PATH));
        assert_eq!(router.resolve(&session, "/books/new"), Resolution::Redirect(HOME_PATH));
    }

    #[test]
    fn test_librarian_routes() {
        let router = Router::new();
        let session = session(Some("librarian"));

        assert_eq!(router.resolve(&session, "/"), Resolution::Render(Page::BookList));
        assert_eq!(router.resolve(&session, "/books/9"), Resolution::Render(Page::BookDetail(9)));
        assert_eq!(router.resolve(&session, "/books/new"), Resolution::Render(Page::AddBook));
        assert_eq!(
            router.resolve(&session, "/checkouts"),
            Resolution::Render(Page::CheckoutManagement)
        );
        assert_eq!(router.resolve(&session, "/users"), Resolution::Render(Page::UserManagement));
    }

    #[test]
    fn test_checkouts_branches_are_exclusive() {
        let router = Router::new();
        for (role, admitted) in [("student", Page::MyCheckouts), ("librarian", Page::CheckoutManagement)] {
            let outcomes = router.evaluate(&session(Some(role)), "/checkouts");
            assert_eq!(outcomes.len(), 2);
            for outcome in outcomes {
                let expected = if outcome.page == admitted {
                    AccessDecision::Proceed
                } else {
                    AccessDecision::RedirectToHome
                };
                assert_eq!(outcome.decision, expected, "{} on {:?}", role, outcome.page);
            }
        }
    }

    #[test]
    fn test_resolution_ignores_table_order() {
        let mut reversed = default_routes();
        reversed.reverse();
        let forward = Router::new();
        let backward = Router::with_routes(reversed);

        for role in ["student", "librarian"] {
            let session = session(Some(role));
            for path in ["/", "/books/1", "/books/new", "/checkouts", "/users"] {
                assert_eq!(
                    forward.resolve(&session, path),
                    backward.resolve(&session, path),
                    "{} on {}",
                    role,
                    path
                );
            }
        }
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        let router = Router::new();
        let session = session(Some("librarian"));
        assert_eq!(router.resolve(&session, "/nowhere"), Resolution::NotFound);
        assert_eq!(router.resolve(&session, "/books"), Resolution::NotFound);
        assert_eq!(router.resolve(&session, "/books/abc"), Resolution::NotFound);
        assert_eq!(router.resolve(&session, "/books/1/extra"), Resolution::NotFound);
    }

    #[test]
    fn test_paths_are_normalized() {
        let router = Router::new();
        let session = session(Some("student"));
        assert_eq!(router.resolve(&session, "/books/5/"), Resolution::Render(Page::BookDetail(5)));
        assert_eq!(
            router.resolve(&session, "checkouts?page=2"),
            Resolution::Render(Page::MyCheckouts)
        );
    }

    #[test]
    fn test_navigate_follows_redirects() {
        let router = Router::new();

        let nav = router.navigate(&session(None), "/users");
        assert_eq!(nav.path, LOGIN_PATH);
        assert_eq!(nav.resolution, Resolution::Render(Page::Login));

        let nav = router.navigate(&session(Some("student")), "/users/");
        assert_eq!(nav.path, HOME_PATH);
        assert_eq!(nav.resolution, Resolution::Render(Page::BookList));

        let nav = router.navigate(&session(Some("librarian")), "/users");
        assert_eq!(nav.path, "/users");
        assert_eq!(nav.resolution, Resolution::Render(Page::UserManagement));
    }

    #[test]
    fn test_navigate_stops_on_redirect_cycle() {
        // Home itself redirects home for everyone: the loop must terminate
        const NOBODY: &[Role] = &[];
        let router = Router::with_routes(vec![RouteEntry::new(HOME_PATH, AccessRule::Roles(NOBODY), |_| {
            Some(Page::BookList)
        })]);
        let nav = router.navigate(&session(Some("student")), "/");
        assert_eq!(nav.resolution, Resolution::NotFound);
    }

    #[test]
    fn test_authenticated_rule_admits_every_role() {
        let router = Router::with_routes(vec![RouteEntry::new("/profile", AccessRule::Authenticated, |_| {
            Some(Page::BookList)
        })]);
        for role in Role::ALL {
            let session = session(Some(role.as_str()));
            assert_eq!(router.resolve(&session, "/profile"), Resolution::Render(Page::BookList));
        }
        assert_eq!(
            router.resolve(&session(None), "/profile"),
            Resolution::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn test_page_paths_resolve_back_to_page() {
        let router = Router::new();
        let librarian = session(Some("librarian"));
        for page in [Page::BookList, Page::BookDetail(4), Page::AddBook, Page::CheckoutManagement, Page::UserManagement] {
            assert_eq!(router.resolve(&librarian, &page.path()), Resolution::Render(page));
        }
        let student = session(Some("student"));
        assert_eq!(
            router.resolve(&student, &Page::MyCheckouts.path()),
            Resolution::Render(Page::MyCheckouts)
        );
    }
}
