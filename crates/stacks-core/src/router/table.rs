use std::fmt;

use crate::access::AccessRule;
use crate::auth::Role;

use super::Page;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

const ANY_ROLE: &[Role] = &[Role::Student, Role::Librarian];
const STUDENT_ONLY: &[Role] = &[Role::Student];
const LIBRARIAN_ONLY: &[Role] = &[Role::Librarian];

/// Values captured from `:name` segments of a path pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(&'static str, String)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_id(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }
}

/// One row of the route table: a path pattern, its guard, and the page it
/// shows when the guard lets the user through.
#[derive(Clone, Copy)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub access: AccessRule,
    build: fn(&PathParams) -> Option<Page>,
}

impl RouteEntry {
    pub fn new(
        pattern: &'static str,
        access: AccessRule,
        build: fn(&PathParams) -> Option<Page>,
    ) -> Self {
        Self {
            pattern,
            access,
            build,
        }
    }

    /// Match a normalized path against the pattern, capturing parameters
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let pattern_segments: Vec<&'static str> = segments(self.pattern).collect();
        let path_segments: Vec<&str> = segments(path).collect();
        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (expected, actual) in pattern_segments.iter().zip(path_segments) {
            if let Some(name) = expected.strip_prefix(':') {
                if actual.is_empty() {
                    return None;
                }
                params.values.push((name, actual.to_string()));
            } else if *expected != actual {
                return None;
            }
        }
        Some(params)
    }

    /// Page for a matched path. `None` when a parameter does not make sense
    /// for the page (a non-numeric book id, say).
    pub fn page(&self, params: &PathParams) -> Option<Page> {
        (self.build)(params)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("access", &self.access)
            .finish()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Drop the query string, fragment and trailing slashes; always start with `/`
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}

/// The application's routes.
///
/// `/checkouts` appears twice with mutually exclusive guards; resolution
/// evaluates both, so the order of the two rows does not matter.
pub fn default_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new(LOGIN_PATH, AccessRule::Public, |_| Some(Page::Login)),
        RouteEntry::new(HOME_PATH, AccessRule::Roles(ANY_ROLE), |_| Some(Page::BookList)),
        RouteEntry::new("/books/new", AccessRule::Roles(LIBRARIAN_ONLY), |_| Some(Page::AddBook)),
        RouteEntry::new("/books/:id", AccessRule::Roles(ANY_ROLE), |p| {
            p.get_id("id").map(Page::BookDetail)
        }),
        RouteEntry::new("/checkouts", AccessRule::Roles(STUDENT_ONLY), |_| Some(Page::MyCheckouts)),
        RouteEntry::new("/checkouts", AccessRule::Roles(LIBRARIAN_ONLY), |_| {
            Some(Page::CheckoutManagement)
        }),
        RouteEntry::new("/users", AccessRule::Roles(LIBRARIAN_ONLY), |_| Some(Page::UserManagement)),
    ]
}
