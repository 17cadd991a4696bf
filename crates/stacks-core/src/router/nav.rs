use crate::auth::{Role, SessionStore};

use super::{HOME_PATH, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

/// Right-hand side of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAccount {
    /// Session not initialized yet: show nothing
    Pending,
    SignedIn { first_name: String, role: Role },
    SignedOut { login: NavLink },
}

impl NavAccount {
    pub fn label(&self) -> Option<String> {
        match self {
            NavAccount::Pending => None,
            NavAccount::SignedIn { first_name, role } => {
                Some(format!("Signed in as: {} ({})", first_name, role))
            }
            NavAccount::SignedOut { login } => Some(login.label.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBar {
    pub links: Vec<NavLink>,
    pub account: NavAccount,
}

const BOOKS: NavLink = NavLink { label: "Books", path: HOME_PATH };
const MY_CHECKOUTS: NavLink = NavLink { label: "My Checkouts", path: "/checkouts" };
const USERS: NavLink = NavLink { label: "Users", path: "/users" };
const CHECKOUTS: NavLink = NavLink { label: "Checkouts", path: "/checkouts" };
const ADD_BOOK: NavLink = NavLink { label: "Add Book", path: "/books/new" };
const LOGIN: NavLink = NavLink { label: "Login", path: LOGIN_PATH };

/// Navigation bar for the current session.
///
/// Display only: it reads identity directly and does not consult route
/// guards, so a link here is never a promise that the route will admit the
/// user.
pub fn nav_bar(session: &SessionStore) -> NavBar {
    let mut links = vec![BOOKS];

    if session.is_loading() {
        return NavBar {
            links,
            account: NavAccount::Pending,
        };
    }

    let account = match session.current_identity() {
        Some(identity) => {
            match identity.role {
                Role::Student => links.push(MY_CHECKOUTS),
                Role::Librarian => links.extend([USERS, CHECKOUTS, ADD_BOOK]),
            }
            NavAccount::SignedIn {
                first_name: identity.first_name.clone(),
                role: identity.role,
            }
        }
        None => NavAccount::SignedOut { login: LOGIN },
    };

    NavBar { links, account }
}
