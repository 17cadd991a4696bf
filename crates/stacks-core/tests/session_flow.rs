//! Session lifecycle end to end: startup restore, login against a mock API,
//! logout, and what the router makes of each state.

mod common;

use serde_json::json;
use stacks_core::access::AccessDecision;
use stacks_core::auth::{FileTokenStore, LoginError, MemoryTokenStore, TokenStore};
use stacks_core::router::{nav_bar, HOME_PATH, LOGIN_PATH};
use stacks_core::{ApiClient, ApiError, Page, Resolution, Role, Router, SessionStore};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn started(slot: MemoryTokenStore) -> SessionStore {
    let mut session = SessionStore::new(Box::new(slot));
    session.initialize();
    session
}

async fn token_endpoint(server: &MockServer, username: &str, password: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": username, "password": password})))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri())).unwrap()
}

#[test]
fn test_startup_without_token_redirects_to_login() {
    let router = Router::new();
    let mut session = SessionStore::new(Box::new(MemoryTokenStore::new()));
    assert!(session.is_loading());
    assert_eq!(router.resolve(&session, "/users"), Resolution::Loading);

    session.initialize();

    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
    assert_eq!(router.resolve(&session, "/users"), Resolution::Redirect(LOGIN_PATH));
}

#[test]
fn test_startup_with_librarian_token_takes_librarian_branch() {
    let router = Router::new();
    let session = started(MemoryTokenStore::with_token(&common::token(3, "Marian", "librarian")));

    assert_eq!(session.current_identity().map(|i| i.role), Some(Role::Librarian));
    assert_eq!(
        router.resolve(&session, "/checkouts"),
        Resolution::Render(Page::CheckoutManagement)
    );

    let outcomes = router.evaluate(&session, "/checkouts");
    let librarian = outcomes.iter().find(|o| o.page == Page::CheckoutManagement).unwrap();
    let student = outcomes.iter().find(|o| o.page == Page::MyCheckouts).unwrap();
    assert_eq!(librarian.decision, AccessDecision::Proceed);
    assert_eq!(student.decision, AccessDecision::RedirectToHome);
}

#[test]
fn test_startup_with_garbage_token_clears_slot() {
    let unknown_role = common::token(1, "Nobody", "janitor");
    for bad in ["garbage", "a.b.c", "", unknown_role.as_str()] {
        let slot = MemoryTokenStore::with_token(bad);
        let session = started(slot.clone());
        assert!(!session.is_authenticated(), "{:?}", bad);
        assert_eq!(slot.peek(), None, "{:?}", bad);
    }
}

#[test]
fn test_startup_restores_from_file_slot() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path());
    store.save(&common::token(11, "Harold", "student")).unwrap();

    let mut session = SessionStore::new(Box::new(FileTokenStore::new(dir.path())));
    session.initialize();

    let identity = session.current_identity().unwrap();
    assert_eq!(identity.id, 11);
    assert_eq!(identity.first_name, "Harold");
    assert!(session.expires_at().is_some());
}

#[test]
fn test_startup_with_unreadable_file_slot_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path());
    std::fs::write(store.path(), [0xff, 0xfe, b'.', 0x80]).unwrap();

    let mut session = SessionStore::new(Box::new(FileTokenStore::new(dir.path())));
    session.initialize();

    assert!(!session.is_authenticated());
    assert!(!session.is_loading());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_rejected_login_leaves_session_unchanged() {
    let server = MockServer::start().await;
    token_endpoint(
        &server,
        "alice",
        "wrong",
        ResponseTemplate::new(401)
            .set_body_json(json!({"detail": "No active account found with the given credentials"})),
    )
    .await;

    let slot = MemoryTokenStore::new();
    let mut session = started(slot.clone());
    let before = session.is_authenticated();

    let result = session.login(&client_for(&server), "alice", "wrong").await;

    assert!(matches!(result, Err(LoginError::Rejected(ApiError::Unauthorized))));
    assert_eq!(session.is_authenticated(), before);
    assert_eq!(slot.peek(), None);
}

#[tokio::test]
async fn test_rejected_login_keeps_existing_session() {
    let server = MockServer::start().await;
    token_endpoint(&server, "alice", "wrong", ResponseTemplate::new(401)).await;

    let existing = common::token(3, "Marian", "librarian");
    let slot = MemoryTokenStore::with_token(&existing);
    let mut session = started(slot.clone());

    let result = session.login(&client_for(&server), "alice", "wrong").await;

    assert!(result.is_err());
    assert_eq!(session.current_identity().map(|i| i.id), Some(3));
    assert_eq!(slot.peek(), Some(existing));
}

#[tokio::test]
async fn test_login_with_undecodable_token_fails() {
    let server = MockServer::start().await;
    token_endpoint(
        &server,
        "alice",
        "correct",
        ResponseTemplate::new(200).set_body_json(json!({"access": "not-a-jwt", "refresh": "x"})),
    )
    .await;

    let slot = MemoryTokenStore::new();
    let mut session = started(slot.clone());
    let result = session.login(&client_for(&server), "alice", "correct").await;

    assert!(matches!(result, Err(LoginError::InvalidToken(_))));
    assert!(!session.is_authenticated());
    assert_eq!(slot.peek(), None);
}

#[tokio::test]
async fn test_student_login_persists_token_and_is_kept_from_users() {
    let server = MockServer::start().await;
    let issued = common::token(7, "Alice", "student");
    token_endpoint(
        &server,
        "alice",
        "correct",
        ResponseTemplate::new(200).set_body_json(json!({"access": issued, "refresh": "r"})),
    )
    .await;

    let router = Router::new();
    let slot = MemoryTokenStore::new();
    let mut session = started(slot.clone());

    session.login(&client_for(&server), "alice", "correct").await.unwrap();

    assert_eq!(slot.peek(), Some(issued.clone()));
    assert_eq!(session.token(), Some(issued.as_str()));
    let identity = session.current_identity().unwrap();
    assert_eq!(identity.id, 7);
    assert_eq!(identity.role, Role::Student);
    assert_eq!(router.resolve(&session, "/users"), Resolution::Redirect(HOME_PATH));

    let nav = router.navigate(&session, "/users");
    assert_eq!(nav.path, HOME_PATH);
    assert_eq!(nav.resolution, Resolution::Render(Page::BookList));
}

#[tokio::test]
async fn test_login_then_restart_restores_session() {
    let server = MockServer::start().await;
    token_endpoint(
        &server,
        "marian",
        "pw",
        ResponseTemplate::new(200).set_body_json(json!({"access": common::token(3, "Marian", "librarian")})),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut session = SessionStore::new(Box::new(FileTokenStore::new(dir.path())));
    session.initialize();
    session.login(&client_for(&server), "marian", "pw").await.unwrap();

    let mut restarted = SessionStore::new(Box::new(FileTokenStore::new(dir.path())));
    restarted.initialize();
    assert_eq!(restarted.current_identity(), session.current_identity());
}

#[test]
fn test_logout_clears_everything_and_is_idempotent() {
    let router = Router::new();
    let slot = MemoryTokenStore::with_token(&common::token(3, "Marian", "librarian"));
    let mut session = started(slot.clone());
    assert!(session.is_authenticated());

    session.logout();
    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
    assert_eq!(slot.peek(), None);
    let once = (session.is_authenticated(), nav_bar(&session));

    session.logout();
    assert_eq!((session.is_authenticated(), nav_bar(&session)), once);
    assert_eq!(router.resolve(&session, "/checkouts"), Resolution::Redirect(LOGIN_PATH));
}
