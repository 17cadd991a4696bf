//! `ApiClient` against a mock API

mod common;

use serde_json::json;
use stacks_core::models::{CheckoutFilter, NewBook, NewUser};
use stacks_core::{ApiClient, ApiError, Role};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "bearer-token";

async fn authed_client(server: &MockServer) -> ApiClient {
    let mut client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
    client.set_token(TOKEN.to_string());
    client
}

fn book_json(id: i64, available: i32) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Dune",
        "author": "Frank Herbert",
        "genre": "Science Fiction",
        "isbn": "9780441172719",
        "total_copies": 3,
        "available_copies": available,
    })
}

#[tokio::test]
async fn test_list_books_sends_search_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books/"))
        .and(query_param("search", "dune"))
        .and(header("Authorization", "Bearer bearer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([book_json(1, 2), book_json(2, 0)])))
        .expect(1)
        .mount(&server)
        .await;

    let books = authed_client(&server).await.list_books("  dune ").await.unwrap();
    assert_eq!(books.len(), 2);
    assert!(books[0].is_available());
    assert!(!books[1].is_available());
}

#[tokio::test]
async fn test_list_books_accepts_paged_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [book_json(5, 1)],
        })))
        .mount(&server)
        .await;

    let books = authed_client(&server).await.list_books("").await.unwrap();
    assert_eq!(books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![5]);
}

#[tokio::test]
async fn test_get_book_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let err = authed_client(&server).await.get_book(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_create_book_reports_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/books/"))
        .and(body_json(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Science Fiction",
            "isbn": "9780441172719",
            "total_copies": 2,
        })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"isbn": ["book with this isbn already exists."]})),
        )
        .mount(&server)
        .await;

    let book = NewBook {
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        genre: "Science Fiction".to_string(),
        isbn: "9780441172719".to_string(),
        total_copies: 2,
    };
    let err = authed_client(&server).await.create_book(&book).await.unwrap_err();
    assert_eq!(err.to_string(), "isbn: book with this isbn already exists.");
}

#[tokio::test]
async fn test_checkout_book_ignores_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/books/4/checkout/"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    authed_client(&server).await.checkout_book(4).await.unwrap();
}

#[tokio::test]
async fn test_checkout_unavailable_book_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/books/4/checkout/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "No copies available."})))
        .mount(&server)
        .await;

    let err = authed_client(&server).await.checkout_book(4).await.unwrap_err();
    assert_eq!(err.to_string(), "No copies available.");
}

#[tokio::test]
async fn test_list_checkouts_applies_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/"))
        .and(query_param("is_returned", "false"))
        .and(query_param("search", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 12,
            "student": {"id": 7, "first_name": "Alice", "last_name": "Liddell"},
            "book": {"id": 3, "title": "Dune"},
            "checkout_date": "2024-03-01T09:30:00Z",
            "return_date": null,
            "is_returned": false,
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let checkouts = authed_client(&server)
        .await
        .list_checkouts(CheckoutFilter::Active, "alice")
        .await
        .unwrap();
    assert_eq!(checkouts.len(), 1);
    assert_eq!(checkouts[0].student_display(), "Alice Liddell");
}

#[tokio::test]
async fn test_return_checkout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkouts/12/return_book/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "book returned"})))
        .expect(1)
        .mount(&server)
        .await;

    authed_client(&server).await.return_checkout(12).await.unwrap();
}

#[tokio::test]
async fn test_users_require_librarian() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .mount(&server)
        .await;

    let err = authed_client(&server).await.list_users().await.unwrap_err();
    assert!(matches!(err, ApiError::AccessDenied(_)));
}

#[tokio::test]
async fn test_create_user_sends_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/"))
        .and(body_json(json!({
            "username": "marian",
            "password": "pw12345",
            "first_name": "Marian",
            "last_name": "Paroo",
            "email": "marian@river.city",
            "user_type": "librarian",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9,
            "username": "marian",
            "first_name": "Marian",
            "last_name": "Paroo",
            "email": "marian@river.city",
            "user_type": "librarian",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = NewUser {
        username: "marian".to_string(),
        password: "pw12345".to_string(),
        first_name: "Marian".to_string(),
        last_name: "Paroo".to_string(),
        email: "marian@river.city".to_string(),
        user_type: Role::Librarian,
    };
    let created = authed_client(&server).await.create_user(&user).await.unwrap();
    assert_eq!(created.id, 9);
    assert_eq!(created.user_type, Role::Librarian);
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let users = authed_client(&server).await.list_users().await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_unparseable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = authed_client(&server).await.get_book(1).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_obtain_token_returns_access() {
    let server = MockServer::start().await;
    let issued = common::token(7, "Alice", "student");
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refresh": "r", "access": issued})))
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/api/", server.uri())).unwrap();
    assert_eq!(client.obtain_token("alice", "correct").await.unwrap(), issued);
}
