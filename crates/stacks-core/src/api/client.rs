//! API client for communicating with the library REST API.
//!
//! This module provides the `ApiClient` struct for obtaining tokens and for
//! the catalog, checkout and user requests made by the pages.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Book, Checkout, CheckoutFilter, NewBook, NewUser, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
}

/// List endpoints answer with a bare array, or a page object when the
/// server has pagination switched on.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) | ListResponse::Paged { results: items } => items,
        }
    }
}

/// API client for the library service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Any non-success status is returned as the matching `ApiError`.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("/token/");
        debug!(username, "Requesting token");

        let response = self
            .client
            .post(&url)
            .json(&TokenRequest { username, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body: TokenResponse = Self::read_json(response, &url).await?;
        Ok(body.access)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    /// Send an authorized request, backing off and retrying on 429
    async fn send<F>(&self, url: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.authorize(build()).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(&url, || self.client.get(&url).query(query)).await?;
        Self::read_json(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(&url, || self.client.post(&url).json(body)).await?;
        Self::read_json(response, &url).await
    }

    /// POST with no body where only the status matters
    async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.send(&url, || self.client.post(&url)).await?;
        Ok(())
    }

    // ===== Catalog =====

    /// List books, optionally filtered by a free-text search
    pub async fn list_books(&self, search: &str) -> Result<Vec<Book>, ApiError> {
        let search = search.trim();
        let query: Vec<(&str, &str)> = if search.is_empty() {
            Vec::new()
        } else {
            vec![("search", search)]
        };
        let books: ListResponse<Book> = self.get("/books/", &query).await?;
        Ok(books.into_vec())
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, ApiError> {
        self.get(&format!("/books/{}/", id), &[]).await
    }

    pub async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        self.post("/books/", book).await
    }

    /// Check out one copy of a book for the signed-in student
    pub async fn checkout_book(&self, id: i64) -> Result<(), ApiError> {
        self.post_action(&format!("/books/{}/checkout/", id)).await
    }

    // ===== Checkouts =====

    /// List checkouts. Students get their own; librarians get everyone's,
    /// narrowed by `filter` and `search`.
    pub async fn list_checkouts(
        &self,
        filter: CheckoutFilter,
        search: &str,
    ) -> Result<Vec<Checkout>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(is_returned) = filter.is_returned_param() {
            query.push(("is_returned", is_returned));
        }
        let search = search.trim();
        if !search.is_empty() {
            query.push(("search", search));
        }
        let checkouts: ListResponse<Checkout> = self.get("/checkouts/", &query).await?;
        Ok(checkouts.into_vec())
    }

    pub async fn return_checkout(&self, id: i64) -> Result<(), ApiError> {
        self.post_action(&format!("/checkouts/{}/return_book/", id)).await
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users: ListResponse<User> = self.get("/users/", &[]).await?;
        Ok(users.into_vec())
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        debug!(user = %user.redacted(), "Creating user");
        self.post("/users/", user).await
    }
}
