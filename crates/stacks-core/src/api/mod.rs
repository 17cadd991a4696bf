//! REST API client module for the library service.
//!
//! This module provides the `ApiClient` for the catalog, checkout and user
//! endpoints, plus the authentication endpoint the session store logs in
//! through.
//!
//! The API uses JWT bearer token authentication; tokens come from
//! `POST /token/`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
