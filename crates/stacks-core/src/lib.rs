//! Core library for Stacks, a front end for a library-management API.
//!
//! - `auth`: identity, token decoding, token storage and the session store
//! - `access`: the route access policy
//! - `router`: route table, path resolution and navigation bar model
//! - `api`: HTTP client for the remote catalog/checkout/user API
//! - `models`: records exchanged with the API
//! - `config`: persisted user preferences

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use access::{decide, AccessDecision, AccessRule};
pub use api::{ApiClient, ApiError};
pub use auth::{Identity, LoginError, Role, SessionStore};
pub use config::Config;
pub use router::{Page, Resolution, Router};
