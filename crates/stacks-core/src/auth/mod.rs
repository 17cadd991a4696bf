//! Authentication state for the front end.
//!
//! This module provides:
//! - `Identity` / `Role`: the signed-in principal
//! - `token`: decoding of the bearer token issued by the API
//! - `TokenStore`: the single persisted slot holding that token
//! - `SessionStore`: login/logout and identity queries
//!
//! The token's expiry is decoded for display only; the API enforces it.

pub mod identity;
pub mod session;
pub mod storage;
pub mod token;

pub use identity::{Identity, Role, UnknownRole};
pub use session::{LoginError, SessionStore};
pub use storage::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use token::{decode_token, DecodeError, DecodedToken};
