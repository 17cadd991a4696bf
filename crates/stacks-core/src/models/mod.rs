//! Records exchanged with the library API.
//!
//! - `Book`, `NewBook`: catalog entries and the add-book payload
//! - `Checkout`, `CheckoutFilter`: loan records and the management filter
//! - `User`, `NewUser`: accounts and the create-user payload
//!
//! Field names follow the API's snake_case JSON.

pub mod book;
pub mod checkout;
pub mod user;

use thiserror::Error;

pub use book::{Book, NewBook};
pub use checkout::{BookSummary, Checkout, CheckoutFilter, StudentSummary};
pub use user::{NewUser, User};

/// A form value the API would reject
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "This field is required."))
    } else {
        Ok(())
    }
}
