use serde::{Deserialize, Serialize};

use super::{require, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    /// Omitted by some list endpoints
    #[serde(default)]
    pub isbn: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// "2/5" style availability
    pub fn availability_short(&self) -> String {
        format!("{}/{}", self.available_copies, self.total_copies)
    }

    pub fn availability_display(&self) -> String {
        format!("{} of {} available", self.available_copies, self.total_copies)
    }
}

/// Payload for adding a book to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub total_copies: i32,
}

impl Default for NewBook {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            isbn: String::new(),
            total_copies: 1,
        }
    }
}

impl NewBook {
    /// Check the fields the API validates, first failure wins
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("author", &self.author)?;
        require("genre", &self.genre)?;
        require("isbn", &self.isbn)?;

        let digits = isbn_digits(&self.isbn);
        let well_formed = self
            .isbn
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == ' ');
        if !well_formed || !matches!(digits.len(), 10 | 13) {
            return Err(ValidationError::new("isbn", "Must be 10 or 13 digits"));
        }

        if self.total_copies < 1 {
            return Err(ValidationError::new("total_copies", "Must be at least 1"));
        }
        Ok(())
    }

    /// Copy with whitespace trimmed and the ISBN reduced to digits
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            isbn: isbn_digits(&self.isbn),
            total_copies: self.total_copies,
        }
    }
}

fn isbn_digits(isbn: &str) -> String {
    isbn.chars().filter(|c| c.is_ascii_digit()).collect()
}
