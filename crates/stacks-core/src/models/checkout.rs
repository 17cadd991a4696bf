use serde::{Deserialize, Serialize};

use crate::utils::format_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl StudentSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// One loan of one book copy.
///
/// The student is omitted when a student lists their own checkouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub id: i64,
    #[serde(default)]
    pub student: Option<StudentSummary>,
    pub book: BookSummary,
    pub checkout_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub is_returned: bool,
}

impl Checkout {
    pub fn status_display(&self) -> &'static str {
        if self.is_returned {
            "Returned"
        } else {
            "Checked Out"
        }
    }

    pub fn checkout_date_display(&self) -> String {
        format_date(&self.checkout_date)
    }

    pub fn return_date_display(&self) -> String {
        match self.return_date {
            Some(ref date) => format_date(date),
            None => "Not returned".to_string(),
        }
    }

    pub fn student_display(&self) -> String {
        self.student
            .as_ref()
            .map(|s| s.full_name())
            .unwrap_or_default()
    }
}

/// Which checkouts the management page lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutFilter {
    All,
    #[default]
    Active,
    Returned,
}

impl CheckoutFilter {
    /// Value of the `is_returned` query parameter, `None` for no filter
    pub fn is_returned_param(&self) -> Option<&'static str> {
        match self {
            CheckoutFilter::All => None,
            CheckoutFilter::Active => Some("false"),
            CheckoutFilter::Returned => Some("true"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckoutFilter::All => "All",
            CheckoutFilter::Active => "Active Checkouts",
            CheckoutFilter::Returned => "Returned Books",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CheckoutFilter::All => CheckoutFilter::Active,
            CheckoutFilter::Active => CheckoutFilter::Returned,
            CheckoutFilter::Returned => CheckoutFilter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_management_checkout() {
        let json = r#"{
            "id": 12,
            "student": {"id": 7, "first_name": "Alice", "last_name": "Liddell"},
            "book": {"id": 3, "title": "Dune"},
            "checkout_date": "2024-03-01T09:30:00Z",
            "return_date": null,
            "is_returned": false
        }"#;
        let checkout: Checkout = serde_json::from_str(json).unwrap();
        assert_eq!(checkout.student_display(), "Alice Liddell");
        assert_eq!(checkout.book.author, None);
        assert_eq!(checkout.status_display(), "Checked Out");
        assert_eq!(checkout.checkout_date_display(), "Mar 01, 2024");
        assert_eq!(checkout.return_date_display(), "Not returned");
    }

    #[test]
    fn test_parse_own_checkout_without_student() {
        let json = r#"{
            "id": 5,
            "book": {"id": 3, "title": "Dune", "author": "Frank Herbert"},
            "checkout_date": "2024-03-01",
            "return_date": "2024-03-15",
            "is_returned": true
        }"#;
        let checkout: Checkout = serde_json::from_str(json).unwrap();
        assert_eq!(checkout.student, None);
        assert_eq!(checkout.student_display(), "");
        assert_eq!(checkout.book.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(checkout.status_display(), "Returned");
        assert_eq!(checkout.return_date_display(), "2024-03-15");
    }

    #[test]
    fn test_filter_params() {
        assert_eq!(CheckoutFilter::default(), CheckoutFilter::Active);
        assert_eq!(CheckoutFilter::All.is_returned_param(), None);
        assert_eq!(CheckoutFilter::Active.is_returned_param(), Some("false"));
        assert_eq!(CheckoutFilter::Returned.is_returned_param(), Some("true"));
    }

    #[test]
    fn test_filter_next_wraps() {
        assert_eq!(CheckoutFilter::All.next(), CheckoutFilter::Active);
        assert_eq!(CheckoutFilter::Active.next(), CheckoutFilter::Returned);
        assert_eq!(CheckoutFilter::Returned.next(), CheckoutFilter::All);
    }
}
