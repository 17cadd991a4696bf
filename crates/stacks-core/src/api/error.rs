use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - credentials rejected or session expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Flatten a `{"field": ["msg", ...]}` error body into
    /// `field: msg, msg; field: msg`. A lone `detail` is returned as is;
    /// anything that is not a JSON object falls back to the raw body.
    pub fn format_field_errors(body: &str) -> String {
        let parsed: Option<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(body).ok();

        let Some(fields) = parsed else {
            let body = body.trim();
            return if body.is_empty() {
                "Request was rejected".to_string()
            } else {
                Self::truncate_body(body)
            };
        };
        if fields.is_empty() {
            return "Request was rejected".to_string();
        }

        if let (1, Some(serde_json::Value::String(detail))) = (fields.len(), fields.get("detail")) {
            return detail.clone();
        }

        fields
            .iter()
            .map(|(key, value)| {
                let messages = match value {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}: {}", key, messages)
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::Validation(Self::format_field_errors(body)),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
