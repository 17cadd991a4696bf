//! Shared fixtures for the unit tests.

use stacks_core::auth::MemoryTokenStore;
use stacks_core::{Config, SessionStore};

use crate::app::App;

/// App against an unreachable API, backed by `slot`
pub fn app_with_slot(slot: MemoryTokenStore) -> App {
    let config = Config {
        api_url: Some("http://127.0.0.1:9/api".to_string()),
        ..Config::default()
    };
    App::new(config, SessionStore::new(Box::new(slot))).unwrap()
}

/// Token carrying the claims the session decodes
pub fn test_token(id: i64, role: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let claims = serde_json::json!({
        "user_id": id,
        "username": format!("user{}", id),
        "first_name": "Test",
        "last_name": "User",
        "email": format!("user{}@example.com", id),
        "user_type": role,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap()
}
