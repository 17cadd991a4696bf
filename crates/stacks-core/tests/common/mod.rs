//! Shared helpers for the integration tests

use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

/// Far-future `exp` so tokens never look stale in test output
const EXP: i64 = 4_102_444_800;

pub fn claims(id: i64, first_name: &str, role: &str) -> Value {
    json!({
        "token_type": "access",
        "exp": EXP,
        "jti": "0f8e1a",
        "user_id": id,
        "username": first_name.to_lowercase(),
        "first_name": first_name,
        "last_name": "Example",
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "user_type": role,
    })
}

/// A token as the API would sign it. The front end never sees the secret.
pub fn token(id: i64, first_name: &str, role: &str) -> String {
    encode(
        &Header::default(),
        &claims(id, first_name, role),
        &EncodingKey::from_secret(b"api-signing-secret"),
    )
    .unwrap()
}
