//! Password hashing and bearer token issuance for login.

use crate::error::AppError;
use crate::settings::AuthSettings;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role_id: i64,
    pub exp: i64,
}

/// bcrypt on a blocking thread; hashing is CPU bound.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {}", e)))?
        .map_err(|e| AppError::Internal(format!("hash password: {}", e)))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::Internal(format!("verify task: {}", e)))
}

/// HS256 token for `user_id`, valid for `token_ttl_hours`.
pub fn issue_token(settings: &AuthSettings, user_id: i64, role_id: i64) -> Result<String, AppError> {
    let ttl = chrono::Duration::try_hours(settings.token_ttl_hours)
        .ok_or_else(|| AppError::Internal("token lifetime out of range".into()))?;
    let exp = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal("token expiry overflow".into()))?
        .timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role_id,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("issue token: {}", e)))
}
