use actix_web::{http::header, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while resolving the session user
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session token provided")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by session tokens issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: usize,
}

/// Verifies HS256 session tokens and yields the user id they were issued for
///
/// Tokens are read from the session cookie, falling back to a bearer
/// `Authorization` header.
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl SessionVerifier {
    pub fn new(secret: &str, cookie_name: impl Into<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            cookie_name: cookie_name.into(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.user_id)
    }

    pub fn extract_token(&self, req: &HttpRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(&self.cookie_name) {
            return Some(cookie.value().to_string());
        }

        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    }

    pub fn authenticate(&self, req: &HttpRequest) -> Result<String, AuthError> {
        let token = self.extract_token(req).ok_or(AuthError::MissingToken)?;
        self.verify(&token)
    }
}
