use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::utils::error::{AppError, AppResult};

/// Tokens are valid for 100 hours and cannot be refreshed.
pub const TOKEN_VALIDITY_HOURS: i64 = 100;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub email: String,
    /// Role at issuance. Informational only: admission re-reads the role from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub iss: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct IssueTokenRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Signs and verifies session tokens with the configured HS256 secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl SessionTokens {
    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, &config.jwt_issuer)
    }

    pub fn issue(&self, email: &str, role: Option<String>) -> AppResult<String> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::InvalidRequest("email is required".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InvalidRequest(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature, expiry and issuer. Any failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AppError::Unauthorized
            })
    }
}

impl Claims {
    /// Rejects writes made on behalf of an account other than the token holder.
    pub fn ensure_acting_as(&self, email: &str) -> AppResult<()> {
        if self.email.trim().eq_ignore_ascii_case(email.trim()) {
            Ok(())
        } else {
            log::warn!("🚫 {} tried to act as {}", self.email, email);
            Err(AppError::Forbidden)
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
