//! JWT issuing and verification.
//!
//! Access tokens carry the user's identity, role and permission list. Refresh
//! tokens carry only the subject plus a random `jti`, and are signed with a
//! separate secret so one can never be passed off as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use util::config::AppConfig;
use uuid::Uuid;

use crate::error::ServiceResult;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: String,
    /// May be empty for tokens minted without a resolved list; the permission
    /// middleware then loads it from the role.
    #[serde(default)]
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            access_secret: config.jwt_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            access_ttl: Duration::minutes(config.jwt_duration_minutes),
            refresh_ttl: Duration::days(config.refresh_token_duration_days),
        }
    }
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue_access(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        permissions: Vec<String>,
    ) -> ServiceResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: user_id.to_owned(),
            username: username.to_owned(),
            role: role.to_owned(),
            permissions,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn issue_refresh(&self, user_id: &str) -> ServiceResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            sub: user_id.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn decode_access(&self, token: &str) -> ServiceResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &validation())?;
        Ok(data.claims)
    }

    pub fn decode_refresh(&self, token: &str) -> ServiceResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())?;
        Ok(data.claims)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}
