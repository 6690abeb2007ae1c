use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::common::error::{BackendError, Result};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Customer id.
    pub sub: i64,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// Issues and verifies the bearer tokens handed out at login.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_hours: i64,
}

impl TokenService {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        Self {
            secret,
            expiry_hours,
        }
    }

    /// Config via env: `JWT_SECRET` (required), `JWT_EXPIRY_HOURS`
    /// (default 24).
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| BackendError::Config("JWT_SECRET environment variable not set".into()))?;
        let expiry_hours = env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);
        Ok(Self::new(secret, expiry_hours))
    }

    pub fn issue(&self, customer_id: i64) -> Result<String> {
        let exp = Utc::now() + Duration::hours(self.expiry_hours);
        let claims = Claims {
            sub: customer_id,
            exp: exp.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| BackendError::Auth(format!("Failed to issue token: {e}")))
    }

    /// Returns the customer id the token was issued for.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| BackendError::Auth(format!("Invalid token: {e}")))?;
        Ok(data.claims.sub)
    }
}
