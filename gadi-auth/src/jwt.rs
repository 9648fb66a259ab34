//! Access tokens.

use std::collections::HashMap;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use gadi_core::errors::{GadiError, GadiResult};
use gadi_core::tenant::{GarageId, TenantScope};

use crate::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: String,
    /// The garage the principal belongs to; absent for platform users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garage: Option<GarageId>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 issue/verify with the scope check built in.
pub struct TokenIssuer {
    secret: String,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn issue(&self, user: &User) -> GadiResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user.id.clone(),
            garage: user.garage,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| anyhow::anyhow!(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> GadiResult<AccessClaims> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| GadiError::not_authenticated("Invalid access token.").into_anyhow())
    }

    /// Verify and additionally require the token's garage claim to match
    /// the request scope. A platform token presented on a garage host
    /// (or vice versa) is treated exactly like an invalid token.
    pub fn verify_for_scope(&self, token: &str, scope: &TenantScope) -> GadiResult<AccessClaims> {
        let claims = self.verify(token)?;

        let matches = match scope {
            TenantScope::Platform => claims.garage.is_none(),
            TenantScope::Garage(id) => claims.garage == Some(*id),
        };

        if !matches {
            return Err(GadiError::not_authenticated("Invalid access token.").into_anyhow());
        }

        Ok(claims)
    }
}

/// `Authorization: Bearer <token>` extraction from lowercased-or-not
/// header maps.
pub fn extract_bearer_token(headers: &HashMap<String, String>) -> Option<String> {
    let v = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?;
    let v = v.trim();
    let prefix = "Bearer ";
    if v.len() <= prefix.len() || !v.starts_with(prefix) {
        return None;
    }
    Some(v[prefix.len()..].trim().to_string())
}
