//! Admin API credentials and the short-lived tokens signed from them.
//!
//! An admin key has the shape `<id>:<secret-hex>`. Tokens carry the key id in
//! the `kid` header and are signed with HS256 over the hex-decoded secret.

use std::fmt;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AdminError;

/// Audience claim the admin API expects.
pub const ADMIN_AUDIENCE: &str = "/admin/";
/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 5 * 60;

/// A parsed admin API key.
#[derive(Clone)]
pub struct AdminKey {
    id: String,
    secret: Vec<u8>,
}

impl AdminKey {
    pub fn parse(raw: &str) -> Result<Self, AdminError> {
        let raw = raw.trim();
        let (id, secret) = raw
            .split_once(':')
            .ok_or_else(|| AdminError::invalid_key("expected `<id>:<secret>`"))?;
        if secret.contains(':') {
            return Err(AdminError::invalid_key(
                "expected exactly one `:` between id and secret",
            ));
        }
        if id.is_empty() {
            return Err(AdminError::invalid_key("key id is empty"));
        }
        if secret.is_empty() {
            return Err(AdminError::invalid_key("secret is empty"));
        }

        let secret = hex::decode(secret)
            .map_err(|err| AdminError::invalid_key(format!("secret is not valid hex: {err}")))?;

        Ok(Self {
            id: id.to_string(),
            secret,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

impl AdminClaims {
    pub fn issued_at(iat: i64) -> Self {
        Self {
            iat,
            exp: iat.saturating_add(TOKEN_TTL_SECS),
            aud: ADMIN_AUDIENCE.to_string(),
        }
    }
}

/// A signed admin token ready for the `Authorization: Ghost <token>` header.
#[derive(Clone)]
pub struct AdminToken {
    encoded: String,
    claims: AdminClaims,
}

impl AdminToken {
    pub fn issue(key: &AdminKey, issued_at: i64) -> Result<Self, AdminError> {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(key.id().to_string());

        let claims = AdminClaims::issued_at(issued_at);
        let encoded = encode(&header, &claims, &EncodingKey::from_secret(key.secret()))?;
        Ok(Self { encoded, claims })
    }

    pub fn issue_now(key: &AdminKey) -> Result<Self, AdminError> {
        Self::issue(key, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn claims(&self) -> &AdminClaims {
        &self.claims
    }

    pub fn authorization(&self) -> String {
        format!("Ghost {}", self.encoded)
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminToken")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}
