use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity token payload.
///
/// Deliberately minimal: the subject id and email plus the standard
/// issued-at/expiry timestamps (Unix seconds). Mutable profile fields such as
/// the privilege level are never embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Subject identifier
    pub id: String,

    /// Subject email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// Create claims for a subject, valid for `ttl` from `issued_at`.
    pub fn new(
        id: impl ToString,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expiration = issued_at + ttl;

        Self {
            id: id.to_string(),
            email: email.into(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}
