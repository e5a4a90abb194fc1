use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use secrecy::ExposeSecret;

use super::claims::IdentityClaims;
use super::config::TokenConfig;
use super::errors::JwtError;
use super::ALGORITHM;

/// A signed identity token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Compact JWS string handed to the client
    pub access_token: String,
    pub claims: IdentityClaims,
}

/// Issues HS256-signed identity tokens.
///
/// Issuing is a pure computation: no I/O, no shared mutable state.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            ttl: config.ttl,
        }
    }

    /// Issue a credential for a subject, valid from now for the configured window.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject_id: impl ToString, email: &str) -> Result<Credential, JwtError> {
        self.issue_at(subject_id, email, Utc::now())
    }

    /// Issue a credential as if the current time were `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_at(
        &self,
        subject_id: impl ToString,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Credential, JwtError> {
        let claims = IdentityClaims::new(subject_id, email, issued_at, self.ttl);
        let header = Header::new(ALGORITHM);

        let access_token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(Credential {
            access_token,
            claims,
        })
    }
}
