use std::sync::OnceLock;

use crate::jwt::Credential;
use crate::jwt::IdentityClaims;
use crate::jwt::JwtError;
use crate::jwt::TokenConfig;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing with token
/// issuance and verification.
///
/// Issuer and verifier are built from the same [`TokenConfig`], so they
/// always agree on algorithm and secret.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_verifier: TokenVerifier,
    // Digest of a throwaway password, computed on first use
    decoy_hash: OnceLock<Option<String>>,
}

const DECOY_PASSWORD: &str = "decoy password with no account";

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(config),
            token_verifier: TokenVerifier::new(config),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against the stored digest, then issue a credential.
    ///
    /// A missing digest (federation-only account), a malformed digest and a
    /// wrong password are indistinguishable to the caller.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match or no digest is stored
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
        subject_id: impl ToString,
        email: &str,
    ) -> Result<Credential, AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash),
            None => {
                self.verify_decoy(password);
                false
            }
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_issuer.issue(subject_id, email)?)
    }

    /// Run one password verification against a throwaway digest.
    ///
    /// Callers rejecting an unknown account use this so the rejection costs
    /// the same Argon2 work as a wrong password. Never succeeds.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.password_hasher.hash(DECOY_PASSWORD).ok());

        if let Some(hash) = decoy {
            let _ = self.password_hasher.verify(password, hash);
        }
    }

    /// Issue a credential without password verification.
    ///
    /// For flows where identity was already established by other means
    /// (fresh registration, verified federated assertion).
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(
        &self,
        subject_id: impl ToString,
        email: &str,
    ) -> Result<Credential, JwtError> {
        self.token_issuer.issue(subject_id, email)
    }

    /// Validate and decode an issued token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Signature or format invalid
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        self.token_verifier.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(&TokenConfig::new(SecretString::from(
            "test_secret_key_at_least_32_bytes!",
        )))
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let credential = authenticator
            .authenticate(password, Some(&hash), "user123", "alice@example.com")
            .expect("Authentication failed");

        assert!(!credential.access_token.is_empty());

        let decoded = authenticator
            .validate_token(&credential.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.id, "user123");
        assert_eq!(decoded.email, "alice@example.com");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result =
            authenticator.authenticate("wrong_password", Some(&hash), "user123", "a@example.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_without_stored_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("anything", None, "user123", "a@example.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_missing_hash_still_runs_a_verification() {
        let authenticator = authenticator();
        assert!(authenticator.decoy_hash.get().is_none());

        let result = authenticator.authenticate("anything", None, "user123", "a@example.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));

        let decoy = authenticator.decoy_hash.get().and_then(Option::as_deref);
        assert!(decoy.is_some_and(|hash| hash.starts_with("$argon2id$")));
    }

    #[test]
    fn test_decoy_digest_is_computed_once() {
        let authenticator = authenticator();

        authenticator.verify_decoy("first guess");
        let first = authenticator.decoy_hash.get().cloned();
        authenticator.verify_decoy("second guess");
        let second = authenticator.decoy_hash.get().cloned();

        assert!(matches!(first, Some(Some(_))));
        assert_eq!(first, second);
    }

    #[test]
    fn test_authenticate_with_malformed_hash() {
        let authenticator = authenticator();

        let result =
            authenticator.authenticate("anything", Some("not-a-phc"), "user123", "a@example.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();

        let credential = authenticator
            .issue_token("user123", "alice@example.com")
            .expect("Failed to generate token");

        let decoded = authenticator
            .validate_token(&credential.access_token)
            .expect("Failed to validate token");

        assert_eq!(decoded, credential.claims);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}
