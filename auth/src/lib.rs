//! Credential issuance and verification library
//!
//! Provides the security-relevant building blocks of the identity service:
//! - Password hashing (Argon2id)
//! - Identity token issuance and validation (HS256 JWT, one hour lifetime)
//! - Federated ID token verification against a provider's published keys
//! - Authentication coordination
//!
//! The crate carries no domain types; services adapt these primitives behind
//! their own ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::{TokenConfig, TokenIssuer, TokenVerifier};
//! use secrecy::SecretString;
//!
//! let config = TokenConfig::new(SecretString::from("secret_key_at_least_32_bytes_long!"));
//! let issuer = TokenIssuer::new(&config);
//! let verifier = TokenVerifier::new(&config);
//!
//! let credential = issuer.issue("user123", "alice@example.com").unwrap();
//! let claims = verifier.verify(&credential.access_token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenConfig};
//! use secrecy::SecretString;
//!
//! let config = TokenConfig::new(SecretString::from("secret_key_at_least_32_bytes_long!"));
//! let auth = Authenticator::new(&config);
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let credential = auth
//!     .authenticate("password123", Some(&hash), "user123", "alice@example.com")
//!     .unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&credential.access_token).unwrap();
//! assert_eq!(claims.id, "user123");
//! ```
//!
//! ## Federated Login
//! ```no_run
//! use auth::{FederatedVerifier, ProviderConfig};
//!
//! # async fn run(id_token: &str) -> Result<(), auth::FederatedError> {
//! let verifier = FederatedVerifier::new(&ProviderConfig::google("my-client-id"))?;
//! let assertion = verifier.verify(id_token).await?;
//! println!("{} <{}>", assertion.display_name.unwrap_or_default(), assertion.email);
//! # Ok(())
//! # }
//! ```

pub mod authenticator;
pub mod federated;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use federated::AssertionRejection;
pub use federated::FederatedError;
pub use federated::FederatedVerifier;
pub use federated::ProviderConfig;
pub use federated::VerifiedAssertion;
pub use jwt::Credential;
pub use jwt::IdentityClaims;
pub use jwt::JwtError;
pub use jwt::TokenConfig;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;
