pub mod cache;
pub mod config;
pub mod errors;
pub mod jwks;
pub mod verifier;

pub use cache::JwksCache;
pub use config::ProviderConfig;
pub use errors::AssertionRejection;
pub use errors::FederatedError;
pub use jwks::Jwk;
pub use jwks::JwkSet;
pub use verifier::FederatedVerifier;
pub use verifier::VerifiedAssertion;
