pub mod claims;
pub mod config;
pub mod errors;
pub mod issuer;
pub mod verifier;

use jsonwebtoken::Algorithm;

pub use claims::IdentityClaims;
pub use config::TokenConfig;
pub use errors::JwtError;
pub use issuer::Credential;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;

/// Signing algorithm shared by issuer and verifier.
pub(crate) const ALGORITHM: Algorithm = Algorithm::HS256;
