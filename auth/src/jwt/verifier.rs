use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use secrecy::ExposeSecret;

use super::claims::IdentityClaims;
use super::config::TokenConfig;
use super::errors::JwtError;
use super::ALGORITHM;

/// Validates tokens minted by [`TokenIssuer`](super::TokenIssuer).
///
/// Uses the same algorithm and secret source as the issuer. The algorithm is
/// pinned, `exp` is mandatory and no clock leeway is granted.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Decode and validate a token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its `exp`
    /// * `InvalidToken` - Signature mismatch, wrong algorithm or malformed token
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}
