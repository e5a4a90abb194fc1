use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use serde::Serialize;

use super::errors::AssertionRejection;

/// JSON Web Key Set as published by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a key by `kid` (Key ID).
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

/// A single published key. Only RSA signing keys are usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default)]
    pub n: String,
    /// RSA exponent (base64url)
    #[serde(default)]
    pub e: String,
}

impl Jwk {
    /// Build a verification key from the RSA components.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Not an RSA signing key, or not meant for RS256
    /// * `UnknownSigningKey` - The components cannot be decoded
    pub fn decoding_key(&self) -> Result<DecodingKey, AssertionRejection> {
        let signing_use = self.key_use.as_deref().map_or(true, |u| u == "sig");
        let rs256 = self.alg.as_deref().map_or(true, |a| a == "RS256");
        if self.kty != "RSA" || !signing_use || !rs256 {
            return Err(AssertionRejection::UnsupportedAlgorithm);
        }

        DecodingKey::from_rsa_components(&self.n, &self.e)
            .map_err(|_| AssertionRejection::UnknownSigningKey)
    }
}
