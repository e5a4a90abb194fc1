use async_trait::async_trait;
use auth::FederatedError;
use auth::FederatedVerifier;
use auth::ProviderConfig;

use crate::identity::errors::AssertionError;
use crate::identity::models::VerifiedAssertion;
use crate::identity::ports::AssertionVerifier;

/// OpenID Connect provider adapter for the assertion verifier port.
pub struct OidcAssertionVerifier {
    verifier: FederatedVerifier,
}

impl OidcAssertionVerifier {
    pub fn new(config: &ProviderConfig) -> Result<Self, FederatedError> {
        Ok(Self {
            verifier: FederatedVerifier::new(config)?,
        })
    }
}

#[async_trait]
impl AssertionVerifier for OidcAssertionVerifier {
    async fn verify(&self, token_id: &str) -> Result<VerifiedAssertion, AssertionError> {
        let assertion = self.verifier.verify(token_id).await.map_err(AssertionError::from)?;

        tracing::debug!(subject = %assertion.subject, "provider assertion verified");

        Ok(VerifiedAssertion {
            email: assertion.email,
            display_name: assertion.display_name,
        })
    }
}

impl From<FederatedError> for AssertionError {
    fn from(err: FederatedError) -> Self {
        match err {
            FederatedError::AssertionInvalid(reason) => {
                AssertionError::Rejected(reason.to_string())
            }
            FederatedError::KeyDiscovery(_) | FederatedError::Configuration(_) => {
                AssertionError::Unavailable(err.to_string())
            }
        }
    }
}
