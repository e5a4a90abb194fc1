use thiserror::Error;

/// Error type for federated identity verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FederatedError {
    /// The provider token itself is not trustworthy. Terminal for the request.
    #[error("Provider assertion rejected: {0}")]
    AssertionInvalid(AssertionRejection),

    #[error("Provider key discovery failed: {0}")]
    KeyDiscovery(String),

    #[error("Provider configuration invalid: {0}")]
    Configuration(String),
}

/// Why a provider token was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AssertionRejection {
    #[error("malformed token")]
    Malformed,

    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,

    #[error("unknown signing key")]
    UnknownSigningKey,

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("issuer unrecognized")]
    IssuerUnrecognized,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("token expired")]
    Expired,

    #[error("email claim missing")]
    MissingEmail,

    #[error("email not verified by provider")]
    EmailUnverified,
}

impl From<AssertionRejection> for FederatedError {
    fn from(rejection: AssertionRejection) -> Self {
        FederatedError::AssertionInvalid(rejection)
    }
}
