use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains control characters")]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PrivilegeLevel parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrivilegeLevelError {
    #[error("Unknown privilege level: {0}")]
    Unknown(String),
}

/// Error reported by the identity store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A unique constraint (email or username) rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored record is invalid: {0}")]
    CorruptRecord(String),
}

impl RepositoryError {
    pub const EMAIL_CONSTRAINT: &'static str = "identities_email_key";
    pub const USERNAME_CONSTRAINT: &'static str = "identities_username_key";

    /// Another identity already holds this email.
    pub fn is_email_conflict(&self) -> bool {
        matches!(self, RepositoryError::UniqueViolation(c) if c == Self::EMAIL_CONSTRAINT)
    }
}

/// Error reported by the federated assertion verifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionError {
    /// The provider token failed a trust check (signature, issuer, audience, expiry)
    #[error("Assertion rejected: {0}")]
    Rejected(String),

    /// Verification could not be carried out (e.g. provider keys unavailable)
    #[error("Assertion verification unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for the credential flows.
///
/// Display strings are the caller-facing messages; internal detail is only
/// logged where the error is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    // Request validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Deliberately undifferentiated between email and username
    #[error("User already exists with this email or username")]
    DuplicateIdentity,

    // Same value for unknown email, wrong password and federation-only account
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("OAuth login failed")]
    AssertionInvalid,

    // Infrastructure errors
    #[error("Registration failed")]
    RegistrationFailed,

    #[error("Login failed")]
    LoginFailed,

    #[error("OAuth login failed")]
    OAuthLoginFailed,
}
