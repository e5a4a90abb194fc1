use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use secrecy::SecretString;
use uuid::Uuid;

use crate::identity::errors::EmailError;
use crate::identity::errors::IdentityIdError;
use crate::identity::errors::PrivilegeLevelError;
use crate::identity::errors::UsernameError;

/// Identity aggregate entity.
///
/// A registered principal. `password_hash` is `None` for accounts that only
/// ever signed in through the federated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub privilege_level: PrivilegeLevel,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// New locally registered identity with baseline privileges.
    pub fn with_password(username: Username, email: EmailAddress, password_hash: String) -> Self {
        Self {
            id: IdentityId::new(),
            username,
            email,
            password_hash: Some(password_hash),
            privilege_level: PrivilegeLevel::default(),
            created_at: Utc::now(),
        }
    }

    /// New federation-only identity (no password) with baseline privileges.
    pub fn federated(username: Username, email: EmailAddress) -> Self {
        Self {
            id: IdentityId::new(),
            username,
            email,
            password_hash: None,
            privilege_level: PrivilegeLevel::default(),
            created_at: Utc::now(),
        }
    }

    pub fn is_federation_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Identity unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// Generate a new random identity ID (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdentityIdError> {
        Uuid::parse_str(s)
            .map(IdentityId)
            .map_err(|e| IdentityIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Provider display names become usernames verbatim, so spaces and
/// non-ASCII letters are allowed. Surrounding whitespace is trimmed;
/// control characters are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Nothing left after trimming
    /// * `TooLong` - More than 64 characters
    /// * `InvalidCharacters` - Contains control characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = username.trim();

        let length = username.chars().count();
        if length == 0 {
            return Err(UsernameError::Empty);
        }
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if username.chars().any(char::is_control) {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(username.to_string()))
    }

    /// Username for a federated account: the provider's display name, or the
    /// local part of the email when the provider sent none.
    ///
    /// Provider names are not held to registration rules: control characters
    /// are dropped and the name is cut to 64 characters.
    ///
    /// # Errors
    /// * `UsernameError` - Neither the name nor the email local part yields a username
    pub fn from_display_name(
        display_name: Option<&str>,
        email: &EmailAddress,
    ) -> Result<Self, UsernameError> {
        display_name
            .map(Self::fit)
            .filter(|name| !name.is_empty())
            .map_or_else(|| Self::new(Self::fit(email.local_part())), Self::new)
    }

    fn fit(raw: &str) -> String {
        let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
        cleaned
            .trim()
            .chars()
            .take(Self::MAX_LENGTH)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. The address is
/// kept exactly as given; lookups are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the last `@`.
    pub fn local_part(&self) -> &str {
        self.0
            .rsplit_once('@')
            .map_or(self.0.as_str(), |(local, _)| local)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authorization tier consumed by downstream role checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PrivilegeLevel {
    #[default]
    User,
    Admin,
}

impl PrivilegeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivilegeLevel::User => "user",
            PrivilegeLevel::Admin => "admin",
        }
    }
}

impl FromStr for PrivilegeLevel {
    type Err = PrivilegeLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(PrivilegeLevel::User),
            "admin" => Ok(PrivilegeLevel::Admin),
            other => Err(PrivilegeLevelError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store lookup: equality on email and/or username, combined with logical OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFilter {
    pub email: Option<EmailAddress>,
    pub username: Option<Username>,
}

impl IdentityFilter {
    pub fn by_email(email: EmailAddress) -> Self {
        Self {
            email: Some(email),
            username: None,
        }
    }

    pub fn by_email_or_username(email: EmailAddress, username: Username) -> Self {
        Self {
            email: Some(email),
            username: Some(username),
        }
    }

    /// Exact, case-sensitive match. An empty filter matches nothing.
    pub fn matches(&self, identity: &Identity) -> bool {
        let email_matches = self.email.as_ref() == Some(&identity.email);
        let username_matches = self.username.as_ref() == Some(&identity.username);
        email_matches || username_matches
    }
}

/// Command to register a new identity with a password
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: SecretString,
}

impl RegisterCommand {
    /// # Arguments
    /// * `username` - Validated username
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(username: Username, email: EmailAddress, password: SecretString) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command to log in with email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: SecretString,
}

impl LoginCommand {
    pub fn new(email: EmailAddress, password: SecretString) -> Self {
        Self { email, password }
    }
}

/// Identity attributes the federated provider vouched for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAssertion {
    pub email: String,
    pub display_name: Option<String>,
}

/// Outcome of a successful flow: a fresh credential and the identity it names
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub credential: auth::Credential,
    pub identity: Identity,
}
