use chrono::Duration;
use secrecy::SecretString;

/// Signing configuration shared by [`TokenIssuer`](super::TokenIssuer) and
/// [`TokenVerifier`](super::TokenVerifier).
///
/// The secret is held as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub(crate) secret: SecretString,
    pub(crate) ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default one hour validity window.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from the environment or a vault, never from code
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            ttl: Self::default_ttl(),
        }
    }

    /// Override the validity window.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn default_ttl() -> Duration {
        Duration::hours(1)
    }
}
