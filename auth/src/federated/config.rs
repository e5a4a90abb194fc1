use std::time::Duration;

/// Trust configuration for an external OpenID Connect identity provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// This application's registered client identifier, pinned as the
    /// expected `aud` of every provider token
    pub client_id: String,

    /// Accepted `iss` values
    pub issuers: Vec<String>,

    /// Location of the provider's published JSON Web Key Set
    pub jwks_uri: String,

    /// Network timeout for one key set fetch
    pub http_timeout: Duration,

    /// Cache lifetime used when the provider sends no `Cache-Control: max-age`
    pub fallback_cache_ttl: Duration,
}

impl ProviderConfig {
    pub const GOOGLE_JWKS_URI: &'static str = "https://www.googleapis.com/oauth2/v3/certs";
    pub const GOOGLE_ISSUERS: [&'static str; 2] =
        ["accounts.google.com", "https://accounts.google.com"];

    /// Google Sign-In defaults for the given client identifier.
    pub fn google(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            issuers: Self::GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            jwks_uri: Self::GOOGLE_JWKS_URI.to_string(),
            http_timeout: Duration::from_secs(10),
            fallback_cache_ttl: Duration::from_secs(300),
        }
    }

    pub fn with_jwks_uri(mut self, jwks_uri: impl Into<String>) -> Self {
        self.jwks_uri = jwks_uri.into();
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }
}
