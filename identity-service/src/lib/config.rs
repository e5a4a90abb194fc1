use std::env;
use std::time::Duration;

use auth::ProviderConfig;
use auth::TokenConfig;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;
use serde::Deserializer;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub url: SecretString,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: SecretString,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    /// Overrides the provider's published key set location
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
}

fn default_expiration_minutes() -> i64 {
    60
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}

/// Signing secret shipped in `config/default.toml` for local development only
pub const PLACEHOLDER_SECRET: &str = "development_secret_change_me_32_bytes!";

/// Shortest acceptable HS256 signing secret, in bytes
pub const MIN_SECRET_BYTES: usize = 32;

impl JwtConfig {
    /// Reject signing secrets that would let anyone forge credentials.
    ///
    /// # Errors
    /// * `Message` - Secret is the shipped placeholder or shorter than 32 bytes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.secret.expose_secret();
        if secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret is the development placeholder; set JWT__SECRET".to_string(),
            ));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }
        Ok(())
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.secret.clone())
            .with_ttl(chrono::Duration::minutes(self.expiration_minutes))
    }
}

impl GoogleConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        let config = ProviderConfig::google(self.client_id.clone())
            .with_http_timeout(Duration::from_secs(self.http_timeout_seconds));

        match &self.jwks_uri {
            Some(jwks_uri) => config.with_jwks_uri(jwks_uri.clone()),
            None => config,
        }
    }
}
