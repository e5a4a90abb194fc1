use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::ProviderConfig;
use auth::TokenConfig;
use chrono::Duration;
use chrono::Utc;
use identity_service::domain::identity::service::CredentialService;
use identity_service::identity::errors::RepositoryError;
use identity_service::identity::models::Identity;
use identity_service::identity::models::IdentityFilter;
use identity_service::identity::ports::IdentityRepository;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::federation::OidcAssertionVerifier;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";
const KID: &str = "test-key";
const PROVIDER_PEM: &str = include_str!("../fixtures/provider_rsa.pem");
const PROVIDER_MODULUS: &str = include_str!("../fixtures/provider_rsa.n");

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryIdentityRepository>,
    pub provider: TestProvider,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
}

/// Identity store kept in memory, enforcing the same uniqueness rules as
/// the `identities` table
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: Mutex<Vec<Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn all(&self) -> Vec<Identity> {
        self.identities.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_one(&self, filter: &IdentityFilter) -> Result<Option<Identity>, RepositoryError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| filter.matches(i)).cloned())
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, RepositoryError> {
        let mut identities = self.identities.lock().unwrap();
        if identities.iter().any(|i| i.email == identity.email) {
            return Err(RepositoryError::UniqueViolation(
                RepositoryError::EMAIL_CONSTRAINT.to_string(),
            ));
        }
        if identities.iter().any(|i| i.username == identity.username) {
            return Err(RepositoryError::UniqueViolation(
                RepositoryError::USERNAME_CONSTRAINT.to_string(),
            ));
        }
        identities.push(identity.clone());
        Ok(identity)
    }
}

/// Stand-in for the federated provider: publishes a key set and signs ID tokens
pub struct TestProvider {
    pub server: MockServer,
}

impl TestProvider {
    async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("cache-control", "public, max-age=3600")
                    .set_body_json(json!({
                        "keys": [{
                            "kty": "RSA",
                            "use": "sig",
                            "alg": "RS256",
                            "kid": KID,
                            "n": PROVIDER_MODULUS.trim(),
                            "e": "AQAB"
                        }]
                    })),
            )
            .mount(&server)
            .await;

        Self { server }
    }

    fn config(&self) -> ProviderConfig {
        ProviderConfig::google(CLIENT_ID)
            .with_jwks_uri(format!("{}/oauth2/v3/certs", self.server.uri()))
    }

    /// Claims of a valid ID token for this application
    pub fn claims(&self, email: &str, name: Option<&str>) -> serde_json::Value {
        let now = Utc::now().timestamp();
        let mut claims = json!({
            "iss": "https://accounts.google.com",
            "aud": CLIENT_ID,
            "sub": format!("sub-{}", email),
            "email": email,
            "email_verified": true,
            "iat": now,
            "exp": now + 3600
        });
        if let Some(name) = name {
            claims["name"] = json!(name);
        }
        claims
    }

    pub fn sign(&self, claims: &serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(KID.to_string());
        let key = EncodingKey::from_rsa_pem(PROVIDER_PEM.as_bytes()).expect("Invalid test key");
        encode(&header, claims, &key).expect("Failed to sign test token")
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let provider = TestProvider::start().await;

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryIdentityRepository::default());
        let assertion_verifier = Arc::new(
            OidcAssertionVerifier::new(&provider.config())
                .expect("Failed to create assertion verifier"),
        );
        let authenticator = Arc::new(Authenticator::new(&TokenConfig::new(
            SecretString::from(JWT_SECRET),
        )));

        let credential_service = Arc::new(CredentialService::new(
            Arc::clone(&repository),
            assertion_verifier,
            Arc::clone(&authenticator),
        ));

        let router = create_router(credential_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            provider,
            api_client: reqwest::Client::new(),
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn federated_login(&self, token_id: &str) -> reqwest::Response {
        self.post("/api/auth/google")
            .json(&json!({ "token_id": token_id }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sign a token with the service secret whose validity window has already closed
    pub fn expired_token(&self, subject_id: &str, email: &str) -> String {
        let issuer = auth::TokenIssuer::new(&TokenConfig::new(SecretString::from(JWT_SECRET)));
        issuer
            .issue_at(subject_id, email, Utc::now() - Duration::hours(2))
            .expect("Failed to issue token")
            .access_token
    }
}
