use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::cache::JwksCache;
use super::config::ProviderConfig;
use super::errors::AssertionRejection;
use super::errors::FederatedError;

/// Identity attributes extracted from a provider token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAssertion {
    /// Provider-side subject identifier
    pub subject: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    // Some providers send this as the string "true"
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies ID tokens minted by an external OpenID Connect provider.
///
/// A token is accepted only when it is RS256-signed by a currently published
/// provider key, carries an accepted issuer, is unexpired, and its audience
/// is exactly this application's client identifier.
pub struct FederatedVerifier {
    validation: Validation,
    keys: JwksCache,
}

impl FederatedVerifier {
    /// # Errors
    /// * `Configuration` - Missing client identifier or issuers, or HTTP client setup failed
    pub fn new(config: &ProviderConfig) -> Result<Self, FederatedError> {
        if config.client_id.trim().is_empty() {
            return Err(FederatedError::Configuration(
                "client identifier is empty".to_string(),
            ));
        }
        if config.issuers.is_empty() {
            return Err(FederatedError::Configuration(
                "no accepted issuers".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.client_id.as_str()]);
        validation.set_issuer(&config.issuers);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            validation,
            keys: JwksCache::new(config)?,
        })
    }

    /// Verify a provider token and extract the identity it asserts.
    ///
    /// # Errors
    /// * `AssertionInvalid` - Signature, algorithm, key, issuer, audience, expiry or email check failed
    /// * `KeyDiscovery` - Provider keys could not be fetched
    pub async fn verify(&self, token: &str) -> Result<VerifiedAssertion, FederatedError> {
        let header = decode_header(token).map_err(|_| AssertionRejection::Malformed)?;

        if header.alg != Algorithm::RS256 {
            return Err(AssertionRejection::UnsupportedAlgorithm.into());
        }

        let kid = header.kid.ok_or(AssertionRejection::UnknownSigningKey)?;

        let keys = self.keys.keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or(AssertionRejection::UnknownSigningKey)?;
        let decoding_key = jwk.decoding_key()?;

        let claims = decode::<ProviderClaims>(token, &decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| rejection_for(e.kind()))?;

        let email = claims
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or(AssertionRejection::MissingEmail)?;

        if claims.email_verified.as_ref().is_some_and(|v| !is_true(v)) {
            return Err(AssertionRejection::EmailUnverified.into());
        }

        Ok(VerifiedAssertion {
            subject: claims.sub,
            email,
            display_name: claims.name.filter(|name| !name.trim().is_empty()),
        })
    }
}

fn rejection_for(kind: &ErrorKind) -> AssertionRejection {
    match kind {
        ErrorKind::InvalidSignature => AssertionRejection::SignatureInvalid,
        ErrorKind::ExpiredSignature => AssertionRejection::Expired,
        ErrorKind::InvalidIssuer => AssertionRejection::IssuerUnrecognized,
        ErrorKind::InvalidAudience => AssertionRejection::AudienceMismatch,
        ErrorKind::InvalidAlgorithm => AssertionRejection::UnsupportedAlgorithm,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
            AssertionRejection::AudienceMismatch
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
            AssertionRejection::IssuerUnrecognized
        }
        _ => AssertionRejection::Malformed,
    }
}

fn is_true(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => s == "true",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::encode;
    use jsonwebtoken::EncodingKey;
    use jsonwebtoken::Header;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;

    use super::*;

    const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";
    const KID: &str = "test-key";
    const PROVIDER_PEM: &str = include_str!("../../tests/fixtures/provider_rsa.pem");
    const PROVIDER_MODULUS: &str = include_str!("../../tests/fixtures/provider_rsa.n");

    async fn provider() -> MockServer {
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

        server
    }

    fn verifier_for(server: &MockServer) -> FederatedVerifier {
        let config = ProviderConfig::google(CLIENT_ID)
            .with_jwks_uri(format!("{}/oauth2/v3/certs", server.uri()));
        FederatedVerifier::new(&config).expect("Failed to build verifier")
    }

    fn claims() -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": "https://accounts.google.com",
            "aud": CLIENT_ID,
            "sub": "110169484474386276334",
            "email": "alice@example.com",
            "email_verified": true,
            "name": "Alice Smith",
            "iat": now,
            "exp": now + 3600
        })
    }

    fn sign(claims: &serde_json::Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(PROVIDER_PEM.as_bytes()).expect("Invalid test key");
        encode(&header, claims, &key).expect("Failed to sign test token")
    }

    fn with(
        mut claims: serde_json::Value,
        key: &str,
        value: serde_json::Value,
    ) -> serde_json::Value {
        claims[key] = value;
        claims
    }

    #[tokio::test]
    async fn test_valid_assertion() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let assertion = verifier
            .verify(&sign(&claims(), KID))
            .await
            .expect("Verification failed");

        assert_eq!(
            assertion,
            VerifiedAssertion {
                subject: "110169484474386276334".to_string(),
                email: "alice@example.com".to_string(),
                display_name: Some("Alice Smith".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_bare_issuer_is_accepted() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let token = sign(&with(claims(), "iss", json!("accounts.google.com")), KID);

        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_audience_mismatch() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let token = sign(
            &with(claims(), "aud", json!("another-app.apps.googleusercontent.com")),
            KID,
        );

        assert_eq!(
            verifier.verify(&token).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::AudienceMismatch
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_audience() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let mut without_aud = claims();
        without_aud.as_object_mut().unwrap().remove("aud");

        assert_eq!(
            verifier.verify(&sign(&without_aud, KID)).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::AudienceMismatch
            ))
        );
    }

    #[tokio::test]
    async fn test_unrecognized_issuer() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let token = sign(&with(claims(), "iss", json!("https://evil.example.com")), KID);

        assert_eq!(
            verifier.verify(&token).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::IssuerUnrecognized
            ))
        );
    }

    #[tokio::test]
    async fn test_expired_assertion() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let now = Utc::now().timestamp();
        let expired = with(
            with(claims(), "iat", json!(now - 7200)),
            "exp",
            json!(now - 3600),
        );

        assert_eq!(
            verifier.verify(&sign(&expired, KID)).await,
            Err(FederatedError::AssertionInvalid(AssertionRejection::Expired))
        );
    }

    #[tokio::test]
    async fn test_unknown_key_id() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        assert_eq!(
            verifier.verify(&sign(&claims(), "rotated-away")).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::UnknownSigningKey
            ))
        );
    }

    #[tokio::test]
    async fn test_tampered_signature() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let genuine = sign(&claims(), KID);
        let other = sign(&with(claims(), "email", json!("mallory@example.com")), KID);

        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!(
            "{}.{}.{}",
            genuine_parts[0], other_parts[1], genuine_parts[2]
        );

        assert_eq!(
            verifier.verify(&spliced).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::SignatureInvalid
            ))
        );
    }

    #[tokio::test]
    async fn test_symmetric_algorithm_is_rejected() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(KID.to_string());
        let token = encode(
            &header,
            &claims(),
            &EncodingKey::from_secret(PROVIDER_MODULUS.trim().as_bytes()),
        )
        .unwrap();

        assert_eq!(
            verifier.verify(&token).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::UnsupportedAlgorithm
            ))
        );
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        assert_eq!(
            verifier.verify("not-a-token").await,
            Err(FederatedError::AssertionInvalid(AssertionRejection::Malformed))
        );
    }

    #[tokio::test]
    async fn test_missing_email() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let mut without_email = claims();
        without_email.as_object_mut().unwrap().remove("email");

        assert_eq!(
            verifier.verify(&sign(&without_email, KID)).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::MissingEmail
            ))
        );
    }

    #[tokio::test]
    async fn test_unverified_email() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let token = sign(&with(claims(), "email_verified", json!(false)), KID);

        assert_eq!(
            verifier.verify(&token).await,
            Err(FederatedError::AssertionInvalid(
                AssertionRejection::EmailUnverified
            ))
        );
    }

    #[tokio::test]
    async fn test_string_email_verified_and_missing_name() {
        let server = provider().await;
        let verifier = verifier_for(&server);

        let mut claims = with(claims(), "email_verified", json!("true"));
        claims.as_object_mut().unwrap().remove("name");

        let assertion = verifier
            .verify(&sign(&claims, KID))
            .await
            .expect("Verification failed");
        assert_eq!(assertion.display_name, None);
    }

    #[tokio::test]
    async fn test_key_discovery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let verifier = verifier_for(&server);

        assert!(matches!(
            verifier.verify(&sign(&claims(), KID)).await,
            Err(FederatedError::KeyDiscovery(_))
        ));
    }

    #[test]
    fn test_empty_client_id_is_rejected() {
        let result = FederatedVerifier::new(&ProviderConfig::google("  "));
        assert!(matches!(result, Err(FederatedError::Configuration(_))));
    }
}
