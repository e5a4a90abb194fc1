use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use secrecy::ExposeSecret;

use crate::identity::errors::AssertionError;
use crate::identity::errors::IdentityError;
use crate::identity::errors::RepositoryError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Identity;
use crate::identity::models::IdentityFilter;
use crate::identity::models::IssuedCredential;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Username;
use crate::identity::ports::AssertionVerifier;
use crate::identity::ports::CredentialServicePort;
use crate::identity::ports::IdentityRepository;

/// Domain service implementation for the credential flows.
///
/// Concrete implementation of CredentialServicePort with dependency injection.
pub struct CredentialService<IR, AV>
where
    IR: IdentityRepository,
    AV: AssertionVerifier,
{
    repository: Arc<IR>,
    assertion_verifier: Arc<AV>,
    authenticator: Arc<Authenticator>,
}

impl<IR, AV> CredentialService<IR, AV>
where
    IR: IdentityRepository,
    AV: AssertionVerifier,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `assertion_verifier` - Federated provider token verification
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(
        repository: Arc<IR>,
        assertion_verifier: Arc<AV>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            repository,
            assertion_verifier,
            authenticator,
        }
    }

    fn issue(&self, identity: Identity) -> Result<IssuedCredential, auth::JwtError> {
        let credential = self
            .authenticator
            .issue_token(identity.id, identity.email.as_str())?;
        Ok(IssuedCredential {
            credential,
            identity,
        })
    }

    async fn provision_federated(
        &self,
        email: EmailAddress,
        display_name: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let username = Username::from_display_name(display_name, &email)
            .map_err(|e| oauth_login_failed("display name is not a valid username", e))?;

        match self
            .repository
            .insert(Identity::federated(username, email.clone()))
            .await
        {
            Ok(identity) => {
                tracing::info!(identity_id = %identity.id, "provisioned federated identity");
                Ok(identity)
            }
            // A concurrent first sign-in for the same email won the insert
            Err(conflict) if conflict.is_email_conflict() => self
                .repository
                .find_one(&IdentityFilter::by_email(email))
                .await
                .map_err(|e| oauth_login_failed("identity lookup after conflict failed", e))?
                .ok_or_else(|| oauth_login_failed("identity vanished after conflict", conflict)),
            Err(e) => Err(oauth_login_failed("identity insert failed", e)),
        }
    }
}

#[async_trait]
impl<IR, AV> CredentialServicePort for CredentialService<IR, AV>
where
    IR: IdentityRepository,
    AV: AssertionVerifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<IssuedCredential, IdentityError> {
        let filter =
            IdentityFilter::by_email_or_username(command.email.clone(), command.username.clone());

        let existing = self
            .repository
            .find_one(&filter)
            .await
            .map_err(|e| registration_failed("identity lookup failed", e))?;
        if existing.is_some() {
            return Err(IdentityError::DuplicateIdentity);
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.expose_secret())
            .map_err(|e| registration_failed("password hashing failed", e))?;

        let identity = Identity::with_password(command.username, command.email, password_hash);

        let identity = match self.repository.insert(identity).await {
            Ok(identity) => identity,
            Err(RepositoryError::UniqueViolation(constraint)) => {
                tracing::debug!(%constraint, "registration lost a uniqueness race");
                return Err(IdentityError::DuplicateIdentity);
            }
            Err(e) => return Err(registration_failed("identity insert failed", e)),
        };

        tracing::info!(identity_id = %identity.id, "registered identity");

        self.issue(identity)
            .map_err(|e| registration_failed("token issuance failed", e))
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedCredential, IdentityError> {
        let password = command.password.expose_secret();

        let Some(identity) = self
            .repository
            .find_one(&IdentityFilter::by_email(command.email))
            .await
            .map_err(|e| login_failed("identity lookup failed", e))?
        else {
            self.authenticator.verify_decoy(password);
            return Err(IdentityError::InvalidCredentials);
        };

        if identity.is_federation_only() {
            tracing::debug!(
                identity_id = %identity.id,
                "password login for federation-only identity"
            );
        }

        let credential = self
            .authenticator
            .authenticate(
                password,
                identity.password_hash.as_deref(),
                identity.id,
                identity.email.as_str(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => IdentityError::InvalidCredentials,
                AuthenticationError::JwtError(e) => login_failed("token issuance failed", e),
            })?;

        tracing::debug!(identity_id = %identity.id, "password login succeeded");

        Ok(IssuedCredential {
            credential,
            identity,
        })
    }

    async fn federated_login(&self, token_id: &str) -> Result<IssuedCredential, IdentityError> {
        let assertion = self
            .assertion_verifier
            .verify(token_id)
            .await
            .map_err(|e| match e {
                AssertionError::Rejected(reason) => {
                    tracing::warn!(%reason, "federated assertion rejected");
                    IdentityError::AssertionInvalid
                }
                AssertionError::Unavailable(detail) => {
                    oauth_login_failed("assertion verification unavailable", detail)
                }
            })?;

        let email = EmailAddress::new(assertion.email).map_err(|e| {
            tracing::warn!(error = %e, "federated assertion carries an unusable email");
            IdentityError::AssertionInvalid
        })?;

        let existing = self
            .repository
            .find_one(&IdentityFilter::by_email(email.clone()))
            .await
            .map_err(|e| oauth_login_failed("identity lookup failed", e))?;

        let identity = match existing {
            Some(identity) => identity,
            None => {
                self.provision_federated(email, assertion.display_name.as_deref())
                    .await?
            }
        };

        self.issue(identity)
            .map_err(|e| oauth_login_failed("token issuance failed", e))
    }
}

fn registration_failed(stage: &str, error: impl std::fmt::Display) -> IdentityError {
    tracing::error!(%error, "registration failed: {}", stage);
    IdentityError::RegistrationFailed
}

fn login_failed(stage: &str, error: impl std::fmt::Display) -> IdentityError {
    tracing::error!(%error, "login failed: {}", stage);
    IdentityError::LoginFailed
}

fn oauth_login_failed(stage: &str, error: impl std::fmt::Display) -> IdentityError {
    tracing::error!(%error, "federated login failed: {}", stage);
    IdentityError::OAuthLoginFailed
}
