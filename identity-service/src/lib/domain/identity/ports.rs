use async_trait::async_trait;

use crate::identity::errors::AssertionError;
use crate::identity::errors::IdentityError;
use crate::identity::errors::RepositoryError;
use crate::identity::models::Identity;
use crate::identity::models::IdentityFilter;
use crate::identity::models::IssuedCredential;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::VerifiedAssertion;

/// Port for the credential flows exposed to inbound adapters.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new identity with a password and issue its first credential.
    ///
    /// # Arguments
    /// * `command` - Validated username, email and plain text password
    ///
    /// # Returns
    /// Credential plus the stored identity
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email or username is already registered
    /// * `RegistrationFailed` - Hashing, storage or token issuance failed
    async fn register(&self, command: RegisterCommand) -> Result<IssuedCredential, IdentityError>;

    /// Exchange email and password for a credential.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password or no password set
    /// * `LoginFailed` - Storage or token issuance failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedCredential, IdentityError>;

    /// Exchange a provider ID token for a credential, provisioning a
    /// federation-only identity on first sight of the email.
    ///
    /// # Errors
    /// * `AssertionInvalid` - The provider token failed verification
    /// * `OAuthLoginFailed` - Verification could not run, or storage or token issuance failed
    async fn federated_login(&self, token_id: &str) -> Result<IssuedCredential, IdentityError>;
}

/// Persistence operations for the identity aggregate.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Retrieve the first identity matching the filter.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    /// * `CorruptRecord` - Stored row could not be mapped back to an identity
    async fn find_one(&self, filter: &IdentityFilter) -> Result<Option<Identity>, RepositoryError>;

    /// Persist a new identity.
    ///
    /// # Errors
    /// * `UniqueViolation` - Email or username is already taken
    /// * `Database` - Database operation failed
    async fn insert(&self, identity: Identity) -> Result<Identity, RepositoryError>;
}

/// Verification of ID tokens issued by the federated provider.
#[async_trait]
pub trait AssertionVerifier: Send + Sync + 'static {
    /// # Errors
    /// * `Rejected` - Token is not a valid assertion for this client
    /// * `Unavailable` - Verification could not be carried out
    async fn verify(&self, token_id: &str) -> Result<VerifiedAssertion, AssertionError>;
}
