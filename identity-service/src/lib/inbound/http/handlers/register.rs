use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use secrecy::SecretString;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::CredentialResponseData;
use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Username;
use crate::identity::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<CredentialResponseData>, ApiError> {
    state
        .credential_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref issued| ApiSuccess::new(StatusCode::CREATED, issued.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, IdentityError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterCommand::new(
            username,
            email,
            SecretString::from(self.password),
        ))
    }
}
