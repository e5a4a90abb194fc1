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
use crate::identity::models::LoginCommand;
use crate::identity::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<CredentialResponseData>, ApiError> {
    // An address that cannot exist cannot be registered either
    let email = EmailAddress::new(body.email).map_err(|_| IdentityError::InvalidCredentials)?;

    state
        .credential_service
        .login(LoginCommand::new(email, SecretString::from(body.password)))
        .await
        .map_err(ApiError::from)
        .map(|ref issued| ApiSuccess::new(StatusCode::OK, issued.into()))
}

/// HTTP request body for email/password login (raw JSON)
#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
