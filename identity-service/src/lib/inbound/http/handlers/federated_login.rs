use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::CredentialResponseData;
use crate::identity::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

pub async fn federated_login<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<FederatedLoginRequest>,
) -> Result<ApiSuccess<CredentialResponseData>, ApiError> {
    state
        .credential_service
        .federated_login(&body.token_id)
        .await
        .map_err(ApiError::from)
        .map(|ref issued| ApiSuccess::new(StatusCode::OK, issued.into()))
}

/// HTTP request body carrying the provider-issued ID token
#[derive(Deserialize)]
pub struct FederatedLoginRequest {
    #[serde(alias = "tokenId")]
    token_id: String,
}
