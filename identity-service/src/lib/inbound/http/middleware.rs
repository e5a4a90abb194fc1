use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::identity::models::IdentityId;
use crate::identity::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated identity in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub identity_id: IdentityId,
    pub claims: auth::IdentityClaims,
}

/// Middleware that validates bearer tokens and adds identity info to request extensions
pub async fn authenticate<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "token validation failed");
        unauthorized("Invalid or expired token")
    })?;

    let identity_id = IdentityId::from_string(&claims.id).map_err(|e| {
        tracing::error!(error = %e, "token subject is not an identity id");
        unauthorized("Invalid token format")
    })?;

    req.extensions_mut()
        .insert(AuthenticatedIdentity {
            identity_id,
            claims,
        });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
