use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedIdentity;

/// Echo the claims of the bearer credential that passed the middleware.
pub async fn current_identity(
    Extension(authenticated): Extension<AuthenticatedIdentity>,
) -> ApiSuccess<CurrentIdentityData> {
    ApiSuccess::new(StatusCode::OK, authenticated.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentIdentityData {
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<AuthenticatedIdentity> for CurrentIdentityData {
    fn from(authenticated: AuthenticatedIdentity) -> Self {
        Self {
            id: authenticated.identity_id.to_string(),
            email: authenticated.claims.email,
            iat: authenticated.claims.iat,
            exp: authenticated.claims.exp,
        }
    }
}
