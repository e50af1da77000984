//! Tenant middleware
//!
//! Verifies the session token issued by the identity provider and scopes the
//! request to its organization

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

/// Organization and user a request acts for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantContext {
    pub user_id: String,
    pub org_id: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub org_id: Option<String>,
    pub exp: i64,
}

/// Middleware that rejects requests without a valid organization-scoped token
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let tenant = match decode_token(token, &state.config.auth.jwt_secret) {
        Ok(tenant) => tenant,
        Err(msg) => return AppError::Unauthorized(msg).into_response(),
    };

    tracing::debug!(org_id = %tenant.org_id, user_id = %tenant.user_id, "Tenant resolved");
    request.extensions_mut().insert(tenant);

    next.run(request).await
}

/// Decode and validate a token, requiring an organization claim
pub fn decode_token(token: &str, secret: &str) -> Result<TenantContext, String> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))?;

    let org_id = claims
        .org_id
        .filter(|org| !org.trim().is_empty())
        .ok_or_else(|| "No organization selected".to_string())?;

    Ok(TenantContext {
        user_id: claims.sub,
        org_id,
    })
}
