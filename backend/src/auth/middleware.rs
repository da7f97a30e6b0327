//! Authentication middleware
//!
//! Resolves the caller's identity from an `Authorization: Bearer` header.
//! Protected routers run [`require_auth`] as a route layer; handlers then
//! take [`CurrentUser`] as an extractor.

use crate::error::ApiError;
use crate::state::AppState;
use auth_service_shared::TokenData;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::ops::Deref;

/// Identity of the authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub TokenData);

impl Deref for CurrentUser {
    type Target = TokenData;

    fn deref(&self) -> &TokenData {
        &self.0
    }
}

/// Pull the bearer token out of the request headers.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthorized("Not authenticated".to_string())),
    }
}

fn resolve(headers: &HeaderMap, state: &AppState) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(headers)?;
    let data = state.jwt().verify_access_token(token)?;
    Ok(CurrentUser(data))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        let app_state = AppState::from_ref(state);
        resolve(&parts.headers, &app_state)
    }
}

/// Reject the request unless it carries a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve(request.headers(), &state)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
