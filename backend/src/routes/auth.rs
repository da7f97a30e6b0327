//! Authentication routes
//!
//! Registration and the OAuth2 password-grant token endpoint.
//!
//! bcrypt work for both runs on the blocking thread pool.

use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use auth_service_shared::{LoginForm, RegisterUserRequest, Token};
use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};

/// Create auth routes
///
/// Paths are spelled out in full rather than nested: a nested `"/"` route
/// would only match `/auth`, never `/auth/`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/", post(register))
        .route("/auth/token", post(login_for_access_token))
}

/// Register a new user
///
/// POST /api/v1/auth/
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> ApiResult<StatusCode> {
    AuthService::register_user(state.users(), state.passwords(), &req).await?;
    Ok(StatusCode::CREATED)
}

/// Exchange username/password form data for a bearer token
///
/// POST /api/v1/auth/token
async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<Token>> {
    let token = AuthService::login_for_access_token(state.users(), state.jwt(), &form).await?;
    Ok(Json(token))
}
