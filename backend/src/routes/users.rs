//! User routes
//!
//! Everything under `/users` sits behind [`require_auth`].

use crate::auth::{require_auth, CurrentUser};
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use auth_service_shared::UserProfile;
use axum::{extract::State, middleware, routing::get, Json, Router};

/// Create user routes
pub fn users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Get the authenticated user's profile
///
/// GET /api/v1/users/me
async fn get_current_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = AuthService::get_profile(state.users(), current_user.user_id).await?;
    Ok(Json(profile))
}
