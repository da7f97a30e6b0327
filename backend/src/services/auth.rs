//! Authentication service: credential checks, token minting, registration
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - JWT service is passed by reference (pre-computed keys)

use crate::auth::{JwtService, PasswordService};
use crate::error::{ApiError, ApiResult};
use crate::repositories::UserStore;
use auth_service_shared::validation::{validate_login_form, validate_registration};
use auth_service_shared::{LoginForm, RegisterUserRequest, Token, User, UserProfile};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Check a username/password pair against the store.
    ///
    /// Unknown user and wrong password both yield `Ok(None)`; callers cannot
    /// tell them apart.
    pub async fn authenticate_user(
        store: &dyn UserStore,
        username: &str,
        password: &str,
    ) -> ApiResult<Option<User>> {
        let Some(user) = store.find_by_username(username).await? else {
            warn!("Failed login attempt for user: {}", username);
            return Ok(None);
        };

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            warn!("Failed login attempt for user: {}", username);
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Exchange a password-grant form for a bearer token
    pub async fn login_for_access_token(
        store: &dyn UserStore,
        jwt_service: &JwtService,
        form: &LoginForm,
    ) -> ApiResult<Token> {
        validate_login_form(form)?;

        let Some(user) = Self::authenticate_user(store, &form.username, &form.password).await?
        else {
            metrics::counter!("auth_login_attempts_total", "outcome" => "failure").increment(1);
            return Err(ApiError::invalid_login());
        };

        let access_token = jwt_service
            .issue_access_token(&user.username, user.id)
            .map_err(ApiError::Internal)?;

        metrics::counter!("auth_login_attempts_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, "User logged in");

        Ok(Token::bearer(access_token))
    }

    /// Create a new account
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    pub async fn register_user(
        store: &dyn UserStore,
        passwords: &PasswordService,
        req: &RegisterUserRequest,
    ) -> ApiResult<User> {
        validate_registration(req)?;

        let password_hash = passwords
            .hash_async(req.password.clone())
            .await
            .map_err(|e| {
                error!("Error registering user: {} with Error: {:#}", req.username, e);
                ApiError::Internal(e)
            })?;

        let user = User::new(req.username.as_str(), req.email.as_str(), password_hash);

        store.insert(&user).await.map_err(|e| {
            error!("Error registering user: {} with Error: {}", req.username, e);
            ApiError::from(e)
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Profile of the authenticated user
    pub async fn get_profile(store: &dyn UserStore, user_id: Uuid) -> ApiResult<UserProfile> {
        let user = store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserProfile::from(user))
    }
}
