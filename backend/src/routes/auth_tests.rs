//! Router-level tests for authentication
//!
//! Unauthenticated requests to protected endpoints must return 401, and a
//! registered user must be able to log in and reach them.

#[cfg(test)]
mod tests {
    use crate::auth::JwtService;
    use crate::config::AppConfig;
    use crate::repositories::{InMemoryUserStore, RepositoryError, RepositoryResult, UserStore};
    use crate::routes::create_router;
    use crate::state::AppState;
    use async_trait::async_trait;
    use auth_service_shared::User;
    use axum::{
        body::Body,
        http::{header::WWW_AUTHENTICATE, Request, StatusCode},
        Router,
    };
    use chrono::{Duration, Utc};
    use jsonwebtoken::Algorithm;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const ME: &str = "/api/v1/users/me";

    fn create_test_state() -> AppState {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        AppState::new(Arc::new(InMemoryUserStore::new()), config).unwrap()
    }

    /// Store that accepts no writes, as if the database were unreachable
    struct UnavailableStore;

    #[async_trait]
    impl UserStore for UnavailableStore {
        async fn find_by_username(&self, _username: &str) -> RepositoryResult<Option<User>> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: uuid::Uuid) -> RepositoryResult<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, _user: &User) -> RepositoryResult<()> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> RepositoryResult<()> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    /// Generate random invalid tokens
    fn invalid_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("".to_string()),
            // Random string (not a valid JWT)
            "[a-zA-Z0-9]{10,50}",
            // Malformed JWT (wrong number of parts)
            "[a-zA-Z0-9]{10}\\.[a-zA-Z0-9]{10}",
            // Valid format but invalid signature
            "[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}",
        ]
    }

    /// Generate random authorization header formats
    fn auth_header_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            // Missing Bearer prefix
            invalid_token_strategy().prop_map(Some),
            // Wrong prefix
            invalid_token_strategy().prop_map(|t| Some(format!("Basic {}", t))),
            // Bearer with invalid token
            invalid_token_strategy().prop_map(|t| Some(format!("Bearer {}", t))),
        ]
    }

    async fn get_me(app: Router, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(ME).method("GET");
        if let Some(header) = authorization {
            builder = builder.header("Authorization", header);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn register(app: Router, username: &str, password: &str) -> StatusCode {
        let body = json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
        });
        let request = Request::builder()
            .uri("/api/v1/auth/")
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    async fn login(app: Router, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri("/api/v1/auth/token")
            .method("POST")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "grant_type=password&username={}&password={}",
                username, password
            )))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Unauthenticated requests to protected endpoints return 401
        #[test]
        fn prop_unauthenticated_requests_return_401(
            auth_header in auth_header_strategy()
        ) {
            let status = tokio_test::block_on(async {
                let app = create_router(create_test_state());
                get_me(app, auth_header.as_deref()).await.0
            });

            prop_assert_eq!(
                status,
                StatusCode::UNAUTHORIZED,
                "Expected 401 for unauthenticated request"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_auth_header_returns_401_with_challenge() {
        let app = create_router(create_test_state());
        let request = Request::builder()
            .uri(ME)
            .method("GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_returns_401() {
        let state = create_test_state();
        let other = JwtService::new("wrong-secret-key", Algorithm::HS256, Duration::minutes(30))
            .unwrap();
        let token = other.issue_access_token("alice", uuid::Uuid::new_v4()).unwrap();

        let (status, body) =
            get_me(create_router(state), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_expired_token_returns_401() {
        let state = create_test_state();
        let token = state
            .jwt()
            .create_access_token_at(
                "alice",
                uuid::Uuid::new_v4(),
                Duration::minutes(30),
                Utc::now() - Duration::minutes(31),
            )
            .unwrap();

        let (status, _) = get_me(create_router(state), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_for_unknown_user_passes_auth() {
        let state = create_test_state();
        let token = state
            .jwt()
            .issue_access_token("ghost", uuid::Uuid::new_v4())
            .unwrap();

        let (status, _) = get_me(create_router(state), Some(&format!("Bearer {}", token))).await;

        // Auth passed; the user simply does not exist
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_login_and_fetch_profile() {
        let app = create_router(create_test_state());

        assert_eq!(
            register(app.clone(), "alice", "wonderland-42").await,
            StatusCode::CREATED
        );

        let (status, token) = login(app.clone(), "alice", "wonderland-42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(token["token_type"], "bearer");
        let access_token = token["access_token"].as_str().unwrap();

        let (status, profile) = get_me(app, Some(&format!("Bearer {}", access_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["username"], "alice");
        assert_eq!(profile["email"], "alice@example.com");
        assert!(profile.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = create_router(create_test_state());
        register(app.clone(), "bob", "builder-1234").await;

        let (wrong_status, wrong_body) = login(app.clone(), "bob", "not-the-password").await;
        let (unknown_status, unknown_body) = login(app, "nobody", "builder-1234").await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn test_duplicate_registration_returns_409() {
        let app = create_router(create_test_state());
        assert_eq!(
            register(app.clone(), "carol", "password-123").await,
            StatusCode::CREATED
        );
        assert_eq!(
            register(app, "carol", "password-456").await,
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_registration_store_failure_returns_500() {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        let state = AppState::new(Arc::new(UnavailableStore), config).unwrap();

        let body = json!({
            "username": "erin",
            "email": "erin@example.com",
            "password": "password-123",
        });
        let request = Request::builder()
            .uri("/api/v1/auth/")
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = create_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_registration_returns_400() {
        let app = create_router(create_test_state());
        assert_eq!(register(app, "dave", "short").await, StatusCode::BAD_REQUEST);
    }
}
