//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything here is built once at startup and read-only afterwards.

use crate::auth::{JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::UserStore;
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
///
/// All fields are Arc'd or `Copy`, so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// User persistence
    pub users: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// bcrypt settings
    pub passwords: PasswordService,
    /// Prometheus recorder handle, when one is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the JWT keys from the configured secret; fails when the
    /// configured algorithm cannot be used with a shared secret.
    pub fn new(users: Arc<dyn UserStore>, config: AppConfig) -> Result<Self> {
        let jwt = JwtService::from_config(&config.jwt)?;
        let passwords = PasswordService::new(config.password.bcrypt_cost);

        Ok(Self {
            users,
            config: Arc::new(config),
            jwt,
            passwords,
            metrics: None,
        })
    }

    /// Attach an installed Prometheus recorder
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the user store
    #[inline]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }
}
