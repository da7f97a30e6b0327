//! Input validation functions
//!
//! This module provides validation utilities for registration and login input.
//! Email format checks are delegated to the `validator` crate.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use validator::ValidateEmail;

use crate::errors::ValidationError;
use crate::types::{LoginForm, RegisterUserRequest};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt only reads the first 72 bytes of its input
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const EMAIL_MAX_LEN: usize = 255;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("username regex is valid"));

/// Validate username length and character set
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new(
            "username",
            format!("must be at least {} characters", USERNAME_MIN_LEN),
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new(
            "username",
            format!("must be at most {} characters", USERNAME_MAX_LEN),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new(
            "username",
            "may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email", "cannot be empty"));
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err(ValidationError::new("email", "too long"));
    }
    if !email.validate_email() {
        return Err(ValidationError::new("email", "invalid format"));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::new(
            "password",
            format!("must be at most {} bytes", PASSWORD_MAX_BYTES),
        ));
    }
    Ok(())
}

/// Validate a full registration request, reporting the first failing field
pub fn validate_registration(req: &RegisterUserRequest) -> Result<(), ValidationError> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)
}

/// Validate the OAuth2 password-grant form shape.
///
/// An empty `grant_type` counts as absent.
///
/// Credentials themselves are not checked here: a login with a malformed
/// username must fail exactly like one with an unknown username.
pub fn validate_login_form(form: &LoginForm) -> Result<(), ValidationError> {
    match form.grant_type.as_deref() {
        None | Some("") | Some("password") => Ok(()),
        Some(_) => Err(ValidationError::new("grant_type", "must be 'password'")),
    }
}
