//! Authentication module
//!
//! Provides JWT-based authentication with bcrypt password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtKeys, JwtService};
pub use middleware::{bearer_token, require_auth, CurrentUser};
pub use password::PasswordService;
