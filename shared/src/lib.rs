//! Auth Service Shared Library
//!
//! Request/response types, the user model and input validation shared
//! between the backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::User;
pub use types::*;
