/// Session management
///
/// Issues opaque session tokens for identities resolved by the authorizer and
/// lets callers redeem or update them.
pub mod manager;
pub mod models;
pub mod store;
pub mod token;

pub use manager::SessionManager;
pub use models::*;
pub use store::{SessionStats, SessionStore};
pub use token::{OsTokenGenerator, TokenGenerator};
