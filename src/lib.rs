/// Terrabaq - session gateway
///
/// Exchanges authorization codes with an upstream authorizer, hands out
/// opaque session tokens, and lets callers redeem them for the cached
/// user identity or update that identity's roles.
pub mod api;
pub mod authorizer;
pub mod config;
pub mod context;
pub mod error;
pub mod server;
pub mod session;

pub use context::AppContext;
