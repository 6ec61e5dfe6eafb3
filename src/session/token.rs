/// Session token generation
use super::SessionToken;
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind each token
pub const TOKEN_BYTES: usize = 16;

/// Source of fresh session tokens
///
/// Returns [`SessionToken::empty`] when randomness is unavailable; callers
/// must refuse to store an empty token.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> SessionToken;
}

/// Draws every token straight from the operating system RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self) -> SessionToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => SessionToken::new(hex::encode(bytes)),
            Err(e) => {
                tracing::error!("OS random source failed: {}", e);
                SessionToken::empty()
            }
        }
    }
}
