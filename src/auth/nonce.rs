//! Nonce generation for Coinapult request signing.
//!
//! Every signed request carries a short random token drawn from the base58
//! alphabet. The server keeps the replay state; this client never stores or
//! reuses a nonce.

use rand::Rng;

/// Base58 alphabet: digits and letters without `0`, `O`, `I` and `l`.
pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Nonce length used by Coinapult clients.
pub const DEFAULT_NONCE_LENGTH: usize = 22;

/// Generate a random base58 nonce of the given length.
///
/// Randomness comes from the thread-local CSPRNG, which is seeded from the
/// operating system. If the OS cannot provide entropy the call panics; there
/// is no meaningful way to sign requests without it.
pub fn generate_nonce(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| BASE58_ALPHABET[rng.gen_range(0..BASE58_ALPHABET.len())] as char)
        .collect()
}

/// Trait for providing nonces for signed requests.
pub trait NonceProvider: Send + Sync {
    /// Generate the nonce for the next request.
    fn next_nonce(&self) -> String;
}

/// A nonce provider that draws fresh random base58 tokens.
#[derive(Debug, Clone)]
pub struct RandomNonce {
    length: usize,
}

impl RandomNonce {
    /// Create a provider producing nonces of [`DEFAULT_NONCE_LENGTH`].
    pub fn new() -> Self {
        Self::with_length(DEFAULT_NONCE_LENGTH)
    }

    /// Create a provider producing nonces of a custom length.
    pub fn with_length(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceProvider for RandomNonce {
    fn next_nonce(&self) -> String {
        generate_nonce(self.length)
    }
}
