//! Credential management for Coinapult API authentication.
//!
//! An account authenticates with exactly one of two kinds of credentials,
//! chosen when the client is built:
//!
//! - [`SharedSecret`]: an API key and secret, used for HMAC-SHA512 tags.
//! - [`KeyPair`]: a secp256k1 private key, used for ECDSA signatures.

use k256::SecretKey;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::CoinapultError;

/// Default environment variable holding the API key.
pub const API_KEY_ENV: &str = "COINAPULT_API_KEY";
/// Default environment variable holding the API secret.
pub const API_SECRET_ENV: &str = "COINAPULT_API_SECRET";
/// Default environment variable holding a PEM-encoded ECC private key.
pub const ECC_PRIVATE_KEY_ENV: &str = "COINAPULT_ECC_PRIVATE_KEY";

/// API key and shared secret.
#[derive(Clone)]
pub struct SharedSecret {
    api_key: String,
    api_secret: SecretString,
}

impl SharedSecret {
    /// Create credentials from an API key and secret.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    /// The API key (public identifier).
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    /// Read `COINAPULT_API_KEY` and `COINAPULT_API_SECRET`.
    pub fn from_env() -> Result<Self, CoinapultError> {
        Self::from_env_vars(API_KEY_ENV, API_SECRET_ENV)
    }

    /// Read credentials from custom environment variable names.
    pub fn from_env_vars(key_var: &str, secret_var: &str) -> Result<Self, CoinapultError> {
        let api_key = read_env(key_var)?;
        let api_secret = read_env(secret_var)?;
        Ok(Self::new(api_key, api_secret))
    }

    /// Like [`from_env`](Self::from_env), returning `None` when a variable is unset.
    pub fn try_from_env() -> Option<Self> {
        Self::from_env().ok()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// A secp256k1 key pair.
///
/// The public half is identified to the server by its hash: the lowercase
/// hex SHA-256 of the SPKI PEM text.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_key_pem: String,
    public_key_hash: String,
}

impl KeyPair {
    /// Wrap an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Result<Self, CoinapultError> {
        let public_key_pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CoinapultError::Configuration(format!("cannot encode public key: {e}")))?;
        let public_key_hash = hex::encode(Sha256::digest(public_key_pem.as_bytes()));

        Ok(Self {
            signing_key,
            public_key_pem,
            public_key_hash,
        })
    }

    /// Parse a PEM private key, either PKCS#8 (`PRIVATE KEY`) or SEC1
    /// (`EC PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, CoinapultError> {
        let signing_key = match SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|e| {
                    CoinapultError::Configuration(format!("unrecognized ECC private key: {e}"))
                })?,
        };
        Self::from_signing_key(signing_key)
    }

    /// Build from a raw 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoinapultError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CoinapultError::Configuration(format!("invalid ECC private key: {e}")))?;
        Self::from_signing_key(signing_key)
    }

    /// Generate a fresh key pair from the operating system RNG.
    pub fn generate() -> Result<Self, CoinapultError> {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Read a PEM private key from `COINAPULT_ECC_PRIVATE_KEY`.
    pub fn from_env() -> Result<Self, CoinapultError> {
        Self::from_pem(&read_env(ECC_PRIVATE_KEY_ENV)?)
    }

    /// SPKI PEM of the public key, as sent on account creation.
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// Hash identifying the public key to the server.
    pub fn public_key_hash(&self) -> &str {
        &self.public_key_hash
    }

    /// The public key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key_hash", &self.public_key_hash)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// The credentials a client authenticates with.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// HMAC-SHA512 over the request payload.
    SharedSecret(SharedSecret),
    /// ECDSA over the request payload.
    KeyPair(KeyPair),
}

impl Credentials {
    /// Short name of the signing scheme, for logs.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::SharedSecret(_) => "hmac",
            Self::KeyPair(_) => "ecc",
        }
    }
}

impl From<SharedSecret> for Credentials {
    fn from(value: SharedSecret) -> Self {
        Self::SharedSecret(value)
    }
}

impl From<KeyPair> for Credentials {
    fn from(value: KeyPair) -> Self {
        Self::KeyPair(value)
    }
}

fn read_env(var: &str) -> Result<String, CoinapultError> {
    std::env::var(var)
        .map_err(|_| CoinapultError::Configuration(format!("environment variable {var} not set")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::pkcs8::EncodePrivateKey;

    #[test]
    fn test_shared_secret_debug_redacted() {
        let creds = SharedSecret::new("my_key", "super_secret");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("my_key"));
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_shared_secret_accessors() {
        let creds = SharedSecret::new("key", "secret");
        assert_eq!(creds.api_key(), "key");
        assert_eq!(creds.expose_secret(), "secret");
    }

    #[test]
    fn test_missing_env_is_configuration_error() {
        let err = SharedSecret::from_env_vars(
            "COINAPULT_TEST_UNSET_KEY_VAR",
            "COINAPULT_TEST_UNSET_SECRET_VAR",
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_keypair_hash_is_sha256_of_pem() {
        let keypair = KeyPair::from_bytes(&[0x11; 32]).unwrap();
        assert!(keypair.public_key_pem().starts_with("-----BEGIN PUBLIC KEY-----\n"));
        assert_eq!(
            keypair.public_key_hash(),
            hex::encode(Sha256::digest(keypair.public_key_pem().as_bytes()))
        );
        assert_eq!(keypair.public_key_hash().len(), 64);
    }

    #[test]
    fn test_keypair_from_pkcs8_pem() {
        let original = KeyPair::from_bytes(&[0x22; 32]).unwrap();
        let pem = original
            .signing_key()
            .to_pkcs8_pem(LineEnding::LF)
            .unwrap();

        let parsed = KeyPair::from_pem(&pem).unwrap();
        assert_eq!(parsed.public_key_hash(), original.public_key_hash());
    }

    #[test]
    fn test_keypair_from_sec1_pem() {
        let secret = SecretKey::from_slice(&[0x33; 32]).unwrap();
        let pem = secret.to_sec1_pem(LineEnding::LF).unwrap();

        let parsed = KeyPair::from_pem(&pem).unwrap();
        let expected = KeyPair::from_bytes(&[0x33; 32]).unwrap();
        assert_eq!(parsed.public_key_hash(), expected.public_key_hash());
    }

    #[test]
    fn test_keypair_rejects_invalid_material() {
        assert!(KeyPair::from_pem("not a key").unwrap_err().is_configuration());
        assert!(KeyPair::from_bytes(&[0u8; 32]).is_err());
        assert!(KeyPair::from_bytes(&[1u8; 5]).is_err());
    }

    #[test]
    fn test_keypair_debug_redacted() {
        let keypair = KeyPair::generate().unwrap();
        let debug_str = format!("{:?}", keypair);
        assert!(debug_str.contains(keypair.public_key_hash()));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_credentials_scheme() {
        let shared: Credentials = SharedSecret::new("k", "s").into();
        assert_eq!(shared.scheme(), "hmac");
        let ecc: Credentials = KeyPair::from_bytes(&[0x11; 32]).unwrap().into();
        assert_eq!(ecc.scheme(), "ecc");
    }
}
