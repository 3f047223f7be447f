//! ECDSA signatures for key-pair authentication.
//!
//! Requests and responses are signed over the canonical payload text:
//! ```text
//! sign = hex(r || s) of ECDSA(secp256k1, SHA-256(data))
//! ```
//!
//! The per-signature nonce is derived from the private key and the message
//! hash (RFC 6979), so signing the same data twice with the same key yields
//! the same signature and never depends on the quality of a random source.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::auth::KeyPair;
use crate::error::CoinapultError;

/// Curve shared by client keys and the pinned server key.
pub const CURVE: &str = "secp256k1";
/// Message hash applied before signing and verifying.
pub const HASH_ALGORITHM: &str = "sha256";

/// Length of a hex-encoded signature: 32-byte `r` and 32-byte `s`.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// SHA-256 of the payload text.
pub fn message_digest(data: &str) -> [u8; 32] {
    Sha256::digest(data.as_bytes()).into()
}

/// Sign a payload with the account key, returning the `cpt-ecc-sign` value.
///
/// # Example
///
/// ```rust
/// use coinapult_client::auth::{KeyPair, sign_ecc};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let keypair = KeyPair::from_bytes(&[7u8; 32])?;
/// let first = sign_ecc(&keypair, "eyJ0aW1lc3RhbXAiOjF9")?;
/// let second = sign_ecc(&keypair, "eyJ0aW1lc3RhbXAiOjF9")?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
pub fn sign_ecc(keypair: &KeyPair, data: &str) -> Result<String, CoinapultError> {
    sign_with_key(keypair.signing_key(), data)
}

pub(crate) fn sign_with_key(key: &SigningKey, data: &str) -> Result<String, CoinapultError> {
    let digest = message_digest(data);
    let signature: Signature = key
        .sign_prehash(&digest)
        .map_err(|e| CoinapultError::Configuration(format!("ECDSA signing failed: {e}")))?;
    Ok(hex::encode(signature.to_bytes()))
}

/// Parse a hex signature in the exact form this protocol emits.
///
/// Anything but 128 lowercase hex digits is rejected, so two different sign
/// strings never map to the same signature.
pub(crate) fn parse_signature(sign: &str) -> Option<Signature> {
    if sign.len() != SIGNATURE_HEX_LEN
        || !sign.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return None;
    }
    let bytes = hex::decode(sign).ok()?;
    let signature = Signature::from_slice(&bytes).ok()?;
    Some(signature.normalize_s().unwrap_or(signature))
}

/// Check a hex signature over `data` against `key`.
pub(crate) fn verify_with_key(key: &VerifyingKey, data: &str, sign: &str) -> bool {
    let Some(signature) = parse_signature(sign) else {
        return false;
    };
    key.verify_prehash(&message_digest(data), &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> KeyPair {
        KeyPair::from_bytes(&[0x11; 32]).unwrap()
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = keypair();
        let sig1 = sign_ecc(&keypair, "eyJhIjoxfQ==").unwrap();
        let sig2 = sign_ecc(&keypair, "eyJhIjoxfQ==").unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_format() {
        let sig = sign_ecc(&keypair(), "payload").unwrap();
        assert_eq!(sig.len(), SIGNATURE_HEX_LEN);
        assert!(parse_signature(&sig).is_some());
    }

    #[test]
    fn test_signature_changes_with_data_and_key() {
        let keypair = keypair();
        let other = KeyPair::from_bytes(&[0x12; 32]).unwrap();

        let sig = sign_ecc(&keypair, "payload").unwrap();
        assert_ne!(sig, sign_ecc(&keypair, "payloae").unwrap());
        assert_ne!(sig, sign_ecc(&other, "payload").unwrap());
    }

    #[test]
    fn test_verify_with_own_key() {
        let keypair = keypair();
        let sig = sign_ecc(&keypair, "payload").unwrap();

        assert!(verify_with_key(keypair.verifying_key(), "payload", &sig));
        assert!(!verify_with_key(keypair.verifying_key(), "payloae", &sig));

        let other = KeyPair::from_bytes(&[0x12; 32]).unwrap();
        assert!(!verify_with_key(other.verifying_key(), "payload", &sig));
    }

    #[test]
    fn test_parse_rejects_non_canonical_hex() {
        let sig = sign_ecc(&keypair(), "payload").unwrap();

        assert!(parse_signature(&sig.to_uppercase()).is_none());
        assert!(parse_signature(&sig[..126]).is_none());
        assert!(parse_signature(&format!("{sig}00")).is_none());
        assert!(parse_signature(&"zz".repeat(64)).is_none());
        assert!(parse_signature(&"0".repeat(128)).is_none());
    }

    #[test]
    fn test_digest_is_sha256() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(message_digest("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
