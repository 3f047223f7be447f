//! HMAC-SHA512 tags for shared-secret authentication.
//!
//! Coinapult shared-secret requests carry a tag computed as:
//! ```text
//! hex(HMAC-SHA512(key = api_secret, message = signdata))
//! ```
//!
//! where `signdata` is the canonical payload also sent as the `data` form
//! field. The tag travels in the `cpt-hmac` header next to `cpt-key`.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::auth::SharedSecret;
use crate::error::CoinapultError;

pub(crate) type HmacSha512 = Hmac<Sha512>;

/// Compute the lowercase hex HMAC-SHA512 tag of `message`.
///
/// # Example
///
/// ```rust
/// use coinapult_client::auth::{SharedSecret, sign_hmac};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = SharedSecret::new("api_key", "api_secret");
/// let tag = sign_hmac(&credentials, "eyJub25jZSI6IjEifQ==")?;
/// assert_eq!(tag.len(), 128);
/// # Ok(())
/// # }
/// ```
pub fn sign_hmac(credentials: &SharedSecret, message: &str) -> Result<String, CoinapultError> {
    let mac = keyed_mac(credentials, message)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// A MAC keyed with the API secret that has already absorbed `message`.
pub(crate) fn keyed_mac(
    credentials: &SharedSecret,
    message: &str,
) -> Result<HmacSha512, CoinapultError> {
    let mut mac = HmacSha512::new_from_slice(credentials.expose_secret().as_bytes())
        .map_err(|e| CoinapultError::Configuration(format!("Invalid HMAC key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_vector() {
        // RFC 4231 test case 2.
        let credentials = SharedSecret::new("unused", "Jefe");
        let tag = sign_hmac(&credentials, "what do ya want for nothing?").unwrap();
        assert_eq!(
            tag,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_tag_is_lowercase_hex() {
        let credentials = SharedSecret::new("k", "s");
        let tag = sign_hmac(&credentials, "payload").unwrap();
        assert_eq!(tag.len(), 128);
        assert!(tag.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_tag_consistency() {
        let credentials = SharedSecret::new("k", "s");
        assert_eq!(
            sign_hmac(&credentials, "payload").unwrap(),
            sign_hmac(&credentials, "payload").unwrap()
        );
    }

    #[test]
    fn test_tag_changes_with_message_and_secret() {
        let credentials = SharedSecret::new("k", "s");
        let other_secret = SharedSecret::new("k", "t");

        let tag = sign_hmac(&credentials, "payload").unwrap();
        assert_ne!(tag, sign_hmac(&credentials, "payloae").unwrap());
        assert_ne!(tag, sign_hmac(&other_secret, "payload").unwrap());
    }
}
