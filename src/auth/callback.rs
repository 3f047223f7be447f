//! Authentication of inbound Coinapult callbacks.
//!
//! Callbacks carry the account's API key, an HMAC-SHA512 tag and the raw
//! data. The tag is recomputed locally and compared in constant time.

use hmac::Mac;

use crate::auth::SharedSecret;
use crate::auth::signature::keyed_mac;

/// Result of [`authenticate_callback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAuth {
    /// Both the key and the tag matched.
    pub ok: bool,
    /// The locally computed tag; empty when the key did not match.
    pub recomputed_hmac: String,
}

impl CallbackAuth {
    pub(crate) fn rejected() -> Self {
        Self {
            ok: false,
            recomputed_hmac: String::new(),
        }
    }
}

/// Authenticate a callback claiming to come from Coinapult.
///
/// The key must equal the local API key exactly. The tag is accepted in
/// either hex case. Mismatches are reported through [`CallbackAuth::ok`],
/// never as errors.
///
/// # Example
///
/// ```rust
/// use coinapult_client::auth::{SharedSecret, authenticate_callback, sign_hmac};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = SharedSecret::new("k1", "s1");
/// let tag = sign_hmac(&credentials, "callback-body")?;
/// let result = authenticate_callback(&credentials, "k1", &tag, "callback-body");
/// assert!(result.ok);
/// # Ok(())
/// # }
/// ```
pub fn authenticate_callback(
    credentials: &SharedSecret,
    received_key: &str,
    received_hmac: &str,
    received_data: &str,
) -> CallbackAuth {
    if received_key != credentials.api_key() {
        tracing::debug!("callback key does not match the local API key");
        return CallbackAuth::rejected();
    }

    let Ok(mac) = keyed_mac(credentials, received_data) else {
        return CallbackAuth::rejected();
    };
    let recomputed_hmac = hex::encode(mac.clone().finalize().into_bytes());

    let ok = match hex::decode(received_hmac) {
        Ok(tag) => mac.verify_slice(&tag).is_ok(),
        Err(_) => false,
    };
    if !ok {
        tracing::debug!("callback HMAC mismatch");
    }

    CallbackAuth {
        ok,
        recomputed_hmac,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign_hmac;

    fn credentials() -> SharedSecret {
        SharedSecret::new("k1", "s1")
    }

    #[test]
    fn test_matching_callback_is_accepted() {
        let tag = sign_hmac(&credentials(), "data").unwrap();
        let result = authenticate_callback(&credentials(), "k1", &tag, "data");

        assert!(result.ok);
        assert_eq!(result.recomputed_hmac, tag);
    }

    #[test]
    fn test_uppercase_tag_is_accepted() {
        let tag = sign_hmac(&credentials(), "data").unwrap().to_uppercase();
        assert!(authenticate_callback(&credentials(), "k1", &tag, "data").ok);
    }

    #[test]
    fn test_changed_data_is_rejected() {
        let tag = sign_hmac(&credentials(), "data").unwrap();
        let result = authenticate_callback(&credentials(), "k1", &tag, "dat4");

        assert!(!result.ok);
        assert_ne!(result.recomputed_hmac, tag);
    }

    #[test]
    fn test_changed_secret_is_rejected() {
        let tag = sign_hmac(&credentials(), "data").unwrap();
        let rotated = SharedSecret::new("k1", "s2");
        assert!(!authenticate_callback(&rotated, "k1", &tag, "data").ok);
    }

    #[test]
    fn test_wrong_key_is_rejected_without_tag() {
        let tag = sign_hmac(&credentials(), "data").unwrap();
        let result = authenticate_callback(&credentials(), "k2", &tag, "data");

        assert!(!result.ok);
        assert!(result.recomputed_hmac.is_empty());
    }

    #[test]
    fn test_garbage_tag_is_rejected() {
        assert!(!authenticate_callback(&credentials(), "k1", "zz", "data").ok);
        assert!(!authenticate_callback(&credentials(), "k1", "", "data").ok);
        assert!(!authenticate_callback(&credentials(), "k1", "abcd", "data").ok);
    }
}
