//! Verification of signed server responses.
//!
//! Key-pair responses arrive as an envelope:
//!
//! ```json
//! { "data": "<base64 of the JSON payload>", "sign": "<hex r||s>" }
//! ```
//!
//! The signature covers the `data` text and is checked against the Coinapult
//! public key compiled into this crate. A bad signature never produces an
//! error; it produces a [`VerifiedPayload`] whose [`is_valid`] is `false`.
//!
//! [`is_valid`]: VerifiedPayload::is_valid

use k256::ecdsa::VerifyingKey;
use k256::pkcs8::DecodePublicKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::canonical_decode;
use crate::auth::ecc::verify_with_key;
use crate::error::CoinapultError;

/// The Coinapult server public key (secp256k1, SPKI PEM).
pub const COINAPULT_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MFYwEAYHKoZIzj0CAQYFK4EEAAoDQgAEWp9wd4EuLhIZNaoUgZxQztSjrbqgTT0w
LBq8RwigNE6nOOXFEoGCjGfekugjrHWHUi8ms7bcfrowpaJKqMfZXg==
-----END PUBLIC KEY-----
";

/// A signed response as received over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Base64 of the JSON payload; this exact text is what was signed.
    pub data: String,
    /// Hex signature over `data`.
    pub sign: String,
}

impl ResponseEnvelope {
    /// Interpret a JSON body as an envelope, if it has that shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            data: object.get("data")?.as_str()?.to_string(),
            sign: object.get("sign")?.as_str()?.to_string(),
        })
    }
}

/// The outcome of verifying a [`ResponseEnvelope`].
///
/// The payload is only populated when the signature checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayload {
    payload: Map<String, Value>,
    valid_sign: bool,
}

impl VerifiedPayload {
    fn valid(payload: Map<String, Value>) -> Self {
        Self {
            payload,
            valid_sign: true,
        }
    }

    pub(crate) fn invalid() -> Self {
        Self {
            payload: Map::new(),
            valid_sign: false,
        }
    }

    /// Whether the server signature was valid.
    ///
    /// Callers must not act on a payload when this is `false`.
    pub fn is_valid(&self) -> bool {
        self.valid_sign
    }

    /// The decoded payload (empty when the signature was invalid).
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Look up a payload member.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The payload if, and only if, the signature was valid.
    pub fn into_payload(self) -> Option<Map<String, Value>> {
        self.valid_sign.then_some(self.payload)
    }
}

/// Checks server envelopes against a fixed public key.
#[derive(Debug, Clone)]
pub struct ResponseVerifier {
    key: VerifyingKey,
}

impl ResponseVerifier {
    /// A verifier trusting only [`COINAPULT_PUBLIC_KEY_PEM`].
    pub fn pinned() -> Result<Self, CoinapultError> {
        let key = VerifyingKey::from_public_key_pem(COINAPULT_PUBLIC_KEY_PEM).map_err(|e| {
            CoinapultError::Configuration(format!("malformed pinned server key: {e}"))
        })?;
        Ok(Self { key })
    }

    #[cfg(test)]
    pub(crate) fn with_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Verify an envelope and decode its payload.
    pub fn verify(&self, envelope: &ResponseEnvelope) -> VerifiedPayload {
        if !verify_with_key(&self.key, &envelope.data, &envelope.sign) {
            tracing::warn!("response signature verification failed");
            return VerifiedPayload::invalid();
        }

        match canonical_decode(&envelope.data) {
            Ok(Value::Object(payload)) => VerifiedPayload::valid(payload),
            Ok(_) => {
                tracing::warn!("signed response payload is not a JSON object");
                VerifiedPayload::invalid()
            }
            Err(e) => {
                tracing::warn!(error = %e, "signed response payload could not be decoded");
                VerifiedPayload::invalid()
            }
        }
    }
}

/// Build an envelope the way the server does, for tests.
#[cfg(test)]
pub(crate) fn signed_envelope(
    key: &k256::ecdsa::SigningKey,
    payload: &crate::auth::ParameterMapping,
) -> ResponseEnvelope {
    let data = crate::auth::canonical_encode(payload).unwrap();
    let sign = crate::auth::ecc::sign_with_key(key, &data).unwrap();
    ResponseEnvelope { data, sign }
}
