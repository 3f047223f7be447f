//! Authentication module for the Coinapult API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Nonce and timestamp generation for replay protection
//! - Canonical payload encoding shared by signer and verifier
//! - HMAC-SHA512 and ECDSA (secp256k1) request signing
//! - Verification of signed server responses and inbound callbacks

mod authenticator;
mod callback;
mod clock;
mod credentials;
pub(crate) mod ecc;
mod encoding;
mod nonce;
mod signature;
mod verify;

pub use authenticator::{RequestAuthenticator, SignedRequest, headers};
pub use callback::{CallbackAuth, authenticate_callback};
pub use clock::{Clock, SystemClock};
pub use credentials::{
    API_KEY_ENV, API_SECRET_ENV, Credentials, ECC_PRIVATE_KEY_ENV, KeyPair, SharedSecret,
};
pub use ecc::{CURVE, HASH_ALGORITHM, SIGNATURE_HEX_LEN, message_digest, sign_ecc};
pub use encoding::{ParamValue, ParameterMapping, canonical_decode, canonical_encode};
pub use nonce::{BASE58_ALPHABET, DEFAULT_NONCE_LENGTH, NonceProvider, RandomNonce, generate_nonce};
pub use signature::sign_hmac;
pub use verify::{COINAPULT_PUBLIC_KEY_PEM, ResponseEnvelope, ResponseVerifier, VerifiedPayload};

#[cfg(test)]
pub(crate) use verify::signed_envelope;
