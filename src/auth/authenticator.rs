//! Request signing for both authentication schemes.
//!
//! ## Shared secret
//!
//! `nonce`, `timestamp` (string) and `endpoint` (`/` + method path) are
//! appended to the parameters, which are then canonically encoded:
//!
//! ```text
//! cpt-key:  <api key>
//! cpt-hmac: hex(HMAC-SHA512(api_secret, signdata))
//! body:     data=<signdata>
//! ```
//!
//! ## Key pair
//!
//! `timestamp` (integer) is appended, plus a `nonce` unless the request
//! creates the account:
//!
//! ```text
//! cpt-ecc-pub:  <public key hash>          (authenticated)
//! cpt-ecc-new:  base64(<public key PEM>)   (account creation)
//! cpt-ecc-sign: hex(ECDSA(SHA-256(data)))
//! body:         data=<data>
//! ```

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::auth::{
    Clock, Credentials, KeyPair, NonceProvider, ParameterMapping, RandomNonce, SharedSecret,
    SystemClock, canonical_encode, sign_ecc, sign_hmac,
};
use crate::error::CoinapultError;

/// Wire header names.
pub mod headers {
    /// API key (shared secret).
    pub const KEY: &str = "cpt-key";
    /// HMAC tag (shared secret).
    pub const HMAC: &str = "cpt-hmac";
    /// Public key hash identifying an existing account (key pair).
    pub const ECC_PUB: &str = "cpt-ecc-pub";
    /// Base64 public key PEM for account creation (key pair).
    pub const ECC_NEW: &str = "cpt-ecc-new";
    /// ECDSA signature (key pair).
    pub const ECC_SIGN: &str = "cpt-ecc-sign";
}

/// Headers and body for one signed call.
///
/// Not `Clone`: a signed request is handed to the transport once and a
/// retry has to be signed again with a fresh nonce and timestamp.
#[derive(Debug)]
pub struct SignedRequest {
    headers: Vec<(&'static str, String)>,
    data: String,
}

impl SignedRequest {
    /// Headers in the order they are sent.
    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    /// Look up a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The signed payload (value of the `data` form field).
    pub fn data(&self) -> &str {
        &self.data
    }

    /// URL-encoded form body, `data=<payload>`.
    pub fn form_body(&self) -> Result<String, CoinapultError> {
        serde_urlencoded::to_string([("data", self.data.as_str())])
            .map_err(|e| CoinapultError::Configuration(format!("cannot encode request body: {e}")))
    }

    /// Consume the request into its headers and form body.
    pub fn into_parts(self) -> Result<(Vec<(&'static str, String)>, String), CoinapultError> {
        let body = self.form_body()?;
        Ok((self.headers, body))
    }
}

/// Signs outbound requests with the client's credentials.
///
/// The signing scheme follows from the [`Credentials`] variant; a request
/// never carries headers of both schemes.
#[derive(Clone)]
pub struct RequestAuthenticator {
    credentials: Credentials,
    nonce_provider: Arc<dyn NonceProvider>,
    clock: Arc<dyn Clock>,
}

impl RequestAuthenticator {
    /// Create an authenticator with random nonces and the system clock.
    pub fn new(credentials: impl Into<Credentials>) -> Self {
        Self {
            credentials: credentials.into(),
            nonce_provider: Arc::new(RandomNonce::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the nonce provider.
    pub fn with_nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = provider;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The credentials in use.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign a call to `method` (e.g. `t/send`).
    pub fn sign(
        &self,
        method: &str,
        params: ParameterMapping,
    ) -> Result<SignedRequest, CoinapultError> {
        match &self.credentials {
            Credentials::SharedSecret(secret) => self.sign_shared_secret(secret, method, params),
            Credentials::KeyPair(keypair) => self.sign_keypair(keypair, params, false),
        }
    }

    /// Sign the account-creation call, which announces the public key.
    ///
    /// Only key-pair credentials can create an account.
    pub fn sign_new_account(
        &self,
        params: ParameterMapping,
    ) -> Result<SignedRequest, CoinapultError> {
        match &self.credentials {
            Credentials::KeyPair(keypair) => self.sign_keypair(keypair, params, true),
            Credentials::SharedSecret(_) => Err(CoinapultError::Configuration(
                "account creation requires key-pair credentials".to_string(),
            )),
        }
    }

    fn sign_shared_secret(
        &self,
        secret: &SharedSecret,
        method: &str,
        mut params: ParameterMapping,
    ) -> Result<SignedRequest, CoinapultError> {
        params.insert("nonce", self.nonce_provider.next_nonce());
        params.insert("timestamp", self.clock.unix_timestamp().to_string());
        params.insert("endpoint", format!("/{}", method.trim_start_matches('/')));

        let data = canonical_encode(&params)?;
        let tag = sign_hmac(secret, &data)?;
        tracing::debug!(method, scheme = "hmac", "signed request");

        Ok(SignedRequest {
            headers: vec![
                (headers::KEY, secret.api_key().to_string()),
                (headers::HMAC, tag),
            ],
            data,
        })
    }

    fn sign_keypair(
        &self,
        keypair: &KeyPair,
        mut params: ParameterMapping,
        new_account: bool,
    ) -> Result<SignedRequest, CoinapultError> {
        let identity = if new_account {
            (headers::ECC_NEW, BASE64.encode(keypair.public_key_pem()))
        } else {
            params.insert("nonce", self.nonce_provider.next_nonce());
            (headers::ECC_PUB, keypair.public_key_hash().to_string())
        };
        params.insert("timestamp", self.clock.unix_timestamp());

        let data = canonical_encode(&params)?;
        let signature = sign_ecc(keypair, &data)?;
        tracing::debug!(new_account, scheme = "ecc", "signed request");

        Ok(SignedRequest {
            headers: vec![identity, (headers::ECC_SIGN, signature)],
            data,
        })
    }
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
