//! Coinapult REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde_json::Value;
use url::Url;

use crate::auth::{
    Clock, Credentials, NonceProvider, ParameterMapping, RequestAuthenticator, ResponseEnvelope,
    ResponseVerifier, SignedRequest, VerifiedPayload,
};
use crate::error::{ApiError, CoinapultError};
use crate::rest::endpoints::COINAPULT_BASE_URL;

/// The Coinapult REST API client.
///
/// Signed calls use the credentials given to the builder: a
/// [`SharedSecret`](crate::auth::SharedSecret) signs with HMAC-SHA512, a
/// [`KeyPair`](crate::auth::KeyPair) with ECDSA, in which case signed
/// responses are verified against the pinned Coinapult key.
///
/// The client never retries. Every call signs a fresh nonce and timestamp,
/// so retrying means calling the endpoint method again.
///
/// # Example
///
/// ```rust,no_run
/// use coinapult_client::auth::SharedSecret;
/// use coinapult_client::rest::CoinapultClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = CoinapultClient::builder()
///         .credentials(SharedSecret::new("api_key", "api_secret"))
///         .build()?;
///
///     let info = client.account_info().await?;
///     println!("Account: {:?}", info);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct CoinapultClient {
    http_client: ClientWithMiddleware,
    base_url: Url,
    authenticator: Option<Arc<RequestAuthenticator>>,
    pub(crate) verifier: Arc<ResponseVerifier>,
}

/// Body of a signed call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Plain JSON, as returned to shared-secret clients.
    ///
    /// Key-pair clients never see this variant: a reply without a signed
    /// envelope is reported as an unverified payload.
    Plain(Value),
    /// A signed envelope after verification against the pinned key.
    Verified(VerifiedPayload),
}

impl ApiResponse {
    /// Whether the body may be acted upon.
    ///
    /// `false` only for envelopes whose signature did not verify.
    pub fn is_trusted(&self) -> bool {
        match self {
            Self::Plain(_) => true,
            Self::Verified(payload) => payload.is_valid(),
        }
    }

    /// The body as JSON, or `None` if the signature did not verify.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Plain(value) => Some(value),
            Self::Verified(payload) => payload.into_payload().map(Value::Object),
        }
    }
}

impl CoinapultClient {
    /// Create a client without credentials.
    ///
    /// Only the public ticker can be queried.
    pub fn new() -> Result<Self, CoinapultError> {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> CoinapultClientBuilder {
        CoinapultClientBuilder::new()
    }

    /// The credentials in use, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.authenticator.as_deref().map(RequestAuthenticator::credentials)
    }

    pub(crate) fn authenticator(&self) -> Result<&RequestAuthenticator, CoinapultError> {
        self.authenticator
            .as_deref()
            .ok_or(CoinapultError::MissingCredentials)
    }

    fn endpoint_url(&self, method: &str) -> Result<Url, CoinapultError> {
        Ok(self.base_url.join(method.trim_start_matches('/'))?)
    }

    /// Make an unsigned GET request with query parameters.
    pub(crate) async fn public_get(
        &self,
        method: &str,
        params: &ParameterMapping,
    ) -> Result<Value, CoinapultError> {
        let mut url = self.endpoint_url(method)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.to_string_pairs());
        }
        tracing::debug!(method, "sending public request");
        let response = self.http_client.get(url).send().await?;
        self.parse_response(response).await
    }

    /// Sign `params` for `method` and POST them.
    pub(crate) async fn signed_post(
        &self,
        method: &str,
        params: ParameterMapping,
    ) -> Result<ApiResponse, CoinapultError> {
        let authenticator = self.authenticator()?;
        let request = authenticator.sign(method, params)?;
        let body = self.send_signed(method, request).await?;

        match authenticator.credentials() {
            Credentials::KeyPair(_) => match ResponseEnvelope::from_value(&body) {
                Some(envelope) => Ok(ApiResponse::Verified(self.verifier.verify(&envelope))),
                None => {
                    tracing::warn!(method, "unsigned reply to a key-pair request");
                    Ok(ApiResponse::Verified(VerifiedPayload::invalid()))
                }
            },
            Credentials::SharedSecret(_) => Ok(ApiResponse::Plain(body)),
        }
    }

    /// Send an already signed request.
    pub(crate) async fn send_signed(
        &self,
        method: &str,
        request: SignedRequest,
    ) -> Result<Value, CoinapultError> {
        let url = self.endpoint_url(method)?;
        let (headers, body) = request.into_parts()?;

        let mut builder = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        tracing::debug!(method, "sending signed request");
        let response = builder.body(body).send().await?;
        self.parse_response(response).await
    }

    /// Parse a response from the Coinapult API.
    async fn parse_response(&self, response: reqwest::Response) -> Result<Value, CoinapultError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CoinapultError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|e| {
            CoinapultError::InvalidResponse(format!(
                "Failed to parse response: {}. Body: {}",
                e, body
            ))
        })?;

        if let Some(error) = parsed.get("error") {
            return Err(CoinapultError::Api(ApiError::from_value(error)));
        }

        Ok(parsed)
    }
}

impl std::fmt::Debug for CoinapultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinapultClient")
            .field("base_url", &self.base_url.as_str())
            .field(
                "scheme",
                &self.credentials().map(Credentials::scheme).unwrap_or("none"),
            )
            .finish()
    }
}

/// Builder for [`CoinapultClient`].
pub struct CoinapultClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    nonce_provider: Option<Arc<dyn NonceProvider>>,
    clock: Option<Arc<dyn Clock>>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl CoinapultClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: COINAPULT_BASE_URL.to_string(),
            credentials: None,
            nonce_provider: None,
            clock: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the credentials for signed requests.
    pub fn credentials(mut self, credentials: impl Into<Credentials>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Set a custom nonce provider.
    pub fn nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = Some(provider);
        self
    }

    /// Set a custom timestamp source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set a timeout for each HTTP request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// Fails if the base URL is invalid or the pinned server key cannot be
    /// loaded.
    pub fn build(self) -> Result<CoinapultClient, CoinapultError> {
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("coinapult-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("coinapult-client"));
        headers.insert(USER_AGENT, header_value);

        let mut reqwest_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            reqwest_builder = reqwest_builder.timeout(timeout);
        }
        let reqwest_client = reqwest_builder.build()?;

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let authenticator = self.credentials.map(|credentials| {
            let mut authenticator = RequestAuthenticator::new(credentials);
            if let Some(provider) = self.nonce_provider {
                authenticator = authenticator.with_nonce_provider(provider);
            }
            if let Some(clock) = self.clock {
                authenticator = authenticator.with_clock(clock);
            }
            Arc::new(authenticator)
        });

        Ok(CoinapultClient {
            http_client: client,
            base_url,
            authenticator,
            verifier: Arc::new(ResponseVerifier::pinned()?),
        })
    }
}

impl Default for CoinapultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
