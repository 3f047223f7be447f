//! Endpoint methods.

use serde_json::Value;

use crate::auth::{CallbackAuth, Credentials, ParameterMapping, authenticate_callback};
use crate::error::CoinapultError;
use crate::rest::CoinapultClient;
use crate::rest::client::ApiResponse;
use crate::rest::endpoints::{private, public};
use crate::rest::requests::{
    ConvertRequest, ReceiveRequest, SearchRequest, SendRequest, TickerRequest,
};

impl CoinapultClient {
    /// Get exchange rates.
    ///
    /// This endpoint is public and needs no credentials.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use coinapult_client::rest::{CoinapultClient, TickerRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = CoinapultClient::new()?;
    ///     let ticker = client.ticker(&TickerRequest::new()).await?;
    ///     println!("Ticker: {}", ticker);
    ///     Ok(())
    /// }
    /// ```
    pub async fn ticker(&self, request: &TickerRequest) -> Result<Value, CoinapultError> {
        self.public_get(public::TICKER, &request.to_params()).await
    }

    /// Get account balances and details.
    pub async fn account_info(&self) -> Result<ApiResponse, CoinapultError> {
        self.signed_post(private::ACCOUNT_INFO, ParameterMapping::new())
            .await
    }

    /// Get a fresh bitcoin deposit address.
    pub async fn get_bitcoin_address(&self) -> Result<ApiResponse, CoinapultError> {
        self.signed_post(private::GET_BITCOIN_ADDRESS, ParameterMapping::new())
            .await
    }

    /// Send funds to an address.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use coinapult_client::auth::SharedSecret;
    /// use coinapult_client::rest::{CoinapultClient, SendRequest};
    /// use rust_decimal::Decimal;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = CoinapultClient::builder()
    ///         .credentials(SharedSecret::new("key", "secret"))
    ///         .build()?;
    ///
    ///     let request = SendRequest::new(Decimal::new(15, 1), "1Abc").currency("BTC");
    ///     let result = client.send(&request).await?;
    ///     println!("{:?}", result);
    ///     Ok(())
    /// }
    /// ```
    pub async fn send(&self, request: &SendRequest) -> Result<ApiResponse, CoinapultError> {
        let params = request.to_params()?;
        self.signed_post(private::SEND, params).await
    }

    /// Request a payment.
    pub async fn receive(&self, request: &ReceiveRequest) -> Result<ApiResponse, CoinapultError> {
        let params = request.to_params()?;
        self.signed_post(private::RECEIVE, params).await
    }

    /// Convert funds between currencies.
    pub async fn convert(&self, request: &ConvertRequest) -> Result<ApiResponse, CoinapultError> {
        self.signed_post(private::CONVERT, request.to_params()).await
    }

    /// Search transactions.
    pub async fn search(&self, request: &SearchRequest) -> Result<ApiResponse, CoinapultError> {
        self.signed_post(private::SEARCH, request.to_params()).await
    }

    /// Authenticate an inbound callback.
    ///
    /// Callbacks are tagged with the shared secret, so a client holding
    /// key-pair credentials (or none) rejects every callback.
    pub fn authenticate_callback(
        &self,
        received_key: &str,
        received_hmac: &str,
        received_data: &str,
    ) -> CallbackAuth {
        match self.credentials() {
            Some(Credentials::SharedSecret(secret)) => {
                authenticate_callback(secret, received_key, received_hmac, received_data)
            }
            _ => CallbackAuth::rejected(),
        }
    }
}
