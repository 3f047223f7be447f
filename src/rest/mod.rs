//! Coinapult REST API client.
//!
//! [`CoinapultClient`] builds the parameters for each endpoint, signs them
//! with the configured credentials and, for key-pair accounts, verifies the
//! signed replies.
//!
//! ```rust,no_run
//! use coinapult_client::rest::{CoinapultClient, SearchRequest};
//!
//! async fn latest_btc(client: &CoinapultClient) -> Result<(), coinapult_client::CoinapultError> {
//!     let request = SearchRequest::new([("currency", "BTC")])?;
//!     let found = client.search(&request).await?;
//!     println!("{:?}", found);
//!     Ok(())
//! }
//! ```

mod account;
mod api;
mod client;
mod endpoints;
mod requests;

pub use account::AccountCreation;
pub use client::{ApiResponse, CoinapultClient, CoinapultClientBuilder};
pub use endpoints::*;
pub use requests::{
    ConvertRequest, DEFAULT_CURRENCY, ReceiveRequest, SEARCH_CRITERIA, SearchRequest,
    SendRequest, TickerRequest,
};
