//! # Coinapult Client
//!
//! An async Rust client library for the Coinapult API.
//!
//! ## Features
//!
//! - Shared-secret authentication with HMAC-SHA512 tags
//! - Key-pair authentication with deterministic ECDSA over secp256k1
//! - Verification of signed server replies against a pinned server key
//! - Constant-time authentication of inbound callbacks
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinapult_client::rest::{CoinapultClient, TickerRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CoinapultClient::new()?;
//!     let ticker = client.ticker(&TickerRequest::new()).await?;
//!     println!("Ticker: {}", ticker);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rest;

// Re-export commonly used types at crate root
pub use error::{ApiError, CoinapultError, ValidationError};

/// Result type alias using CoinapultError
pub type Result<T> = std::result::Result<T, CoinapultError>;
