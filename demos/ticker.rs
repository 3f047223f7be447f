//! Example: Fetching the public ticker and, with credentials, account info.
//!
//! Run with: cargo run --example ticker
//!
//! Set COINAPULT_API_KEY and COINAPULT_API_SECRET to also query the account.

use coinapult_client::auth::SharedSecret;
use coinapult_client::rest::{CoinapultClient, TickerRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The ticker needs no credentials.
    let client = CoinapultClient::new()?;
    println!("=== Ticker ===");
    let ticker = client.ticker(&TickerRequest::new()).await?;
    println!("{}", serde_json::to_string_pretty(&ticker)?);

    let Some(credentials) = SharedSecret::try_from_env() else {
        println!("\nSet COINAPULT_API_KEY and COINAPULT_API_SECRET to query the account.");
        return Ok(());
    };

    let client = CoinapultClient::builder().credentials(credentials).build()?;
    println!("\n=== Account Info ===");
    match client.account_info().await?.into_value() {
        Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
        None => println!("Reply signature did not verify; ignoring it."),
    }

    Ok(())
}
