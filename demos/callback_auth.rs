//! Example: Authenticating an inbound Coinapult callback.
//!
//! Run with: cargo run --example callback_auth

use coinapult_client::auth::{SharedSecret, authenticate_callback, sign_hmac};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let credentials = SharedSecret::new("api_key", "api_secret");

    // What the server would deliver alongside the callback body.
    let data = r#"{"transaction_id":"abc","state":"complete"}"#;
    let hmac = sign_hmac(&credentials, data)?;

    let result = authenticate_callback(&credentials, "api_key", &hmac, data);
    println!("Genuine callback accepted: {}", result.ok);

    let forged = authenticate_callback(&credentials, "api_key", &hmac, r#"{"state":"refund"}"#);
    println!("Forged callback accepted: {}", forged.ok);
    println!("Expected tag for the forged body: {}", forged.recomputed_hmac);

    Ok(())
}
