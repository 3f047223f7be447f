//! Example: Working with CoinapultError and ValidationError.
//!
//! Run with: cargo run --example error_handling

use coinapult_client::rest::SearchRequest;
use coinapult_client::{ApiError, CoinapultError, ValidationError};

fn describe(err: &CoinapultError) {
    if err.is_configuration() {
        println!("Fix the setup: {}", err);
    } else if err.is_transport() {
        println!("Network trouble, a fresh call may succeed: {}", err);
    } else {
        println!("Request failed: {}", err);
    }
}

fn main() {
    match SearchRequest::new([("foo", "1")]) {
        Err(ValidationError::UnknownSearchCriteria(key)) => {
            println!("Rejected search key: {}", key);
        }
        other => println!("Unexpected: {:?}", other),
    }

    let api_error = ApiError::new("Insufficient funds").with_code("402");
    describe(&CoinapultError::Api(api_error));
    describe(&CoinapultError::MissingCredentials);
    describe(&CoinapultError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    });
}
