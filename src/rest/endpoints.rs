//! Coinapult REST API endpoint constants.
//!
//! Paths are relative to the base URL; the shared-secret signature covers
//! them as `endpoint = "/" + path`.

/// Base URL for the Coinapult REST API.
pub const COINAPULT_BASE_URL: &str = "https://api.coinapult.com/api/";

/// Public endpoints (no authentication required).
pub mod public {
    /// Exchange rate ticker.
    pub const TICKER: &str = "ticker";
}

/// Signed endpoints.
pub mod private {
    /// Account balances and details.
    pub const ACCOUNT_INFO: &str = "accountInfo";
    /// Fresh bitcoin deposit address.
    pub const GET_BITCOIN_ADDRESS: &str = "getBitcoinAddress";
    /// Send funds.
    pub const SEND: &str = "t/send";
    /// Request a payment.
    pub const RECEIVE: &str = "t/receive";
    /// Convert between currencies.
    pub const CONVERT: &str = "t/convert";
    /// Search transactions.
    pub const SEARCH: &str = "t/search";
    /// Create an account for an ECC key.
    pub const CREATE_ACCOUNT: &str = "account/create";
}
