//! Account creation for key-pair credentials.
//!
//! The client announces its public key and the server answers with a signed
//! envelope whose `success` member must equal the client's public key hash.
//! That binds the acknowledgment to this key: a validly signed reply for some
//! other account is still a failure.

use crate::auth::{Credentials, ParameterMapping, ResponseEnvelope};
use crate::error::CoinapultError;
use crate::rest::CoinapultClient;
use crate::rest::endpoints::private;

/// Outcome of [`CoinapultClient::create_account`].
///
/// Failures are not broken down further; the only useful reaction to any of
/// them is to try again with a fresh key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCreation {
    /// The server acknowledged this key.
    Success,
    /// Transport failure, server error, bad signature or mismatched key hash.
    Error,
}

impl AccountCreation {
    /// Whether the account was created.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl CoinapultClient {
    /// Create an account for the client's ECC key.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use coinapult_client::auth::KeyPair;
    /// use coinapult_client::rest::{AccountCreation, CoinapultClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = CoinapultClient::builder()
    ///         .credentials(KeyPair::generate()?)
    ///         .build()?;
    ///
    ///     if client.create_account().await == AccountCreation::Success {
    ///         println!("account created");
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn create_account(&self) -> AccountCreation {
        match self.try_create_account().await {
            Ok(()) => AccountCreation::Success,
            Err(e) => {
                tracing::warn!(error = %e, "account creation failed");
                AccountCreation::Error
            }
        }
    }

    async fn try_create_account(&self) -> Result<(), CoinapultError> {
        let authenticator = self.authenticator()?;
        let Credentials::KeyPair(keypair) = authenticator.credentials() else {
            return Err(CoinapultError::Configuration(
                "account creation requires key-pair credentials".to_string(),
            ));
        };

        let request = authenticator.sign_new_account(ParameterMapping::new())?;
        let body = self.send_signed(private::CREATE_ACCOUNT, request).await?;

        let envelope = ResponseEnvelope::from_value(&body).ok_or_else(|| {
            CoinapultError::InvalidResponse("account creation reply is not signed".to_string())
        })?;
        let verified = self.verifier.verify(&envelope);
        if !verified.is_valid() {
            return Err(CoinapultError::InvalidResponse(
                "account creation reply has an invalid signature".to_string(),
            ));
        }

        match verified.get("success").and_then(|v| v.as_str()) {
            Some(hash) if hash == keypair.public_key_hash() => Ok(()),
            _ => Err(CoinapultError::InvalidResponse(
                "account creation reply is for a different key".to_string(),
            )),
        }
    }
}
