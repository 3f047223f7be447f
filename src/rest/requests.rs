//! Request types for the Coinapult endpoints.
//!
//! Each request renders into a [`ParameterMapping`] in the member order the
//! server expects. Validation happens here, before anything is signed.

use rust_decimal::Decimal;

use crate::auth::{ParamValue, ParameterMapping};
use crate::error::ValidationError;

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "BTC";

/// Keys accepted as transaction search criteria.
pub const SEARCH_CRITERIA: [&str; 7] = [
    "transaction_id",
    "type",
    "currency",
    "to",
    "from",
    "extOID",
    "txhash",
];

/// Request for the exchange rate ticker.
#[derive(Debug, Clone, Default)]
pub struct TickerRequest {
    /// Start of the period (UNIX seconds).
    pub begin: Option<i64>,
    /// End of the period (UNIX seconds).
    pub end: Option<i64>,
}

impl TickerRequest {
    /// Create a ticker request for the current rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start of the period.
    pub fn begin(mut self, begin: i64) -> Self {
        self.begin = Some(begin);
        self
    }

    /// Set the end of the period.
    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub(crate) fn to_params(&self) -> ParameterMapping {
        let mut params = ParameterMapping::new();
        if let Some(begin) = self.begin {
            params.insert("begin", begin);
        }
        if let Some(end) = self.end {
            params.insert("end", end);
        }
        params
    }
}

/// Request to send funds to an address.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Amount to send, in `currency`.
    pub amount: Decimal,
    /// Destination address.
    pub address: String,
    /// Currency of `amount`.
    pub currency: String,
    /// Caller-side order identifier.
    pub ext_oid: Option<String>,
    /// URL notified when the transaction changes state.
    pub callback: Option<String>,
}

impl SendRequest {
    /// Create a send request in [`DEFAULT_CURRENCY`].
    pub fn new(amount: Decimal, address: impl Into<String>) -> Self {
        Self {
            amount,
            address: address.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            ext_oid: None,
            callback: None,
        }
    }

    /// Set the currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the external order identifier.
    pub fn ext_oid(mut self, ext_oid: impl Into<String>) -> Self {
        self.ext_oid = Some(ext_oid.into());
        self
    }

    /// Set the callback URL.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub(crate) fn to_params(&self) -> Result<ParameterMapping, ValidationError> {
        if self.address.is_empty() {
            return Err(ValidationError::MissingField("address"));
        }
        let mut params = ParameterMapping::new()
            .with("amount", self.amount)
            .with("address", &self.address)
            .with("currency", &self.currency);
        if let Some(callback) = &self.callback {
            params.insert("callback", callback);
        }
        if let Some(ext_oid) = &self.ext_oid {
            params.insert("extOID", ext_oid);
        }
        Ok(params)
    }
}

/// Request to receive a payment.
///
/// Either `amount` (in `currency`) or `out_amount` (in `out_currency`) must
/// be given.
#[derive(Debug, Clone)]
pub struct ReceiveRequest {
    /// Amount to receive, in `currency`.
    pub amount: Option<Decimal>,
    /// Currency the payer sends.
    pub currency: String,
    /// Amount to credit, in `out_currency`.
    pub out_amount: Option<Decimal>,
    /// Currency credited to the account.
    pub out_currency: Option<String>,
    /// Caller-side order identifier.
    pub ext_oid: Option<String>,
    /// URL notified when the payment arrives.
    pub callback: Option<String>,
    /// Address to receive on, instead of a fresh one.
    pub address: Option<String>,
}

impl ReceiveRequest {
    /// Create a receive request for an amount in [`DEFAULT_CURRENCY`].
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::empty()
        }
    }

    /// Create a receive request fixing the credited amount instead.
    pub fn for_out_amount(out_amount: Decimal, out_currency: impl Into<String>) -> Self {
        Self {
            out_amount: Some(out_amount),
            out_currency: Some(out_currency.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            amount: None,
            currency: DEFAULT_CURRENCY.to_string(),
            out_amount: None,
            out_currency: None,
            ext_oid: None,
            callback: None,
            address: None,
        }
    }

    /// Set the incoming currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the credited currency.
    pub fn out_currency(mut self, out_currency: impl Into<String>) -> Self {
        self.out_currency = Some(out_currency.into());
        self
    }

    /// Set the external order identifier.
    pub fn ext_oid(mut self, ext_oid: impl Into<String>) -> Self {
        self.ext_oid = Some(ext_oid.into());
        self
    }

    /// Set the callback URL.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Set the receiving address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub(crate) fn to_params(&self) -> Result<ParameterMapping, ValidationError> {
        if self.amount.is_none() && self.out_amount.is_none() {
            return Err(ValidationError::MissingField("amount"));
        }
        let mut params = ParameterMapping::new();
        if let Some(amount) = self.amount {
            params.insert("amount", amount);
        }
        params.insert("currency", &self.currency);
        // The server expects these as strings.
        if let Some(out_amount) = self.out_amount {
            params.insert("outAmount", out_amount.to_string());
        }
        if let Some(out_currency) = &self.out_currency {
            params.insert("outCurrency", out_currency);
        }
        if let Some(ext_oid) = &self.ext_oid {
            params.insert("extOID", ext_oid);
        }
        if let Some(callback) = &self.callback {
            params.insert("callback", callback);
        }
        if let Some(address) = &self.address {
            params.insert("address", address);
        }
        Ok(params)
    }
}

/// Request to convert funds between currencies.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Amount to convert, in `in_currency`.
    pub amount: Decimal,
    /// Currency converted from.
    pub in_currency: String,
    /// Currency converted to.
    pub out_currency: Option<String>,
    /// URL notified when the conversion completes.
    pub callback: Option<String>,
}

impl ConvertRequest {
    /// Create a conversion from [`DEFAULT_CURRENCY`].
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            in_currency: DEFAULT_CURRENCY.to_string(),
            out_currency: None,
            callback: None,
        }
    }

    /// Set the source currency.
    pub fn in_currency(mut self, in_currency: impl Into<String>) -> Self {
        self.in_currency = in_currency.into();
        self
    }

    /// Set the target currency.
    pub fn out_currency(mut self, out_currency: impl Into<String>) -> Self {
        self.out_currency = Some(out_currency.into());
        self
    }

    /// Set the callback URL.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub(crate) fn to_params(&self) -> ParameterMapping {
        let mut params = ParameterMapping::new()
            .with("amount", self.amount)
            .with("inCurrency", &self.in_currency);
        if let Some(out_currency) = &self.out_currency {
            params.insert("outCurrency", out_currency);
        }
        if let Some(callback) = &self.callback {
            params.insert("callback", callback);
        }
        params
    }
}

/// Request to search transactions.
///
/// Criteria are checked against [`SEARCH_CRITERIA`] on construction.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    criteria: ParameterMapping,
    many: bool,
    page: Option<u32>,
}

impl SearchRequest {
    /// Build a search from `(key, value)` criteria.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coinapult_client::rest::SearchRequest;
    /// use coinapult_client::ValidationError;
    ///
    /// assert!(SearchRequest::new([("currency", "BTC")]).is_ok());
    /// assert_eq!(
    ///     SearchRequest::new([("foo", "1")]).unwrap_err(),
    ///     ValidationError::UnknownSearchCriteria("foo".to_string())
    /// );
    /// ```
    pub fn new<K, V, I>(criteria: I) -> Result<Self, ValidationError>
    where
        K: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = ParameterMapping::new();
        for (key, value) in criteria {
            let key = key.into();
            if !SEARCH_CRITERIA.contains(&key.as_str()) {
                return Err(ValidationError::UnknownSearchCriteria(key));
            }
            params.insert(key, value);
        }
        if params.is_empty() {
            return Err(ValidationError::EmptySearchCriteria);
        }

        Ok(Self {
            criteria: params,
            many: false,
            page: None,
        })
    }

    /// Return every match instead of the first.
    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    /// Select a result page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// The validated criteria.
    pub fn criteria(&self) -> &ParameterMapping {
        &self.criteria
    }

    pub(crate) fn to_params(&self) -> ParameterMapping {
        let mut params = self.criteria.clone();
        if self.many {
            params.insert("many", "1");
        }
        if let Some(page) = self.page {
            params.insert("page", page);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_search_rejects_unknown_key() {
        let err = SearchRequest::new([("foo", 1)]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownSearchCriteria("foo".to_string()));
    }

    #[test]
    fn test_search_rejects_empty_criteria() {
        let criteria: Vec<(&str, &str)> = Vec::new();
        let err = SearchRequest::new(criteria).unwrap_err();
        assert_eq!(err, ValidationError::EmptySearchCriteria);
    }

    #[test]
    fn test_search_rejects_unknown_key_among_valid_ones() {
        let err = SearchRequest::new([("currency", "BTC"), ("amount", "1")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownSearchCriteria("amount".to_string())
        );
    }

    #[test]
    fn test_search_builds_only_given_criteria() {
        let request = SearchRequest::new([("currency", "BTC")]).unwrap();
        let params = request.to_params();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["currency"]);
        assert_eq!(params.get("currency"), Some(&ParamValue::from("BTC")));
    }

    #[test]
    fn test_search_accepts_every_whitelisted_key() {
        let request = SearchRequest::new(SEARCH_CRITERIA.iter().map(|k| (*k, "x"))).unwrap();
        assert_eq!(request.criteria().len(), SEARCH_CRITERIA.len());
    }

    #[test]
    fn test_search_many_and_page() {
        let params = SearchRequest::new([("type", "send")])
            .unwrap()
            .many(true)
            .page(3)
            .to_params();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["type", "many", "page"]);
        assert_eq!(params.get("many"), Some(&ParamValue::from("1")));
        assert_eq!(params.get("page"), Some(&ParamValue::Integer(3)));
    }

    #[test]
    fn test_send_params_order_and_defaults() {
        let params = SendRequest::new(dec("1.5"), "1Abc")
            .ext_oid("order-9")
            .callback("https://example.com/cb")
            .to_params()
            .unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["amount", "address", "currency", "callback", "extOID"]
        );
        assert_eq!(params.get("currency"), Some(&ParamValue::from("BTC")));
        assert_eq!(params.get("amount"), Some(&ParamValue::Decimal(dec("1.5"))));
    }

    #[test]
    fn test_send_requires_address() {
        let err = SendRequest::new(dec("1"), "").to_params().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("address"));
    }

    #[test]
    fn test_receive_params() {
        let params = ReceiveRequest::new(dec("0.25"))
            .out_currency("USD")
            .address("1Xyz")
            .to_params()
            .unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["amount", "currency", "outCurrency", "address"]
        );
    }

    #[test]
    fn test_receive_out_amount_is_a_string() {
        let params = ReceiveRequest::for_out_amount(dec("10.00"), "USD")
            .to_params()
            .unwrap();
        assert!(!params.contains_key("amount"));
        assert_eq!(params.get("outAmount"), Some(&ParamValue::from("10.00")));
        assert_eq!(params.get("currency"), Some(&ParamValue::from("BTC")));
    }

    #[test]
    fn test_receive_requires_an_amount() {
        let mut request = ReceiveRequest::new(dec("1"));
        request.amount = None;
        assert_eq!(
            request.to_params().unwrap_err(),
            ValidationError::MissingField("amount")
        );
    }

    #[test]
    fn test_convert_params() {
        let params = ConvertRequest::new(dec("2"))
            .in_currency("USD")
            .out_currency("BTC")
            .to_params();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["amount", "inCurrency", "outCurrency"]
        );
    }

    #[test]
    fn test_ticker_params() {
        assert!(TickerRequest::new().to_params().is_empty());
        let params = TickerRequest::new().begin(10).end(20).to_params();
        assert_eq!(params.get("begin"), Some(&ParamValue::Integer(10)));
        assert_eq!(params.get("end"), Some(&ParamValue::Integer(20)));
    }
}
