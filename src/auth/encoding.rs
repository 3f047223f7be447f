//! Canonical encoding of request parameters.
//!
//! The signing payload is the base64 text of a JSON object whose members
//! appear in insertion order:
//!
//! ```text
//! signdata = base64(json({key: value, ...}))
//! ```
//!
//! Signatures are computed over the base64 text itself, so the same bytes
//! travel in the `data` form field and are re-hashed by the other side. Keys
//! are never sorted.

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::CoinapultError;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// JSON string.
    String(String),
    /// JSON integer.
    Integer(i64),
    /// JSON number rendered with the decimal's exact digits.
    Decimal(Decimal),
    /// JSON boolean.
    Bool(bool),
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Decimal(d) => serde_json::Number::from_str(&d.to_string())
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Bool(true) => f.write_str("1"),
            Self::Bool(false) => f.write_str("0"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Parameters for one logical API call, kept in insertion order.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position in the encoded object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMapping {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the mapping contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `(key, value)` string pairs for form or query encoding.
    pub(crate) fn to_string_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl Serialize for ParameterMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterMapping
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for ParameterMapping
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Encode parameters into the signing payload.
pub fn canonical_encode(params: &ParameterMapping) -> Result<String, CoinapultError> {
    let json = serde_json::to_vec(params)?;
    Ok(BASE64.encode(json))
}

/// Decode a signing payload back into JSON.
pub fn canonical_decode(data: &str) -> Result<Value, CoinapultError> {
    let json = BASE64
        .decode(data)
        .map_err(|e| CoinapultError::InvalidResponse(format!("payload is not base64: {e}")))?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded_json(params: &ParameterMapping) -> String {
        let encoded = canonical_encode(params).unwrap();
        String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_encoding_keeps_insertion_order() {
        let params = ParameterMapping::new()
            .with("zeta", "1")
            .with("alpha", "2")
            .with("mid", 3);

        assert_eq!(decoded_json(&params), r#"{"zeta":"1","alpha":"2","mid":3}"#);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let build = || {
            ParameterMapping::new()
                .with("amount", "1.5".parse::<Decimal>().unwrap())
                .with("currency", "BTC")
        };
        assert_eq!(
            canonical_encode(&build()).unwrap(),
            canonical_encode(&build()).unwrap()
        );
    }

    #[test]
    fn test_value_rendering() {
        let params = ParameterMapping::new()
            .with("amount", "1.50".parse::<Decimal>().unwrap())
            .with("page", 2)
            .with("flag", true)
            .with("text", "a/b");

        assert_eq!(
            decoded_json(&params),
            r#"{"amount":1.50,"page":2,"flag":true,"text":"a/b"}"#
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = ParameterMapping::new().with("a", "1").with("b", "2");
        params.insert("a", "3");

        assert_eq!(params.len(), 2);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(params.get("a"), Some(&ParamValue::from("3")));
    }

    #[test]
    fn test_remove() {
        let mut params: ParameterMapping = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.remove("a"), Some(ParamValue::from("1")));
        assert!(params.remove("a").is_none());
        assert!(!params.contains_key("a"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_decode_round_trip() {
        let params = ParameterMapping::new().with("success", "abc").with("n", 7);
        let value = canonical_decode(&canonical_encode(&params).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"success": "abc", "n": 7}));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(canonical_decode("not base64!").is_err());
        // "not json" in base64
        assert!(canonical_decode("bm90IGpzb24=").is_err());
    }

    #[test]
    fn test_string_pairs() {
        let params = ParameterMapping::new().with("begin", 10).with("many", true);
        assert_eq!(
            params.to_string_pairs(),
            vec![
                ("begin".to_string(), "10".to_string()),
                ("many".to_string(), "1".to_string())
            ]
        );
    }
}
