//! Typed parameter bag carried by commands and requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HandlerError;

/// A single typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl ParamValue {
    /// Interpret free text the way a query string would mean it.
    ///
    /// Text is only typed when the typed value renders back to the same
    /// text, so `007` or `1.50` stay strings. The numeric accessors still
    /// parse them.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if let Ok(value) = text.parse::<bool>() {
            return Self::Bool(value);
        }
        if let Ok(value) = text.parse::<i64>() {
            if value.to_string() == text {
                return Self::Int(value);
            }
        }
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() && value.to_string() == text {
                return Self::Float(value);
            }
        }
        Self::String(text.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
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

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Open key → value mapping validated by the receiving component.
///
/// Unknown keys are preserved. Components pull what they need through the
/// `require_*` accessors, which turn a missing or mistyped key into a
/// [`HandlerError`] instead of a panic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `key=value` pairs, typing each value with
    /// [`ParamValue::from_text`].
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), ParamValue::from_text(v.as_ref())))
                .collect(),
        )
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            ParamValue::Int(v) => Some(*v),
            ParamValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            ParamValue::Bool(v) => Some(*v),
            ParamValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// [`HandlerError::MissingParam`] when absent,
    /// [`HandlerError::InvalidParam`] when not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, HandlerError> {
        self.require(key, "a string", Self::get_str)
    }

    /// # Errors
    ///
    /// [`HandlerError::MissingParam`] when absent,
    /// [`HandlerError::InvalidParam`] when not an integer.
    pub fn require_i64(&self, key: &str) -> Result<i64, HandlerError> {
        self.require(key, "an integer", Self::get_i64)
    }

    /// # Errors
    ///
    /// [`HandlerError::MissingParam`] when absent,
    /// [`HandlerError::InvalidParam`] when not a number.
    pub fn require_f64(&self, key: &str) -> Result<f64, HandlerError> {
        self.require(key, "a number", Self::get_f64)
    }

    /// # Errors
    ///
    /// [`HandlerError::MissingParam`] when absent,
    /// [`HandlerError::InvalidParam`] when not a boolean.
    pub fn require_bool(&self, key: &str) -> Result<bool, HandlerError> {
        self.require(key, "a boolean", Self::get_bool)
    }

    fn require<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        get: impl FnOnce(&'a Self, &str) -> Option<T>,
    ) -> Result<T, HandlerError> {
        if !self.0.contains_key(key) {
            return Err(HandlerError::MissingParam(key.to_string()));
        }
        get(self, key).ok_or_else(|| HandlerError::InvalidParam {
            key: key.to_string(),
            expected,
        })
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
