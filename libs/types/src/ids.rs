//! Identifier types for catalog and currency entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO code of the currency catalog prices are stored in
pub const BASE_CURRENCY: &str = "GBP";

/// Unique identifier for a catalog product
///
/// Products are keyed by the integer `product_id` found in the catalog
/// source, so the id serializes as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency code such as `GBP` or `EUR`
///
/// Always stored uppercased. Whether a code is actually supported is decided
/// by the rate provider's currency list, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalize a user supplied code (trimmed, uppercased)
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// The base currency all catalog prices are expressed in
    pub fn base() -> Self {
        Self(BASE_CURRENCY.to_string())
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache and upstream key for the conversion from the base currency,
    /// e.g. `GBP_EUR`
    pub fn pair_key(&self) -> String {
        format!("{}_{}", BASE_CURRENCY, self.0)
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
