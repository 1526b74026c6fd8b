//! Product and VAT band catalog types
//!
//! The catalog source is a JSON document:
//!
//! ```text
//! {
//!   "prices":    [ {"product_id": 1, "price": 599, "vat_band": "standard", ...}, ... ],
//!   "vat_bands": { "standard": 0.2, "zero": 0 }
//! }
//! ```
//!
//! Prices are in the base currency. Any product key other than `product_id`,
//! `price` and `vat_band` is kept and passed through to priced order items.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::ids::ProductId;

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    /// Unit price in the base currency
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Key into [`VatBands`]
    pub vat_band: String,
    /// Extra attributes, passed through unchanged
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Products keyed by id
pub type ProductMap = BTreeMap<ProductId, Product>;

/// VAT band key to rate (fraction, e.g. 0.2 for 20%)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct VatBands(BTreeMap<String, Decimal>);

impl VatBands {
    pub fn new(bands: BTreeMap<String, Decimal>) -> Self {
        Self(bands)
    }

    pub fn rate(&self, band: &str) -> Option<Decimal> {
        self.0.get(band).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Decimal)> for VatBands {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Rates go out as JSON numbers, like the catalog they were read from.
impl Serialize for VatBands {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|(band, rate)| (band, rate.to_f64().unwrap_or_default())),
        )
    }
}

/// Parsed catalog source document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogDocument {
    pub prices: Vec<Product>,
    pub vat_bands: VatBands,
}

impl CatalogDocument {
    /// Index products by id. A later entry with the same id replaces an earlier one.
    pub fn product_map(&self) -> ProductMap {
        self.prices
            .iter()
            .map(|p| (p.product_id, p.clone()))
            .collect()
    }
}
