//! Stub upstream for engine tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pricing_types::errors::PricingError;
use serde_json::{json, Value};

use crate::rates::RateSource;

pub const TEST_CATALOG: &str = r#"{
    "prices": [
        {"product_id": 1, "price": 10.00, "vat_band": "standard"},
        {"product_id": 2, "price": 5.00, "vat_band": "standard"},
        {"product_id": 3, "price": 2.99, "vat_band": "zero", "name": "Bread"},
        {"product_id": 4, "price": 1.00, "vat_band": "luxury"}
    ],
    "vat_bands": {"standard": 0.2, "zero": 0}
}"#;

/// In-memory `RateSource` that counts upstream calls
pub struct StubRateSource {
    currencies: Value,
    rates: HashMap<String, Value>,
    fail_conversions: bool,
    currency_calls: AtomicUsize,
    conversion_calls: AtomicUsize,
}

impl StubRateSource {
    pub fn new(currencies: Value) -> Self {
        Self {
            currencies,
            rates: HashMap::new(),
            fail_conversions: false,
            currency_calls: AtomicUsize::new(0),
            conversion_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_rate(mut self, pair: &str, val: Value) -> Self {
        self.rates.insert(pair.to_string(), json!({ pair: { "val": val } }));
        self
    }

    pub fn failing_conversions(mut self) -> Self {
        self.fail_conversions = true;
        self
    }

    pub fn currency_calls(&self) -> usize {
        self.currency_calls.load(Ordering::SeqCst)
    }

    pub fn conversion_calls(&self) -> usize {
        self.conversion_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for StubRateSource {
    async fn fetch_currencies(&self) -> Result<Value, PricingError> {
        self.currency_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.currencies.clone())
    }

    async fn fetch_conversion(&self, pair: &str) -> Result<Value, PricingError> {
        self.conversion_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_conversions {
            return Err(PricingError::rate_provider(
                format!("Unable to retrieve the rate for {pair}"),
                "connection refused",
            ));
        }
        Ok(self.rates.get(pair).cloned().unwrap_or_else(|| json!({})))
    }
}
