//! Shared TTL cache for catalog and exchange rate data
//!
//! One `PricingCache` is created at process start and handed by `Arc` to the
//! catalog store and the rate provider. Every entry expires independently;
//! an expired entry reads as absent and is dropped on that read.
//!
//! Concurrent misses on the same key may each fetch from the source and
//! insert. The last insert wins. There is no single-flight.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use pricing_types::catalog::{ProductMap, VatBands};
use pricing_types::ids::CurrencyCode;
use rust_decimal::Decimal;
use tokio::time::Instant;

/// Key of the product map entry
pub const PRODUCTS_KEY: &str = "PRODUCTS";
/// Key of the VAT band entry
pub const VAT_BANDS_KEY: &str = "VAT_BANDS";
/// Key of the supported currency list entry
pub const CURRENCIES_KEY: &str = "CURRENCIES";

/// Value stored under a cache key
#[derive(Debug, Clone)]
pub enum CachedValue {
    Products(Arc<ProductMap>),
    VatBands(Arc<VatBands>),
    Currencies(Arc<BTreeSet<CurrencyCode>>),
    /// Conversion rate, keyed by currency pair (`GBP_EUR`)
    Rate(Decimal),
}

#[derive(Debug)]
struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

/// Process-wide cache of catalog and rate data
#[derive(Debug, Default)]
pub struct PricingCache {
    entries: DashMap<String, Entry>,
}

impl PricingCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get a live entry. Expired entries are removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<CachedValue> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            // Another task may have refreshed the entry in between.
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: CachedValue, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.into(), entry);
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until next read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn products(&self) -> Option<Arc<ProductMap>> {
        match self.get(PRODUCTS_KEY) {
            Some(CachedValue::Products(products)) => Some(products),
            _ => None,
        }
    }

    pub fn vat_bands(&self) -> Option<Arc<VatBands>> {
        match self.get(VAT_BANDS_KEY) {
            Some(CachedValue::VatBands(bands)) => Some(bands),
            _ => None,
        }
    }

    pub fn currencies(&self) -> Option<Arc<BTreeSet<CurrencyCode>>> {
        match self.get(CURRENCIES_KEY) {
            Some(CachedValue::Currencies(codes)) => Some(codes),
            _ => None,
        }
    }

    pub fn rate(&self, pair: &str) -> Option<Decimal> {
        match self.get(pair) {
            Some(CachedValue::Rate(rate)) => Some(rate),
            _ => None,
        }
    }
}
