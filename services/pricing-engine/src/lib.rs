//! Order Pricing Engine
//!
//! Prices customer orders from a static product/VAT catalog and a live
//! GBP exchange rate:
//! - Catalog store loaded from a JSON source, cached with a TTL
//! - Exchange rate provider backed by a remote currency service
//! - Payload validation, line deduplication and totals
//!
//! # Architecture
//!
//! ```text
//!   JSON order
//!       │
//!   ┌───▼──────┐
//!   │Validator │  ← ordered checks, first failure wins
//!   └───┬──────┘
//!       │
//!   ┌───▼──────┐     ┌─────────────┐
//!   │ Engine   │────►│CatalogStore │──┐
//!   └───┬──────┘     └─────────────┘  │   ┌──────────────┐
//!       │            ┌─────────────┐  ├──►│ PricingCache │
//!       └───────────►│RateProvider │──┘   └──────────────┘
//!                    └──────┬──────┘
//!                           │
//!                    upstream currency API
//! ```

pub mod cache;
pub mod catalog;
pub mod rates;
pub mod validator;
pub mod engine;

#[cfg(test)]
mod test_support;

pub use cache::{CachedValue, PricingCache};
pub use catalog::{CatalogSource, CatalogStore};
pub use engine::PricingEngine;
pub use rates::{ExchangeRateProvider, HttpRateSource, RateProviderConfig, RateSource};

