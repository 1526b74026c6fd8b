//! Exchange rate provider
//!
//! Fetches the list of supported currencies and GBP conversion rates from the
//! upstream currency service. The currency list and each conversion rate are
//! cached independently: the list rarely changes (30 min), rates are refreshed
//! more often (5 min) without hitting the upstream on every order.
//!
//! Upstream contract, consumed as-is:
//! - `GET {base}/currencies` → `{"results": {...} | [...]}`
//! - `GET {base}/convert?q=GBP_EUR&compact=y` → `{"GBP_EUR": {"val": 1.14}}`

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pricing_types::errors::PricingError;
use pricing_types::ids::CurrencyCode;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CachedValue, PricingCache, CURRENCIES_KEY};

const CURRENCY_LIST_CONTEXT: &str = "Unable to load the list of available currencies";

/// Raw access to the upstream currency service
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Body of the currency list endpoint
    async fn fetch_currencies(&self) -> Result<Value, PricingError>;

    /// Body of the conversion endpoint for a pair such as `GBP_EUR`
    async fn fetch_conversion(&self, pair: &str) -> Result<Value, PricingError>;
}

/// Upstream endpoint and cache settings
#[derive(Debug, Clone, PartialEq)]
pub struct RateProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout against the upstream
    pub timeout: Duration,
    pub currencies_ttl: Duration,
    pub rate_ttl: Duration,
}

impl Default for RateProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://free.currencyconverterapi.com/api/v6".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            currencies_ttl: Duration::from_secs(60 * 30),
            rate_ttl: Duration::from_secs(60 * 5),
        }
    }
}

/// `RateSource` over HTTP
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRateSource {
    pub fn new(config: &RateProviderConfig) -> Result<Self, PricingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PricingError::rate_provider("Unable to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("apiKey", key.as_str())]),
            None => request,
        }
    }

    fn currencies_request(&self) -> RequestBuilder {
        let request = self.client.get(format!("{}/currencies", self.base_url));
        self.with_api_key(request)
    }

    fn conversion_request(&self, pair: &str) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}/convert", self.base_url))
            .query(&[("q", pair), ("compact", "y")]);
        self.with_api_key(request)
    }

    async fn get_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, PricingError> {
        let res = request
            .send()
            .await
            .map_err(|e| upstream_error(context, e))?;

        let res = res
            .error_for_status()
            .map_err(|e| upstream_error(context, e))?;

        res.json::<Value>()
            .await
            .map_err(|e| upstream_error(context, e))
    }
}

fn upstream_error(context: &str, err: reqwest::Error) -> PricingError {
    if err.is_timeout() {
        PricingError::rate_provider(context, "request timed out")
    } else {
        PricingError::rate_provider(context, err)
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_currencies(&self) -> Result<Value, PricingError> {
        self.get_json(self.currencies_request(), CURRENCY_LIST_CONTEXT)
            .await
    }

    async fn fetch_conversion(&self, pair: &str) -> Result<Value, PricingError> {
        let context = format!("Unable to retrieve the rate for {pair}");
        self.get_json(self.conversion_request(pair), &context).await
    }
}

/// Cached currency list and conversion rates
#[derive(Clone)]
pub struct ExchangeRateProvider {
    cache: Arc<PricingCache>,
    source: Arc<dyn RateSource>,
    currencies_ttl: Duration,
    rate_ttl: Duration,
}

impl ExchangeRateProvider {
    pub fn new(
        cache: Arc<PricingCache>,
        source: Arc<dyn RateSource>,
        config: &RateProviderConfig,
    ) -> Self {
        Self {
            cache,
            source,
            currencies_ttl: config.currencies_ttl,
            rate_ttl: config.rate_ttl,
        }
    }

    /// Supported currency codes
    pub async fn currencies(&self) -> Result<Arc<BTreeSet<CurrencyCode>>, PricingError> {
        if let Some(codes) = self.cache.currencies() {
            return Ok(codes);
        }

        debug!("Currency list not cached, fetching from upstream");
        let body = self.source.fetch_currencies().await?;
        let codes = Arc::new(parse_currency_list(&body)?);

        self.cache.insert(
            CURRENCIES_KEY,
            CachedValue::Currencies(Arc::clone(&codes)),
            self.currencies_ttl,
        );
        info!(count = codes.len(), "Currency list refreshed");
        Ok(codes)
    }

    /// Rate converting one GBP into `code`. The code is case-insensitive.
    pub async fn exchange_rate(&self, code: &str) -> Result<Decimal, PricingError> {
        self.rate_for(&CurrencyCode::new(code)).await
    }

    pub async fn rate_for(&self, code: &CurrencyCode) -> Result<Decimal, PricingError> {
        // Prices are stored in the base currency
        if code.is_base() {
            return Ok(Decimal::ONE);
        }

        if !self.currencies().await?.contains(code) {
            warn!(currency = %code, "Unknown currency requested");
            return Err(PricingError::InvalidCurrency {
                code: code.to_string(),
            });
        }

        let pair = code.pair_key();
        if let Some(rate) = self.cache.rate(&pair) {
            return Ok(rate);
        }

        debug!(pair = %pair, "Rate not cached, fetching from upstream");
        let body = self.source.fetch_conversion(&pair).await?;
        let rate = parse_rate(&body, &pair)?;

        self.cache
            .insert(pair.clone(), CachedValue::Rate(rate), self.rate_ttl);
        info!(pair = %pair, rate = %rate, "Exchange rate refreshed");
        Ok(rate)
    }
}

/// Extract codes from `results`, which is either an object keyed by code or
/// an array of codes / `{"id": code}` objects.
fn parse_currency_list(body: &Value) -> Result<BTreeSet<CurrencyCode>, PricingError> {
    let results = body.get("results").ok_or_else(|| {
        PricingError::rate_provider(CURRENCY_LIST_CONTEXT, "missing `results` key")
    })?;

    match results {
        Value::Object(map) => Ok(map.keys().map(|k| CurrencyCode::new(k)).collect()),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .or_else(|| entry.get("id").and_then(Value::as_str))
                    .map(CurrencyCode::new)
                    .ok_or_else(|| {
                        PricingError::rate_provider(
                            CURRENCY_LIST_CONTEXT,
                            format!("unexpected currency entry {entry}"),
                        )
                    })
            })
            .collect(),
        other => Err(PricingError::rate_provider(
            CURRENCY_LIST_CONTEXT,
            format!("unexpected `results` value {other}"),
        )),
    }
}

/// Read `body[pair].val` as a positive decimal
fn parse_rate(body: &Value, pair: &str) -> Result<Decimal, PricingError> {
    let val = body
        .get(pair)
        .and_then(|v| v.get("val"))
        .ok_or_else(|| {
            PricingError::rate_provider(
                format!("Unable to retrieve the rate for {pair}"),
                format!("missing `{pair}.val` in response"),
            )
        })?;

    let convert_context = || format!("Unable to convert the rate for {pair} -> {val}");
    let rate = match val {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text))
        }
        Value::String(s) => Decimal::from_str(s.trim()),
        _ => return Err(PricingError::rate_provider(convert_context(), "not a number")),
    }
    .map_err(|e| PricingError::rate_provider(convert_context(), e))?;

    if rate <= Decimal::ZERO {
        return Err(PricingError::rate_provider(convert_context(), "rate must be positive"));
    }
    Ok(rate)
}
