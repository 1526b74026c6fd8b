use crate::config::AppConfig;
use pricing_engine::{
    CatalogSource, CatalogStore, ExchangeRateProvider, HttpRateSource, PricingCache,
    PricingEngine,
};
use pricing_types::errors::PricingError;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
}

impl AppState {
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Wire one shared cache into the catalog store and the rate provider
    pub fn from_config(config: &AppConfig) -> Result<Self, PricingError> {
        let cache = PricingCache::shared();

        let catalog = CatalogStore::new(
            Arc::clone(&cache),
            CatalogSource::file(&config.catalog.path),
        )
        .with_ttl(Duration::from_secs(config.catalog.ttl_secs));

        let rates_config = config.rates.provider_config();
        let source = Arc::new(HttpRateSource::new(&rates_config)?);
        let rates = ExchangeRateProvider::new(cache, source, &rates_config);

        Ok(Self::new(PricingEngine::new(catalog, rates)))
    }
}
