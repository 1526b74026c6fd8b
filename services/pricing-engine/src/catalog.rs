//! Catalog store
//!
//! Loads the product/VAT dataset from its JSON source and serves it from the
//! shared cache. A miss (first access or expiry) reloads the whole dataset.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pricing_types::catalog::{CatalogDocument, Product, ProductMap, VatBands};
use pricing_types::errors::PricingError;
use pricing_types::ids::ProductId;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::cache::{CachedValue, PricingCache, PRODUCTS_KEY, VAT_BANDS_KEY};

/// Where the catalog document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    /// JSON file on disk
    File(PathBuf),
    /// In-memory JSON document, identified by `name` in errors and logs
    Inline { name: String, json: String },
}

impl CatalogSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        CatalogSource::File(path.into())
    }

    pub fn inline(name: impl Into<String>, json: impl Into<String>) -> Self {
        CatalogSource::Inline {
            name: name.into(),
            json: json.into(),
        }
    }

    async fn read(&self) -> Result<String, PricingError> {
        match self {
            CatalogSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PricingError::catalog_load(self.to_string(), e)),
            CatalogSource::Inline { json, .. } => Ok(json.clone()),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Inline { name, .. } => f.write_str(name),
        }
    }
}

/// Cached access to products and VAT bands
#[derive(Debug, Clone)]
pub struct CatalogStore {
    cache: Arc<PricingCache>,
    source: CatalogSource,
    ttl: Duration,
}

impl CatalogStore {
    /// Catalog entries are kept for one hour
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn new(cache: Arc<PricingCache>, source: CatalogSource) -> Self {
        Self {
            cache,
            source,
            ttl: Self::DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Load the catalog from `source` (the configured source when `None`)
    /// and replace both cache entries.
    pub async fn reload(&self, source: Option<&CatalogSource>) -> Result<(), PricingError> {
        self.load(source.unwrap_or(&self.source)).await.map(|_| ())
    }

    async fn load(
        &self,
        source: &CatalogSource,
    ) -> Result<(Arc<ProductMap>, Arc<VatBands>), PricingError> {
        let raw = source.read().await?;
        let document: CatalogDocument = serde_json::from_str(&raw)
            .map_err(|e| PricingError::catalog_load(source.to_string(), e))?;

        let products = Arc::new(document.product_map());
        let vat_bands = Arc::new(document.vat_bands);

        self.cache.insert(
            PRODUCTS_KEY,
            CachedValue::Products(Arc::clone(&products)),
            self.ttl,
        );
        self.cache.insert(
            VAT_BANDS_KEY,
            CachedValue::VatBands(Arc::clone(&vat_bands)),
            self.ttl,
        );

        info!(
            source = %source,
            products = products.len(),
            vat_bands = vat_bands.len(),
            "Catalog loaded"
        );
        Ok((products, vat_bands))
    }

    /// All products keyed by id
    pub async fn products(&self) -> Result<Arc<ProductMap>, PricingError> {
        if let Some(products) = self.cache.products() {
            return Ok(products);
        }
        debug!("Products not cached, reloading catalog");
        let (products, _) = self.load(&self.source).await?;
        Ok(products)
    }

    /// All VAT bands
    pub async fn vat_bands(&self) -> Result<Arc<VatBands>, PricingError> {
        if let Some(bands) = self.cache.vat_bands() {
            return Ok(bands);
        }
        debug!("VAT bands not cached, reloading catalog");
        let (_, bands) = self.load(&self.source).await?;
        Ok(bands)
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, PricingError> {
        self.products()
            .await?
            .get(&id)
            .cloned()
            .ok_or_else(|| PricingError::NotFound {
                entity: "product_id",
                id: id.to_string(),
            })
    }

    pub async fn vat_band(&self, band: &str) -> Result<Decimal, PricingError> {
        self.vat_bands()
            .await?
            .rate(band)
            .ok_or_else(|| PricingError::NotFound {
                entity: "vat_band_id",
                id: band.to_string(),
            })
    }
}
