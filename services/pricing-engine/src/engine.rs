//! Order pricing engine
//!
//! Main entry point for pricing an order. Validates the payload, merges
//! repeated products, resolves catalog prices and VAT in the requested
//! currency and totals the result. Either the whole order is priced or a
//! single error is returned.

use std::collections::BTreeMap;

use pricing_types::catalog::{Product, VatBands};
use pricing_types::errors::PricingError;
use pricing_types::ids::ProductId;
use pricing_types::numeric::round_money;
use pricing_types::order::{
    OrderLine, OrderRequest, PricedItem, PricedOrder, ITEM_COMPUTED_KEYS,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::catalog::CatalogStore;
use crate::rates::ExchangeRateProvider;
use crate::validator::validate_order;

/// Prices orders against the catalog and current exchange rates
#[derive(Clone)]
pub struct PricingEngine {
    catalog: CatalogStore,
    rates: ExchangeRateProvider,
}

impl PricingEngine {
    pub fn new(catalog: CatalogStore, rates: ExchangeRateProvider) -> Self {
        Self { catalog, rates }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn rates(&self) -> &ExchangeRateProvider {
        &self.rates
    }

    /// Validate and price a raw pricing request (`{"order": {...}}`)
    pub async fn get_totals(&self, payload: &Value) -> Result<PricedOrder, PricingError> {
        let request = validate_order(payload)?;
        self.price(request).await
    }

    /// Price an already validated order
    pub async fn price(&self, request: OrderRequest) -> Result<PricedOrder, PricingError> {
        let lines = merge_lines(&request.lines)?;

        let products = self.catalog.products().await?;
        let unknown: Vec<String> = lines
            .iter()
            .filter(|line| !products.contains_key(&line.product_id))
            .map(|line| line.product_id.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(PricingError::validation(format!(
                "Malformed items list, invalid product type detected: {}",
                unknown.join(", ")
            )));
        }

        let vat_bands = self.catalog.vat_bands().await?;
        let rate = self.rates.rate_for(&request.currency).await?;

        let items = lines
            .iter()
            .map(|line| price_item(line, &products[&line.product_id], &vat_bands, rate))
            .collect::<Result<Vec<_>, _>>()?;

        let order = PricedOrder::assemble(request, items);
        info!(
            order_id = %order.id,
            currency = %order.currency,
            items = order.items.len(),
            total_price = %order.order_total_price,
            total_vat = %order.order_total_vat,
            "Order priced"
        );
        Ok(order)
    }
}

/// Merge lines sharing a product id, summing quantities. The result is
/// ordered by product id regardless of input order.
pub fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, PricingError> {
    let mut merged: BTreeMap<ProductId, u64> = BTreeMap::new();
    for line in lines {
        let quantity = merged.entry(line.product_id).or_insert(0);
        *quantity = quantity
            .checked_add(line.quantity)
            .ok_or_else(|| quantity_too_large(line.product_id))?;
    }

    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect())
}

/// Price one merged line. Each product is rounded as soon as it is computed.
pub fn price_item(
    line: &OrderLine,
    product: &Product,
    vat_bands: &VatBands,
    rate: Decimal,
) -> Result<PricedItem, PricingError> {
    let vat = vat_bands.rate(&product.vat_band).ok_or_else(|| {
        PricingError::validation(format!(
            "Invalid \"{}\" vat_band for product {}",
            product.vat_band, line.product_id
        ))
    })?;

    let price = round_money(checked_mul(product.price, rate, line.product_id)?);
    let quantity = Decimal::from(line.quantity);
    let item_price = round_money(checked_mul(price, quantity, line.product_id)?);
    let item_vat = round_money(checked_mul(item_price, vat, line.product_id)?);

    let attributes = product
        .attributes
        .iter()
        .filter(|(key, _)| !ITEM_COMPUTED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(PricedItem {
        product_id: line.product_id,
        quantity: line.quantity,
        price,
        vat,
        item_price,
        item_vat,
        attributes,
    })
}

fn checked_mul(a: Decimal, b: Decimal, product_id: ProductId) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or_else(|| quantity_too_large(product_id))
}

fn quantity_too_large(product_id: ProductId) -> PricingError {
    PricingError::validation(format!(
        "Malformed items list. quantity is too large for product {product_id}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PricingCache;
    use crate::catalog::CatalogSource;
    use crate::rates::{RateProviderConfig, RateSource};
    use crate::test_support::{StubRateSource, TEST_CATALOG};
    use pricing_types::ids::CurrencyCode;
    use proptest::prelude::*;
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn engine_with(stub: StubRateSource, catalog: CatalogSource) -> PricingEngine {
        let cache = PricingCache::shared();
        let catalog = CatalogStore::new(Arc::clone(&cache), catalog);
        let source: Arc<dyn RateSource> = Arc::new(stub);
        let rates = ExchangeRateProvider::new(cache, source, &RateProviderConfig::default());
        PricingEngine::new(catalog, rates)
    }

    fn engine() -> PricingEngine {
        engine_with(
            StubRateSource::new(json!({"results": ["EUR", "USD"]}))
                .with_rate("GBP_EUR", json!(1.14))
                .with_rate("GBP_USD", json!(1.001)),
            CatalogSource::inline("test-catalog", TEST_CATALOG),
        )
    }

    fn order(items: Value) -> Value {
        json!({"order": {"id": 12345, "customer": {"customer_id": 1}, "items": items}})
    }

    fn order_in(currency: &str, items: Value) -> Value {
        json!({"order": {"id": 12345, "currency": currency, "items": items}})
    }

    #[tokio::test]
    async fn test_duplicate_products_merged_and_totalled() {
        let priced = engine()
            .get_totals(&order(json!([
                {"product_id": 1, "quantity": 2},
                {"product_id": 2, "quantity": 2},
                {"product_id": 1, "quantity": 3}
            ])))
            .await
            .unwrap();

        assert_eq!(priced.currency, CurrencyCode::base());
        assert_eq!(priced.items.len(), 2);

        let first = &priced.items[0];
        assert_eq!(first.product_id, ProductId::new(1));
        assert_eq!(first.quantity, 5);
        assert_eq!(first.price, dec("10.00"));
        assert_eq!(first.vat, dec("0.2"));
        assert_eq!(first.item_price, dec("50.00"));
        assert_eq!(first.item_vat, dec("10.00"));

        let second = &priced.items[1];
        assert_eq!(second.quantity, 2);
        assert_eq!(second.item_price, dec("10.00"));
        assert_eq!(second.item_vat, dec("2.00"));

        assert_eq!(priced.order_total_price, dec("60.00"));
        assert_eq!(priced.order_total_vat, dec("12.00"));
        assert_eq!(priced.customer, Some(json!({"customer_id": 1})));
    }

    #[tokio::test]
    async fn test_unknown_products_all_listed() {
        let err = engine()
            .get_totals(&order(json!([
                {"product_id": 999, "quantity": 3},
                {"product_id": 1, "quantity": 2},
                {"product_id": 500, "quantity": 1}
            ])))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PricingError::validation(
                "Malformed items list, invalid product type detected: 500, 999"
            )
        );
    }

    #[tokio::test]
    async fn test_unknown_vat_band() {
        let err = engine()
            .get_totals(&order(json!([{"product_id": 4, "quantity": 1}])))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid \"luxury\" vat_band for product 4");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_price_converted_to_requested_currency() {
        let priced = engine()
            .get_totals(&order_in(
                "eur",
                json!([
                    {"product_id": 3, "quantity": 3},
                    {"product_id": 1, "quantity": 1}
                ]),
            ))
            .await
            .unwrap();

        assert_eq!(priced.currency.as_str(), "EUR");
        let bread = &priced.items[1];
        assert_eq!(bread.price, dec("3.41"));
        assert_eq!(bread.item_price, dec("10.23"));
        assert_eq!(bread.item_vat, Decimal::ZERO);
        assert_eq!(bread.attributes.get("name"), Some(&json!("Bread")));

        assert_eq!(priced.items[0].price, dec("11.40"));
        assert_eq!(priced.items[0].item_vat, dec("2.28"));
        assert_eq!(priced.order_total_price, dec("21.63"));
        assert_eq!(priced.order_total_vat, dec("2.28"));
    }

    #[tokio::test]
    async fn test_rounding_applied_after_each_multiplication() {
        // 5.00 * 1.001 = 5.005 -> 5.01, then 5.01 * 10 = 50.10 (not 50.05)
        let priced = engine()
            .get_totals(&order_in("USD", json!([{"product_id": 2, "quantity": 10}])))
            .await
            .unwrap();

        let item = &priced.items[0];
        assert_eq!(item.price, dec("5.01"));
        assert_eq!(item.item_price, dec("50.10"));
        assert_eq!(item.item_vat, dec("10.02"));
    }

    #[tokio::test]
    async fn test_unknown_currency() {
        let err = engine()
            .get_totals(&order_in("XYZ", json!([{"product_id": 1, "quantity": 1}])))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidCurrency { .. }));
    }

    #[tokio::test]
    async fn test_validation_runs_before_catalog_access() {
        let engine = engine_with(
            StubRateSource::new(json!({"results": []})),
            CatalogSource::file("/nonexistent/pricing.json"),
        );
        let err = engine.get_totals(&json!({"foo": "bar"})).await.unwrap_err();
        assert_eq!(err, PricingError::validation("Missing order key"));

        let err = engine
            .get_totals(&order(json!([{"product_id": 1, "quantity": 1}])))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::CatalogLoad { .. }));
    }

    #[tokio::test]
    async fn test_pricing_is_idempotent() {
        let engine = engine();
        let payload = order_in("EUR", json!([
            {"product_id": 2, "quantity": 1},
            {"product_id": 3, "quantity": 4},
            {"product_id": 2, "quantity": 6}
        ]));

        let first = engine.get_totals(&payload).await.unwrap();
        let second = engine.get_totals(&payload).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_merged_quantity_overflow_rejected() {
        let err = engine()
            .get_totals(&order(json!([
                {"product_id": 1, "quantity": u64::MAX},
                {"product_id": 1, "quantity": 5}
            ])))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PricingError::validation(
                "Malformed items list. quantity is too large for product 1"
            )
        );
    }

    #[test]
    fn test_merge_lines_overflow_is_error() {
        let lines = [
            OrderLine {
                product_id: ProductId::new(2),
                quantity: 1,
            },
            OrderLine {
                product_id: ProductId::new(2),
                quantity: u64::MAX,
            },
        ];
        assert!(matches!(
            merge_lines(&lines),
            Err(PricingError::Validation { .. })
        ));
    }

    #[test]
    fn test_reserved_product_attributes_not_copied() {
        let product = Product {
            product_id: ProductId::new(1),
            price: dec("2.00"),
            vat_band: "standard".to_string(),
            attributes: Map::from_iter([
                ("quantity".to_string(), json!(99)),
                ("sku".to_string(), json!("A-1")),
            ]),
        };
        let bands: VatBands = [("standard".to_string(), dec("0.2"))].into_iter().collect();
        let line = OrderLine {
            product_id: ProductId::new(1),
            quantity: 2,
        };

        let item = price_item(&line, &product, &bands, Decimal::ONE).unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.attributes.len(), 1);
        assert_eq!(item.attributes["sku"], json!("A-1"));
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<OrderLine>> {
        prop::collection::vec((1i64..6, 0u64..1000), 1..30).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(id, quantity)| OrderLine {
                    product_id: ProductId::new(id),
                    quantity,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_merge_lines_unique_sorted_and_conserving(lines in lines_strategy()) {
            let merged = merge_lines(&lines).unwrap();

            for pair in merged.windows(2) {
                prop_assert!(pair[0].product_id < pair[1].product_id);
            }
            for line in &merged {
                let expected: u64 = lines
                    .iter()
                    .filter(|l| l.product_id == line.product_id)
                    .map(|l| l.quantity)
                    .sum();
                prop_assert_eq!(line.quantity, expected);
            }
            let total: u64 = lines.iter().map(|l| l.quantity).sum();
            prop_assert_eq!(merged.iter().map(|l| l.quantity).sum::<u64>(), total);
        }

        #[test]
        fn prop_item_values_rounded_independently(
            cents in 0i64..1_000_000,
            quantity in 0u64..10_000,
            rate_bp in 1i64..50_000,
        ) {
            let product = Product {
                product_id: ProductId::new(1),
                price: Decimal::new(cents, 2),
                vat_band: "standard".to_string(),
                attributes: Map::new(),
            };
            let bands: VatBands = [("standard".to_string(), dec("0.2"))].into_iter().collect();
            let line = OrderLine { product_id: ProductId::new(1), quantity };
            let rate = Decimal::new(rate_bp, 4);

            let item = price_item(&line, &product, &bands, rate).unwrap();
            prop_assert_eq!(item.price, round_money(product.price * rate));
            prop_assert_eq!(item.item_price, round_money(item.price * Decimal::from(quantity)));
            prop_assert_eq!(item.item_vat, round_money(item.item_price * dec("0.2")));
        }
    }
}
