//! Order input and priced output types
//!
//! An order only lives for the duration of one pricing request. The input is
//! validated into an [`OrderRequest`]; the pricing engine turns it into a
//! [`PricedOrder`] that echoes the caller's order enriched with per-item and
//! order-level totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{CurrencyCode, ProductId};
use crate::numeric::sum_money;

/// Item keys computed by the engine. Product attributes with these names are
/// not copied onto priced items.
pub const ITEM_COMPUTED_KEYS: [&str; 7] = [
    "product_id",
    "quantity",
    "price",
    "vat",
    "vat_band",
    "item_price",
    "item_vat",
];

/// Order keys owned by the engine. Everything else on the input order is echoed back.
pub const ORDER_COMPUTED_KEYS: [&str; 6] = [
    "id",
    "customer",
    "items",
    "currency",
    "order_total_price",
    "order_total_vat",
];

/// One requested product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u64,
}

/// A validated pricing request
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Caller supplied order id, opaque
    pub id: Value,
    /// Opaque customer block
    pub customer: Option<Value>,
    /// Requested lines as received, possibly with repeated products
    pub lines: Vec<OrderLine>,
    /// Requested currency, base currency when absent
    pub currency: CurrencyCode,
    /// Remaining order keys, echoed back unchanged
    pub extra: Map<String, Value>,
}

/// A resolved order item in the requested currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub product_id: ProductId,
    /// Quantity summed across repeated lines for this product
    pub quantity: u64,
    /// Converted unit price, rounded
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// VAT rate of the product's band
    #[serde(with = "rust_decimal::serde::float")]
    pub vat: Decimal,
    /// `price * quantity`, rounded
    #[serde(with = "rust_decimal::serde::float")]
    pub item_price: Decimal,
    /// `item_price * vat`, rounded
    #[serde(with = "rust_decimal::serde::float")]
    pub item_vat: Decimal,
    /// Passthrough product attributes
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A fully priced order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOrder {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Value>,
    pub currency: CurrencyCode,
    pub items: Vec<PricedItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_total_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_total_vat: Decimal,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PricedOrder {
    /// Assemble the response, totalling the already rounded item values
    pub fn assemble(request: OrderRequest, items: Vec<PricedItem>) -> Self {
        let order_total_price = sum_money(items.iter().map(|i| i.item_price));
        let order_total_vat = sum_money(items.iter().map(|i| i.item_vat));

        Self {
            id: request.id,
            customer: request.customer,
            currency: request.currency,
            items,
            order_total_price,
            order_total_vat,
            extra: request.extra,
        }
    }
}
