//! Order payload validation
//!
//! Turns a raw JSON pricing request into an [`OrderRequest`].
//!
//! Checks performed (in order, first failure wins):
//! 1. Payload has an `order` key
//! 2. Order has an `id`
//! 3. Order has an `items` list
//! 4. Items list is not empty
//! 5. Every item has a `product_id`
//! 6. Every item has a `quantity`
//! 7. Ids are integers and quantities non-negative integers
//! 8. `currency`, when given, is a string (defaults to GBP)

use pricing_types::errors::PricingError;
use pricing_types::ids::{CurrencyCode, ProductId};
use pricing_types::order::{OrderLine, OrderRequest, ORDER_COMPUTED_KEYS};
use serde_json::{Map, Value};

pub const MISSING_ORDER: &str = "Missing order key";
pub const MISSING_ORDER_ID: &str = "Missing order id";
pub const MISSING_ITEMS: &str = "Missing items list";
pub const EMPTY_ITEMS: &str = "Empty items list";
pub const MISSING_PRODUCT_ID: &str =
    "Malformed items list. product_id is missing for at least one item";
pub const MISSING_QUANTITY: &str =
    "Malformed items list. quantity is missing for at least one item";
pub const INVALID_PRODUCT_ID: &str = "Malformed items list. product_id must be an integer";
pub const INVALID_QUANTITY: &str =
    "Malformed items list. quantity must be a non-negative integer";
pub const INVALID_CURRENCY_FORMAT: &str = "Invalid currency format";

/// Validate a pricing request payload
pub fn validate_order(payload: &Value) -> Result<OrderRequest, PricingError> {
    // 1. order key
    let order = payload
        .get("order")
        .ok_or_else(|| PricingError::validation(MISSING_ORDER))?;

    // 2. order id
    let order = order
        .as_object()
        .ok_or_else(|| PricingError::validation(MISSING_ORDER_ID))?;
    let id = order
        .get("id")
        .ok_or_else(|| PricingError::validation(MISSING_ORDER_ID))?;

    // 3-4. items list, non-empty
    let items = match order.get("items") {
        None => return Err(PricingError::validation(MISSING_ITEMS)),
        Some(items) if is_blank(items) => return Err(PricingError::validation(EMPTY_ITEMS)),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(PricingError::validation(MISSING_ITEMS)),
    };

    // 5. product_id present on every item
    if items.iter().any(|item| item.get("product_id").is_none()) {
        return Err(PricingError::validation(MISSING_PRODUCT_ID));
    }

    // 6. quantity present on every item
    if items.iter().any(|item| item.get("quantity").is_none()) {
        return Err(PricingError::validation(MISSING_QUANTITY));
    }

    // 7. value types
    let lines = items
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>, _>>()?;

    // 8. currency, base currency when absent
    let currency = match order.get("currency") {
        None | Some(Value::Null) => CurrencyCode::base(),
        Some(Value::String(code)) => CurrencyCode::new(code),
        Some(_) => return Err(PricingError::validation(INVALID_CURRENCY_FORMAT)),
    };

    Ok(OrderRequest {
        id: id.clone(),
        customer: order.get("customer").cloned(),
        lines,
        currency,
        extra: passthrough_keys(order),
    })
}

fn parse_line(item: &Value) -> Result<OrderLine, PricingError> {
    let product_id = item
        .get("product_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| PricingError::validation(INVALID_PRODUCT_ID))?;
    let quantity = item
        .get("quantity")
        .and_then(Value::as_u64)
        .ok_or_else(|| PricingError::validation(INVALID_QUANTITY))?;

    Ok(OrderLine {
        product_id: ProductId::new(product_id),
        quantity,
    })
}

/// Null, false, zero, or an empty string, list or object
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn passthrough_keys(order: &Map<String, Value>) -> Map<String, Value> {
    order
        .iter()
        .filter(|(key, _)| !ORDER_COMPUTED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
