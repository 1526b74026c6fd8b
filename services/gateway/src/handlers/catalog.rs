use crate::error::AppError;
use crate::models::VatBandResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use pricing_types::catalog::{Product, ProductMap, VatBands};
use pricing_types::ids::ProductId;

/// Full product list keyed by id
pub async fn list_products(State(state): State<AppState>) -> Result<Json<ProductMap>, AppError> {
    let products = state.engine.catalog().products().await?;
    Ok(Json(products.as_ref().clone()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .engine
        .catalog()
        .product(ProductId::new(product_id))
        .await?;
    Ok(Json(product))
}

pub async fn list_vat_bands(State(state): State<AppState>) -> Result<Json<VatBands>, AppError> {
    let bands = state.engine.catalog().vat_bands().await?;
    Ok(Json(bands.as_ref().clone()))
}

pub async fn get_vat_band(
    State(state): State<AppState>,
    Path(vat_band_id): Path<String>,
) -> Result<Json<VatBandResponse>, AppError> {
    let rate = state.engine.catalog().vat_band(&vat_band_id).await?;
    Ok(Json(VatBandResponse {
        vat_band: vat_band_id,
        rate,
    }))
}
