use crate::error::AppError;
use crate::models::ExchangeRateResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use pricing_types::ids::CurrencyCode;

/// Supported currency codes, sorted
pub async fn list_currencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CurrencyCode>>, AppError> {
    let codes = state.engine.rates().currencies().await?;
    Ok(Json(codes.iter().cloned().collect()))
}

/// Rate converting one unit of the base currency into `currency`
pub async fn currency_rate(
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> Result<Json<ExchangeRateResponse>, AppError> {
    let currency = CurrencyCode::new(&currency);
    let rate = state.engine.rates().rate_for(&currency).await?;

    Ok(Json(ExchangeRateResponse {
        base: CurrencyCode::base(),
        currency,
        rate,
    }))
}
