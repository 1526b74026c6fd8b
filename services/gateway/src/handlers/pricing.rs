use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use pricing_types::order::PricedOrder;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

pub const INVALID_FORMAT: &str = "Invalid request format - only json accepted";

/// Price an order: `{"order": {"id": ..., "items": [...], "currency": ...}}`
pub async fn pricing_info(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PricedOrder>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected pricing request body");
        AppError::BadRequest(INVALID_FORMAT.to_string())
    })?;

    let request_id = Uuid::now_v7();
    let span = tracing::info_span!("pricing_info", %request_id);
    let order = state.engine.get_totals(&payload).instrument(span).await?;

    Ok(Json(order))
}
