use crate::handlers::{catalog, currency, health, pricing};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/products", get(catalog::list_products))
        .route("/product/{product_id}", get(catalog::get_product))
        .route("/vat_bands", get(catalog::list_vat_bands))
        .route("/vat_band/{vat_band_id}", get(catalog::get_vat_band))
        .route("/currencies", get(currency::list_currencies))
        .route("/currency_rate/{currency}", get(currency::currency_rate))
        .route("/pricing_info", post(pricing::pricing_info))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
