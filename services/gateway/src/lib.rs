//! Pricing gateway
//!
//! Exposes the catalog, exchange rate and order pricing operations of the
//! pricing engine over HTTP.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
