//! Types library for the order pricing service
//!
//! Pure data definitions shared by the pricing engine and the HTTP gateway.
//! Nothing in here performs I/O.
//!
//! # Modules
//! - `ids`: Identifiers (ProductId, CurrencyCode)
//! - `numeric`: Monetary rounding
//! - `catalog`: Product and VAT band catalog types
//! - `order`: Order input and priced output types
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod catalog;
pub mod order;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::catalog::*;
    pub use crate::order::*;
    pub use crate::errors::*;
}
