pub mod catalog;
pub mod currency;
pub mod health;
pub mod pricing;
