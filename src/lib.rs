//! Storefront Pricing
//!
//! Cart pricing and discount resolution for a multi-seller storefront: carts of seller offers,
//! promotions of several kinds, and a pricing engine that applies the best discount per line.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod utils;
