//! Promotion Types

mod n_plus_one_free;
mod product_discount;
mod quantity_threshold;
mod whole_cart;

pub use n_plus_one_free::*;
pub use product_discount::*;
pub use quantity_threshold::*;
pub use whole_cart::*;
