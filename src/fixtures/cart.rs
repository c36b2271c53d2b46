//! Cart Fixtures

use serde::Deserialize;

/// Cart file: the lines to add, in order
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Offer key from the catalog file
    pub offer: String,

    /// Units to add
    pub quantity: u32,
}
