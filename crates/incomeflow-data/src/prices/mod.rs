//! Daily prices from the price service.

pub mod client;
pub mod series;

pub use client::PriceClient;
pub use series::{PricePoint, PriceSeries};
