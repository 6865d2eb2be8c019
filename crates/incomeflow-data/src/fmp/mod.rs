//! Financial Modeling Prep quarterly income statements.

pub mod client;
pub mod statement;

pub use client::FmpClient;
pub use statement::{FmpIncomeStatement, chronological, parse_statements};
