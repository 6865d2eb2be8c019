//! StatementDog fundamentals, used for markets the statements provider
//! does not cover.

pub mod client;
pub mod fundamentals;

pub use client::{StatementDogClient, year_window};
pub use fundamentals::{
    DogCommon, DogFundamentals, DogSeries, THOUSANDS, items, parse_calendar_quarter,
};
