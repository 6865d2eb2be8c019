#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bands;
pub mod eps;
pub mod error;
pub mod ttm;

pub use bands::{BandsConfig, PeRange, ValuationBand, ValuationBands, pe_series};
pub use eps::{DailyEps, daily_eps};
pub use error::{Result, ValuationError};
pub use ttm::{TTM_QUARTERS, trailing_eps, trailing_sum};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
