#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/incomeflow/incomeflow/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod reconciler;
pub mod render;
pub mod source;

// Re-export main types from sub-crates
pub use incomeflow_data as data;
pub use incomeflow_output as output;
pub use incomeflow_valuation as valuation;

pub use config::{Endpoints, ReconcilerConfig};
pub use error::{ReconcileError, Result, SourceAttempt};
pub use reconciler::{Reconciler, Reconciliation, SourceSet, Valuation};
pub use render::{ChartOutcome, render_chart};
pub use source::{FmpEdgarSource, IncomeSource, SourceOutcome, StatementDogSource};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
