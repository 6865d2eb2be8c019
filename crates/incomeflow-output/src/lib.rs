#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod palette;
pub mod price;
pub mod sankey;
pub mod summary;

pub use chart::{ChartFrame, ChartSpec, ErrorState, PricePanel, Timeline};
pub use export::{BandsExport, ExportError, ExportFormat, Exporter, IncomeExport};
pub use price::{Annotation, BandTrace, PriceFrame};
pub use sankey::{SankeyFrame, SankeyLink, SankeyNode, TODAY_FRAME};
pub use summary::IncomeSummary;

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
