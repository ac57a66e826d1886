//! Data models for scan input, output, and configuration.

pub mod config;
pub mod document;
pub mod result;

pub use config::{PdfConfig, ReconcileConfig, ReklaConfig, ScoringConfig};
pub use document::{MediaType, RawDocument};
pub use result::{
    CostCategory, InvoiceFields, LineItem, ParseResult, ScanMetadata, TextOrigin, Totals,
};
