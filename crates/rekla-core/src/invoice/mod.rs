//! Invoice scanning pipeline: field recognition, cost classification,
//! totals reconciliation, and confidence scoring.

mod classify;
mod fields;
mod parser;
pub mod rules;
mod score;
mod totals;

pub use classify::{classify_description, ClassifiedRows, CostClassifier};
pub use fields::{FieldRecognizer, FieldScan};
pub use parser::InvoiceScanner;
pub use score::{ConfidenceScorer, ScoreSignals};
pub use totals::{Reconciliation, TotalsReconciler};

use crate::error::Result;
use crate::models::{ParseResult, RawDocument};

/// Trait for invoice parsers.
pub trait InvoiceParser {
    /// Parse a raw document end to end.
    fn parse(&self, document: &RawDocument) -> Result<ParseResult>;

    /// Parse pre-extracted document text.
    fn parse_text(&self, text: &str) -> Result<ParseResult>;
}
