//! Core library for Norwegian service-invoice scanning.
//!
//! This crate provides:
//! - PDF processing (text layer and embedded image extraction)
//! - an OCR collaborator boundary with a pure-Rust engine behind the
//!   `native` feature
//! - heuristic extraction of invoice rows with cost classification
//!   (labor, parts, travel, overtime, vehicle)
//! - totals reconciliation against the printed total and a deterministic
//!   confidence score

pub mod error;
pub mod invoice;
pub mod lines;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use error::{OcrError, PdfError, ReklaError, Result};
pub use invoice::{InvoiceParser, InvoiceScanner};
pub use lines::TextLine;
pub use models::{
    CostCategory, InvoiceFields, LineItem, MediaType, ParseResult, RawDocument, ReklaConfig,
    ScanMetadata, TextOrigin, Totals,
};
pub use ocr::OcrSource;
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
