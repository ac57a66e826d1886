//! Output models for a single invoice scan.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cost category a classified invoice row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Labor / work hours (arbeid, timer, service).
    Labor,
    /// Spare parts and materials (deler, materiell).
    Parts,
    /// Travel time and distance (reise, kjøring, km).
    Travel,
    /// Overtime surcharges (overtid).
    Overtime,
    /// Vehicle costs (servicebil, kjøretøy).
    Vehicle,
    /// Anything the lexicon does not recognize.
    Other,
}

impl CostCategory {
    /// Human-readable Norwegian label, as shown on claim forms.
    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Labor => "arbeid",
            CostCategory::Parts => "deler",
            CostCategory::Travel => "reise",
            CostCategory::Overtime => "overtid",
            CostCategory::Vehicle => "kjøretøy",
            CostCategory::Other => "annet",
        }
    }
}

/// One classified, priced row extracted from the invoice.
///
/// Immutable once created; `total_price` should equal
/// `quantity * unit_price` within rounding tolerance when all three were
/// printed on the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Index of the originating text line, for diagnostics and ordering.
    pub line_index: usize,

    /// Product/service description.
    pub description: String,

    /// Quantity (hours, pieces, kilometres).
    pub quantity: Decimal,

    /// Price per unit.
    pub unit_price: Decimal,

    /// Total price for this row.
    pub total_price: Decimal,

    /// Assigned cost category.
    pub category: CostCategory,
}

/// Header-level fields recognized on the invoice.
///
/// Partial population is valid; a field the recognizer could not locate
/// stays absent rather than defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFields {
    /// Invoice number/identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Invoice date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Supplier (issuer) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,

    /// Customer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

impl InvoiceFields {
    /// Number of header fields that could not be located.
    pub fn missing_count(&self) -> usize {
        [
            self.invoice_number.is_none(),
            self.invoice_date.is_none(),
            self.supplier_name.is_none(),
            self.customer_name.is_none(),
        ]
        .iter()
        .filter(|missing| **missing)
        .count()
    }

    /// True when no field at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.missing_count() == 4
    }
}

/// Reconciled per-category subtotals and the grand total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Labor subtotal.
    pub work_cost: Decimal,

    /// Parts subtotal.
    pub parts_cost: Decimal,

    /// Travel subtotal.
    pub travel_cost: Decimal,

    /// Overtime subtotal.
    pub overtime_cost: Decimal,

    /// Vehicle subtotal.
    pub vehicle_cost: Decimal,

    /// Other subtotal.
    pub other_cost: Decimal,

    /// Grand total: the printed total when one was recognized, otherwise
    /// the sum of all category subtotals.
    pub grand_total: Decimal,
}

impl Totals {
    /// Sum of all category subtotals.
    pub fn category_sum(&self) -> Decimal {
        self.work_cost
            + self.parts_cost
            + self.travel_cost
            + self.overtime_cost
            + self.vehicle_cost
            + self.other_cost
    }

    /// Add an amount to the subtotal for `category`.
    pub fn add(&mut self, category: CostCategory, amount: Decimal) {
        match category {
            CostCategory::Labor => self.work_cost += amount,
            CostCategory::Parts => self.parts_cost += amount,
            CostCategory::Travel => self.travel_cost += amount,
            CostCategory::Overtime => self.overtime_cost += amount,
            CostCategory::Vehicle => self.vehicle_cost += amount,
            CostCategory::Other => self.other_cost += amount,
        }
    }
}

/// Which extraction path produced the text lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// Embedded PDF text layer.
    #[default]
    TextLayer,
    /// OCR over page images (lower fidelity).
    Ocr,
}

/// Out-of-band diagnostics for one scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Extraction path used.
    pub origin: TextOrigin,

    /// Soft issues encountered (missing fields, dropped lines, mismatches).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Candidate row lines seen by the classifier.
    pub lines_total: usize,

    /// Candidate row lines dropped as unparseable.
    pub lines_dropped: usize,

    /// Whether an explicit printed total was recognized.
    pub explicit_total_found: bool,

    /// Printed total minus line sum, when both were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation_delta: Option<Decimal>,

    /// Processing time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

/// Terminal artifact of one parse call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Identifier of the parser profile that produced this result.
    pub source: String,

    /// Recognized header fields.
    pub fields: InvoiceFields,

    /// Classified rows in document order.
    pub rows: Vec<LineItem>,

    /// Reconciled totals.
    pub totals: Totals,

    /// Deterministic extraction confidence, 0-100.
    pub confidence: u8,

    /// Diagnostics.
    pub metadata: ScanMetadata,
}
