//! Header field recognition.
//!
//! Applies label-anchored patterns line by line. The first match per field
//! wins and is never overwritten; lines that carried a header label are
//! reported as consumed so the cost classifier skips them.

use tracing::debug;

use crate::lines::TextLine;
use crate::models::InvoiceFields;

use super::rules::dates::extract_date;
use super::rules::patterns::{COMPANY_SUFFIX, CUSTOMER, INVOICE_DATE, INVOICE_NUMBER, SUPPLIER};

/// How many leading lines may act as an unlabeled supplier-name line.
const SUPPLIER_FALLBACK_WINDOW: usize = 3;

/// Outcome of header recognition.
#[derive(Debug, Clone, Default)]
pub struct FieldScan {
    /// Recognized fields (partial population is valid).
    pub fields: InvoiceFields,
    /// Indices of lines consumed as header lines.
    pub consumed: Vec<usize>,
}

impl FieldScan {
    /// True when `index` was consumed by the recognizer.
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.contains(&index)
    }
}

/// Label-anchored header field recognizer.
pub struct FieldRecognizer;

impl FieldRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Scan the line sequence for header fields.
    pub fn recognize(&self, lines: &[TextLine]) -> FieldScan {
        let mut scan = FieldScan::default();

        for (position, line) in lines.iter().enumerate() {
            let mut matched = false;

            if scan.fields.invoice_number.is_none() {
                if let Some(caps) = INVOICE_NUMBER.captures(&line.raw) {
                    scan.fields.invoice_number = Some(caps[1].trim().to_string());
                    matched = true;
                }
            }

            if let Some(caps) = INVOICE_DATE.captures(&line.raw) {
                // Label match consumes the line even when the date itself is
                // unparseable; the field then simply stays absent.
                matched = true;
                if scan.fields.invoice_date.is_none() {
                    scan.fields.invoice_date = extract_date(&caps[1]);
                }
            }

            if scan.fields.supplier_name.is_none() {
                if let Some(caps) = SUPPLIER.captures(&line.raw) {
                    let name = caps[1].trim();
                    if !name.is_empty() {
                        scan.fields.supplier_name = Some(name.to_string());
                        matched = true;
                    }
                }
            }

            if scan.fields.customer_name.is_none() {
                if let Some(caps) = CUSTOMER.captures(&line.raw) {
                    let name = caps[1].trim();
                    if !name.is_empty() {
                        scan.fields.customer_name = Some(name.to_string());
                        matched = true;
                    }
                }
            }

            // Unlabeled letterhead line like "Myhrvold AS" near the top
            if !matched
                && scan.fields.supplier_name.is_none()
                && position < SUPPLIER_FALLBACK_WINDOW
                && COMPANY_SUFFIX.is_match(&line.raw)
            {
                scan.fields.supplier_name = Some(line.raw.clone());
                matched = true;
            }

            if matched {
                scan.consumed.push(line.index);
            }
        }

        debug!(
            missing = scan.fields.missing_count(),
            consumed = scan.consumed.len(),
            "header field scan complete"
        );

        scan
    }
}

impl Default for FieldRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::lines_from_text;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn recognize(text: &str) -> FieldScan {
        FieldRecognizer::new().recognize(&lines_from_text(text))
    }

    #[test]
    fn test_recognize_labeled_fields() {
        let scan = recognize(
            "Faktura nr: 2313028\nFakturadato: 12.04.2023\nKunde: Storkjøkken Service AS",
        );

        assert_eq!(scan.fields.invoice_number.as_deref(), Some("2313028"));
        assert_eq!(
            scan.fields.invoice_date,
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
        assert_eq!(
            scan.fields.customer_name.as_deref(),
            Some("Storkjøkken Service AS")
        );
        assert_eq!(scan.consumed, vec![0, 1, 2]);
    }

    #[test]
    fn test_first_match_wins() {
        let scan = recognize("Fakturanr: 2313024\nFakturanr: 9999999");
        assert_eq!(scan.fields.invoice_number.as_deref(), Some("2313024"));
    }

    #[test]
    fn test_supplier_fallback_from_letterhead() {
        let scan = recognize("Myhrvold AS\nFaktura nr: 2313024");
        assert_eq!(scan.fields.supplier_name.as_deref(), Some("Myhrvold AS"));
        assert!(scan.is_consumed(0));
    }

    #[test]
    fn test_supplier_fallback_window() {
        // A company-suffix line deep in the document is a row, not a header
        let scan = recognize("a\nb\nc\nd\nVerksted Partner AS");
        assert_eq!(scan.fields.supplier_name, None);
    }

    #[test]
    fn test_unparseable_date_left_absent() {
        let scan = recognize("Fakturadato: snarest\nArbeid 1,0 650,00 650,00");
        assert_eq!(scan.fields.invoice_date, None);
        assert!(scan.is_consumed(0));
        assert!(!scan.is_consumed(1));
    }

    #[test]
    fn test_no_fields_recognized() {
        let scan = recognize("Reparasjon kjøl 2,0 650,00 1300,00");
        assert!(scan.fields.is_empty());
        assert!(scan.consumed.is_empty());
    }
}
