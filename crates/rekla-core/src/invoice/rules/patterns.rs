//! Common regex patterns for Norwegian invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number, label-anchored ("Faktura nr", "Fakturanr.", "Fakturanummer")
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:faktura\s*(?:nr|nummer)|fakturanr|fakturanummer)\.?\s*:?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)"
    ).unwrap();

    // Labeled invoice date ("Fakturadato: 12.04.2023", "Dato 12.04.23")
    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(?i)(?:fakturadato|faktura\s*dato|\bdato)\b\s*:?\s*(.+)$"
    ).unwrap();

    // Supplier label
    pub static ref SUPPLIER: Regex = Regex::new(
        r"(?i)\b(?:leverandør|utsteder|selger)\b\s*:?\s*(.+)$"
    ).unwrap();

    // Customer label; \b keeps "Kundenr" from matching
    pub static ref CUSTOMER: Regex = Regex::new(
        r"(?i)\b(?:kundenavn|kunde|mottaker|bestiller)\b\s*:?\s*(.+)$"
    ).unwrap();

    // Company-suffix fallback for an unlabeled supplier line
    pub static ref COMPANY_SUFFIX: Regex = Regex::new(
        r"\b(?:AS|ASA|ANS|DA|ENK)\s*$"
    ).unwrap();

    // Explicit printed total ("Totalt 42 994,00", "Sum 573,00", "Å betale: 11 597,00 kr")
    pub static ref TOTAL_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:totalsum|totalt?|sum(?:\s+totalt)?|å\s+betale|til\s+betaling|beløp\s+å\s+betale)\b\s*:?\s*(?:kr\.?\s*)?(\d{1,3}(?:[ \u{00a0}]\d{3})*(?:[,.]\d+)?|\d+(?:[,.]\d+)?)\s*(?:kr\.?|NOK)?\s*$"
    ).unwrap();

    // VAT summary lines are neither rows nor the grand total
    pub static ref VAT_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:herav\s+)?(?:mva|moms|merverdiavgift)\b"
    ).unwrap();

    // Full-token amount test (used on tokenizer output)
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^(?:\d{1,3}(?:[ \u{00a0}]\d{3})+(?:[,.]\d+)?|\d+(?:[,.]\d+)?)$"
    ).unwrap();

    // Norwegian date formats
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_NORWEGIAN_LONG: Regex = Regex::new(
        r"(?i)(\d{1,2})\.?\s+(januar|februar|mars|april|mai|juni|juli|august|september|oktober|november|desember)\s+(\d{4})"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_variants() {
        for line in [
            "Faktura nr: 2313028",
            "Fakturanr. 2313028",
            "FAKTURANUMMER 2313028",
        ] {
            let caps = INVOICE_NUMBER.captures(line).unwrap();
            assert_eq!(&caps[1], "2313028", "failed on {line:?}");
        }
    }

    #[test]
    fn test_invoice_number_does_not_match_date_label() {
        assert!(INVOICE_NUMBER.captures("Fakturadato: 12.04.2023").is_none());
    }

    #[test]
    fn test_customer_label_skips_kundenr() {
        assert!(CUSTOMER.captures("Kundenr: 10442").is_none());
        let caps = CUSTOMER.captures("Kunde: Storkjøkken Service AS").unwrap();
        assert_eq!(caps[1].trim(), "Storkjøkken Service AS");
    }

    #[test]
    fn test_total_line_variants() {
        for (line, amount) in [
            ("Totalt 42 994,00", "42 994,00"),
            ("Sum 573,00", "573,00"),
            ("Å betale: 11 597,00 kr", "11 597,00"),
            ("Til betaling 3025,00", "3025,00"),
        ] {
            let caps = TOTAL_LINE.captures(line).unwrap();
            assert_eq!(&caps[1], amount, "failed on {line:?}");
        }
    }

    #[test]
    fn test_total_line_rejects_row_lines() {
        assert!(TOTAL_LINE.captures("Arbeid 2,0 650,00 1300,00").is_none());
        assert!(TOTAL_LINE.captures("Sum deler levert i mars").is_none());
    }

    #[test]
    fn test_vat_line() {
        assert!(VAT_LINE.is_match("Mva 25% 605,00"));
        assert!(VAT_LINE.is_match("Herav mva 143,25"));
        assert!(!VAT_LINE.is_match("Deler termostat 1,0 1125,00 1125,00"));
    }

    #[test]
    fn test_numeric_token() {
        assert!(NUMERIC_TOKEN.is_match("1 234,56"));
        assert!(NUMERIC_TOKEN.is_match("2,0"));
        assert!(NUMERIC_TOKEN.is_match("650"));
        assert!(!NUMERIC_TOKEN.is_match("50%"));
        assert!(!NUMERIC_TOKEN.is_match("A1"));
    }
}
