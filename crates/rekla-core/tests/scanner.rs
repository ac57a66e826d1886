//! End-to-end scanner tests over known claim-invoice fixtures.

use std::io::Cursor;
use std::str::FromStr;

use image::DynamicImage;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use rekla_core::{
    CostCategory, InvoiceParser, InvoiceScanner, OcrError, OcrSource, RawDocument, ReklaError,
    TextOrigin,
};

const INVOICE_2313024: &str = "\
Myhrvold AS
Faktura nr: 2313024
Fakturadato: 02.03.2023
Kunde: Kafé Nord AS
Arbeid 0,5 650,00 325,00
Deler pakning 1,0 248,00 248,00
Sum 573,00";

const INVOICE_2313028: &str = "\
Myhrvold AS
Faktura nr: 2313028
Fakturadato: 12.04.2023
Kunde: Storkjøkken Service AS
Arbeid utført 2,0 650,00 1300,00
Deler termostat 1,0 1125,00 1125,00
Kjøring km 1,0 600,00 600,00
Totalt 3025,00";

const INVOICE_2313034: &str = "\
Myhrvold AS
Fakturanr. 2313034
Fakturadato: 02.06.2023
Kunde: Hotell Fjordblikk AS
Arbeid service kjølerom 8,0 1100,00 8800,00
Overtid kveld 4,0 875,00 3500,00
Deler kompressor 1,0 24194,00 24194,00
Deler ventilsett 1,0 5000,00 5000,00
Reisetid 2,0 750,00 1500,00
Totalt 42 994,00";

const INVOICE_2313044: &str = "\
Myhrvold AS
Faktura nr: 2313044
Fakturadato: 18.08.2023
Kunde: Bakeri Sentrum AS
Arbeid feilsøking 3,0 650,00 1950,00
Deler fordamper 1,0 9647,30 9647,30
Å betale 11 597,00";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn scanner() -> InvoiceScanner {
    InvoiceScanner::default()
}

/// OCR stub returning canned lines regardless of input.
struct StubOcr {
    lines: Vec<String>,
}

impl StubOcr {
    fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    fn empty() -> Self {
        Self { lines: Vec::new() }
    }
}

impl OcrSource for StubOcr {
    fn recognize_lines(&self, _image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        Ok(self.lines.clone())
    }
}

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::new_rgb8(8, 8);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn scenario_2313024_totals() {
    let result = scanner().parse_text(INVOICE_2313024).unwrap();

    assert_eq!(result.totals.work_cost, dec("325.00"));
    assert_eq!(result.totals.parts_cost, dec("248.00"));
    assert_eq!(result.totals.grand_total, dec("573.00"));
    assert!(result.confidence > 70, "confidence {}", result.confidence);
}

#[test]
fn scenario_2313028_totals_and_fields() {
    let result = scanner().parse_text(INVOICE_2313028).unwrap();

    assert_eq!(result.totals.work_cost, dec("1300.00"));
    assert_eq!(result.totals.parts_cost, dec("1125.00"));
    assert_eq!(result.totals.travel_cost, dec("600.00"));
    assert_eq!(result.totals.grand_total, dec("3025.00"));
    assert!(result.confidence > 70, "confidence {}", result.confidence);
    assert!(!result.rows.is_empty());
    assert_eq!(result.fields.invoice_number.as_deref(), Some("2313028"));
}

#[test]
fn scenario_2313034_totals() {
    let result = scanner().parse_text(INVOICE_2313034).unwrap();

    assert_eq!(result.totals.work_cost, dec("8800.00"));
    assert_eq!(result.totals.parts_cost, dec("29194.00"));
    assert_eq!(result.totals.overtime_cost, dec("3500.00"));
    assert_eq!(result.totals.grand_total, dec("42994.00"));
}

#[test]
fn scenario_2313044_printed_total_wins() {
    let result = scanner().parse_text(INVOICE_2313044).unwrap();

    assert_eq!(result.totals.work_cost, dec("1950.00"));
    assert_eq!(result.totals.parts_cost, dec("9647.30"));
    // 1950 + 9647.30 != 11597: the printed total takes precedence
    assert_eq!(result.totals.grand_total, dec("11597.00"));
    assert!(result.metadata.explicit_total_found);
    assert_eq!(result.metadata.reconciliation_delta, Some(dec("-0.30")));
}

#[test]
fn scenario_unreadable_document() {
    let doc = RawDocument::pdf(b"%%%% garbage, not a pdf".to_vec());
    let err = scanner().parse(&doc).unwrap_err();
    assert!(matches!(err, ReklaError::UnreadableDocument(_)));

    // OCR that finds nothing is just as unreadable
    let doc = RawDocument::image(png_bytes());
    let err = InvoiceScanner::default()
        .with_ocr(Box::new(StubOcr::empty()))
        .parse(&doc)
        .unwrap_err();
    assert!(matches!(err, ReklaError::UnreadableDocument(_)));
}

#[test]
fn scenario_headerless_document_still_yields_rows() {
    let text = "\
Reparasjon kjøleskap 2,0 650,00 1300,00
Deler dørpakning 1,0 410,00 410,00";

    let result = scanner().parse_text(text).unwrap();

    assert!(result.fields.is_empty());
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.totals.work_cost, dec("1300.00"));
    assert_eq!(result.totals.parts_cost, dec("410.00"));
    assert_eq!(result.totals.grand_total, dec("1710.00"));
    assert!(result.confidence < 100, "missing headers must cost score");
    assert!(result.confidence > 0);
}

#[test]
fn ocr_fallback_is_recorded_and_penalized() {
    let doc = RawDocument::image(png_bytes());
    let ocr_result = InvoiceScanner::default()
        .with_ocr(Box::new(StubOcr::from_text(INVOICE_2313028)))
        .parse(&doc)
        .unwrap();
    let text_result = scanner().parse_text(INVOICE_2313028).unwrap();

    assert_eq!(ocr_result.metadata.origin, TextOrigin::Ocr);
    assert_eq!(ocr_result.totals, text_result.totals);
    assert!(ocr_result.confidence < text_result.confidence);
    assert!(ocr_result.confidence > 70, "one clean OCR scan stays usable");
}

#[test]
fn rows_preserve_document_order() {
    let result = scanner().parse_text(INVOICE_2313034).unwrap();

    for pair in result.rows.windows(2) {
        assert!(pair[0].line_index < pair[1].line_index);
    }
}

#[test]
fn parsing_is_idempotent() {
    let a = scanner().parse_text(INVOICE_2313034).unwrap();
    let b = scanner().parse_text(INVOICE_2313034).unwrap();

    assert_eq!(a.fields, b.fields);
    assert_eq!(a.totals, b.totals);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.rows.len(), b.rows.len());
}

#[test]
fn three_token_rows_are_arithmetically_consistent() {
    let tolerance = dec("0.50");
    let result = scanner().parse_text(INVOICE_2313034).unwrap();

    assert!(!result.rows.is_empty());
    for row in &result.rows {
        let computed = row.quantity * row.unit_price;
        assert!(
            (computed - row.total_price).abs() <= tolerance,
            "row {:?} inconsistent",
            row.description
        );
    }
}

#[test]
fn all_totals_are_non_negative() {
    for text in [
        INVOICE_2313024,
        INVOICE_2313028,
        INVOICE_2313034,
        INVOICE_2313044,
    ] {
        let result = scanner().parse_text(text).unwrap();
        let totals = &result.totals;
        for amount in [
            totals.work_cost,
            totals.parts_cost,
            totals.travel_cost,
            totals.overtime_cost,
            totals.vehicle_cost,
            totals.other_cost,
            totals.grand_total,
        ] {
            assert!(amount >= Decimal::ZERO);
        }
    }
}

#[test]
fn categories_are_assigned_from_descriptions() {
    let result = scanner().parse_text(INVOICE_2313034).unwrap();
    let categories: Vec<CostCategory> = result.rows.iter().map(|r| r.category).collect();

    assert_eq!(
        categories,
        vec![
            CostCategory::Labor,
            CostCategory::Overtime,
            CostCategory::Parts,
            CostCategory::Parts,
            CostCategory::Travel,
        ]
    );
}
