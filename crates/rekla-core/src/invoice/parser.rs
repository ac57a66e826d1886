//! Parser facade orchestrating extraction, recognition, classification,
//! reconciliation, and scoring for one document.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ReklaError, Result};
use crate::lines::{lines_from_pages, lines_from_text, TextLine};
use crate::models::{
    MediaType, ParseResult, RawDocument, ReklaConfig, ScanMetadata, TextOrigin,
};
use crate::ocr::OcrSource;
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

use super::rules::amounts::parse_norwegian_amount;
use super::rules::patterns::{TOTAL_LINE, VAT_LINE};
use super::{
    ConfidenceScorer, CostClassifier, FieldRecognizer, InvoiceParser, ScoreSignals,
    TotalsReconciler,
};

/// Default parser profile identifier.
const DEFAULT_PROFILE: &str = "myhrvold";

/// Single entry point for scanning one supplier invoice.
///
/// Holds no shared mutable state; concurrent `parse` calls on the same
/// scanner are independent. Every recoverable imperfection degrades the
/// confidence score instead of failing the call; only a document with no
/// extractable text at all is a hard error.
pub struct InvoiceScanner {
    profile: String,
    config: ReklaConfig,
    ocr: Option<Box<dyn OcrSource>>,
}

impl InvoiceScanner {
    /// Create a scanner with the given configuration and no OCR engine.
    pub fn new(config: ReklaConfig) -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            config,
            ocr: None,
        }
    }

    /// Set the parser profile recorded on results.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Attach an OCR engine for scanned documents.
    pub fn with_ocr(mut self, ocr: Box<dyn OcrSource>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Extract text lines from the document, preferring the PDF text layer
    /// and failing over to OCR.
    fn extract_lines(&self, document: &RawDocument) -> Result<(Vec<TextLine>, TextOrigin)> {
        match document.media_type {
            MediaType::Pdf => self.extract_pdf_lines(document),
            MediaType::Image => self.extract_image_lines(document),
        }
    }

    fn extract_pdf_lines(&self, document: &RawDocument) -> Result<(Vec<TextLine>, TextOrigin)> {
        let mut extractor = PdfExtractor::new();
        if let Err(e) = extractor.load(&document.bytes) {
            return Err(ReklaError::UnreadableDocument(format!(
                "PDF could not be opened: {}",
                e
            )));
        }

        let pdf_type = extractor.analyze();
        debug!(?pdf_type, "PDF content analysis");

        match pdf_type {
            PdfType::Empty => {
                return Err(ReklaError::UnreadableDocument(
                    "PDF contains neither text nor images".to_string(),
                ));
            }
            // Scanned document, the text layer attempt would be pointless
            PdfType::Image => return self.ocr_pdf(&extractor),
            PdfType::Text | PdfType::Hybrid => {}
        }

        if self.config.pdf.prefer_embedded_text {
            match extractor.extract_text() {
                Ok(text) if text.trim().len() >= self.config.pdf.min_text_length => {
                    let lines = lines_from_text(&text);
                    if !lines.is_empty() {
                        debug!(lines = lines.len(), "using embedded text layer");
                        return Ok((lines, TextOrigin::TextLayer));
                    }
                }
                Ok(_) => debug!("text layer too short, trying OCR"),
                Err(e) => warn!("text layer extraction failed: {}", e),
            }
        }

        self.ocr_pdf(&extractor)
    }

    fn ocr_pdf(&self, extractor: &PdfExtractor) -> Result<(Vec<TextLine>, TextOrigin)> {
        let Some(ocr) = self.ocr.as_deref() else {
            return Err(ReklaError::UnreadableDocument(
                "no embedded text and no OCR engine configured".to_string(),
            ));
        };

        let mut page_count = extractor.page_count();
        if self.config.pdf.max_pages > 0 {
            page_count = page_count.min(self.config.pdf.max_pages as u32);
        }

        let mut page_texts = Vec::new();
        for page in 1..=page_count {
            let images = match extractor.extract_images(page) {
                Ok(images) => images,
                Err(e) => {
                    warn!("failed to extract images from page {}: {}", page, e);
                    continue;
                }
            };

            for image in &images {
                match ocr.recognize_lines(image) {
                    Ok(lines) if !lines.is_empty() => page_texts.push(lines.join("\n")),
                    Ok(_) => debug!("no text recognized on page {}", page),
                    Err(e) => {
                        return Err(ReklaError::UnreadableDocument(format!(
                            "OCR failed on page {}: {}",
                            page, e
                        )));
                    }
                }
            }
        }

        let lines = lines_from_pages(page_texts.iter().map(String::as_str));
        if lines.is_empty() {
            return Err(ReklaError::UnreadableDocument(
                "neither text layer nor OCR produced any lines".to_string(),
            ));
        }

        Ok((lines, TextOrigin::Ocr))
    }

    fn extract_image_lines(&self, document: &RawDocument) -> Result<(Vec<TextLine>, TextOrigin)> {
        let Some(ocr) = self.ocr.as_deref() else {
            return Err(ReklaError::UnreadableDocument(
                "image input requires an OCR engine".to_string(),
            ));
        };

        let image = image::load_from_memory(&document.bytes).map_err(|e| {
            ReklaError::UnreadableDocument(format!("image could not be decoded: {}", e))
        })?;

        let ocr_lines = ocr
            .recognize_lines(&image)
            .map_err(|e| ReklaError::UnreadableDocument(format!("OCR failed: {}", e)))?;

        let text = ocr_lines.join("\n");
        let lines = lines_from_text(&text);
        if lines.is_empty() {
            return Err(ReklaError::UnreadableDocument(
                "OCR produced no text lines".to_string(),
            ));
        }

        Ok((lines, TextOrigin::Ocr))
    }

    /// Run recognition, classification, reconciliation and scoring over
    /// extracted lines, in that fixed order.
    fn parse_lines(&self, lines: &[TextLine], origin: TextOrigin, start: Instant) -> ParseResult {
        let field_scan = FieldRecognizer::new().recognize(lines);

        // Partition the remaining lines: the first explicit total line feeds
        // the reconciler, VAT summary lines are neither rows nor totals,
        // everything else is a candidate row.
        let mut printed_total = None;
        let mut candidates: Vec<&TextLine> = Vec::new();

        for line in lines {
            if field_scan.is_consumed(line.index) {
                continue;
            }
            if VAT_LINE.is_match(&line.raw) {
                continue;
            }
            if let Some(caps) = TOTAL_LINE.captures(&line.raw) {
                // "Sum" and "Å betale" often both appear; the first one is
                // the printed total, later ones are never cost rows either
                if printed_total.is_none() {
                    printed_total = parse_norwegian_amount(&caps[1]);
                }
                continue;
            }
            candidates.push(line);
        }

        let classified = CostClassifier::new().classify(&candidates);
        let reconciliation = TotalsReconciler::new(self.config.reconcile.clone())
            .reconcile(&classified.rows, printed_total);

        let mut warnings = Vec::new();
        if field_scan.fields.invoice_number.is_none() {
            warnings.push("could not locate invoice number".to_string());
        }
        if field_scan.fields.invoice_date.is_none() {
            warnings.push("could not locate invoice date".to_string());
        }
        if field_scan.fields.supplier_name.is_none() {
            warnings.push("could not locate supplier name".to_string());
        }
        if field_scan.fields.customer_name.is_none() {
            warnings.push("could not locate customer name".to_string());
        }
        if classified.lines_dropped > 0 {
            warnings.push(format!(
                "dropped {} unparseable line(s)",
                classified.lines_dropped
            ));
        }
        if reconciliation.mismatch {
            warnings.push(format!(
                "printed total diverges from row sum by {}",
                reconciliation.delta.unwrap_or_default()
            ));
        }

        let signals = ScoreSignals {
            ocr_used: origin == TextOrigin::Ocr,
            missing_fields: field_scan.fields.missing_count(),
            total_mismatch: reconciliation.mismatch,
            lines_total: classified.lines_total,
            lines_dropped: classified.lines_dropped,
        };
        let confidence = ConfidenceScorer::new(self.config.scoring.clone()).score(&signals);

        info!(
            profile = %self.profile,
            rows = classified.rows.len(),
            grand_total = %reconciliation.totals.grand_total,
            confidence,
            "scan complete"
        );

        ParseResult {
            source: self.profile.clone(),
            fields: field_scan.fields,
            rows: classified.rows,
            totals: reconciliation.totals,
            confidence,
            metadata: ScanMetadata {
                origin,
                warnings,
                lines_total: classified.lines_total,
                lines_dropped: classified.lines_dropped,
                explicit_total_found: printed_total.is_some(),
                reconciliation_delta: reconciliation.delta,
                processing_time_ms: Some(start.elapsed().as_millis() as u64),
            },
        }
    }
}

impl Default for InvoiceScanner {
    fn default() -> Self {
        Self::new(ReklaConfig::default())
    }
}

impl InvoiceParser for InvoiceScanner {
    fn parse(&self, document: &RawDocument) -> Result<ParseResult> {
        let start = Instant::now();
        let (lines, origin) = self.extract_lines(document)?;
        Ok(self.parse_lines(&lines, origin, start))
    }

    fn parse_text(&self, text: &str) -> Result<ParseResult> {
        let start = Instant::now();
        let lines = lines_from_text(text);
        if lines.is_empty() {
            return Err(ReklaError::UnreadableDocument(
                "document text contained no lines".to_string(),
            ));
        }
        Ok(self.parse_lines(&lines, TextOrigin::TextLayer, start))
    }
}
