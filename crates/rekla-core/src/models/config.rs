//! Configuration structures for the scan pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReklaError, Result};

/// Main configuration for the rekla pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReklaConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Totals reconciliation configuration.
    pub reconcile: ReconcileConfig,

    /// Confidence scoring schedule.
    pub scoring: ScoringConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try the embedded text layer before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum text length for the text layer to count as usable.
    pub min_text_length: usize,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 10,
        }
    }
}

/// Totals reconciliation configuration.
///
/// Invoices frequently round differently than line-sum arithmetic, so a
/// printed total within `total_tolerance` of the line sum is accepted
/// without comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Allowed gap between a printed total and the summed rows before the
    /// mismatch is flagged to the scorer.
    pub total_tolerance: Decimal,

    /// Allowed gap between `quantity * unit_price` and a row's printed
    /// total.
    pub row_tolerance: Decimal,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            total_tolerance: Decimal::new(100, 2),
            row_tolerance: Decimal::new(50, 2),
        }
    }
}

/// Deduction schedule for the confidence scorer.
///
/// The scorer starts at 100 and subtracts a fixed amount per negative
/// signal, flooring at 0, so scores are deterministic and auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Deduction when the OCR fallback supplied the text.
    pub ocr_fallback: u8,

    /// Deduction per missing header field.
    pub missing_field: u8,

    /// Deduction when a printed total diverges from the line sum beyond
    /// tolerance.
    pub total_mismatch: u8,

    /// Deduction when more than `heavy_drop_rate` of candidate rows were
    /// unparseable.
    pub heavy_drop: u8,

    /// Deduction when more than `moderate_drop_rate` of candidate rows
    /// were unparseable.
    pub moderate_drop: u8,

    /// Drop-rate threshold for the heavy deduction.
    pub heavy_drop_rate: f32,

    /// Drop-rate threshold for the moderate deduction.
    pub moderate_drop_rate: f32,

    /// Deduction when no rows at all were extracted.
    pub no_rows: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ocr_fallback: 25,
            missing_field: 6,
            total_mismatch: 15,
            heavy_drop: 20,
            moderate_drop: 10,
            heavy_drop_rate: 0.5,
            moderate_drop_rate: 0.25,
            no_rows: 30,
        }
    }
}

impl ReklaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReklaError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReklaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let config = ReklaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ReklaConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.reconcile.total_tolerance, Decimal::new(100, 2));
        assert_eq!(parsed.scoring.ocr_fallback, config.scoring.ocr_fallback);
    }

    #[test]
    fn test_file_roundtrip_and_error_kinds() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("config.json");
        ReklaConfig::default().save(&path).unwrap();
        let loaded = ReklaConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pdf.max_pages, 10);

        let missing = ReklaConfig::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ReklaError::Io(_)));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = ReklaConfig::from_file(&bad).unwrap_err();
        assert!(matches!(err, ReklaError::Config(_)));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: ReklaConfig =
            serde_json::from_str(r#"{"scoring": {"ocr_fallback": 40}}"#).unwrap();
        assert_eq!(parsed.scoring.ocr_fallback, 40);
        assert_eq!(parsed.scoring.total_mismatch, 15);
        assert_eq!(parsed.pdf.min_text_length, 50);
    }
}
