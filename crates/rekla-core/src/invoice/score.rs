//! Deterministic confidence scoring.
//!
//! Starts from a baseline of 100 and applies fixed deductions per negative
//! signal, flooring at 0. The schedule lives in [`ScoringConfig`] so it can
//! be audited and tested in isolation; the same signals always yield the
//! same score.

use tracing::debug;

use crate::models::ScoringConfig;

/// Bookkeeping signals collected during a parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreSignals {
    /// The OCR fallback supplied the text lines.
    pub ocr_used: bool,
    /// Header fields that could not be located (0-4).
    pub missing_fields: usize,
    /// A printed total diverged from the row sum beyond tolerance.
    pub total_mismatch: bool,
    /// Candidate row lines seen by the classifier.
    pub lines_total: usize,
    /// Candidate row lines dropped as unparseable.
    pub lines_dropped: usize,
}

/// Confidence scorer with a fixed deduction schedule.
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score a parse from its signals, 0-100.
    pub fn score(&self, signals: &ScoreSignals) -> u8 {
        let mut score: i32 = 100;

        if signals.ocr_used {
            score -= self.config.ocr_fallback as i32;
        }

        score -= (self.config.missing_field as i32) * (signals.missing_fields as i32);

        if signals.total_mismatch {
            score -= self.config.total_mismatch as i32;
        }

        if signals.lines_total > 0 {
            let rows = signals.lines_total - signals.lines_dropped;
            let drop_rate = signals.lines_dropped as f32 / signals.lines_total as f32;

            if rows == 0 {
                score -= self.config.no_rows as i32;
            } else if drop_rate > self.config.heavy_drop_rate {
                score -= self.config.heavy_drop as i32;
            } else if drop_rate > self.config.moderate_drop_rate {
                score -= self.config.moderate_drop as i32;
            }
        } else {
            score -= self.config.no_rows as i32;
        }

        let score = score.clamp(0, 100) as u8;
        debug!(?signals, score, "confidence scored");
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(ScoringConfig::default())
    }

    #[test]
    fn test_clean_parse_scores_full() {
        let signals = ScoreSignals {
            lines_total: 3,
            ..Default::default()
        };
        assert_eq!(scorer().score(&signals), 100);
    }

    #[test]
    fn test_each_signal_deducts() {
        let base = ScoreSignals {
            lines_total: 4,
            ..Default::default()
        };
        let full = scorer().score(&base);

        let ocr = scorer().score(&ScoreSignals {
            ocr_used: true,
            ..base
        });
        assert_eq!(full - ocr, 25);

        let missing = scorer().score(&ScoreSignals {
            missing_fields: 2,
            ..base
        });
        assert_eq!(full - missing, 12);

        let mismatch = scorer().score(&ScoreSignals {
            total_mismatch: true,
            ..base
        });
        assert_eq!(full - mismatch, 15);
    }

    #[test]
    fn test_drop_rate_bands() {
        let moderate = scorer().score(&ScoreSignals {
            lines_total: 10,
            lines_dropped: 3,
            ..Default::default()
        });
        assert_eq!(moderate, 90);

        let heavy = scorer().score(&ScoreSignals {
            lines_total: 10,
            lines_dropped: 6,
            ..Default::default()
        });
        assert_eq!(heavy, 80);
    }

    #[test]
    fn test_no_rows_deduction() {
        let score = scorer().score(&ScoreSignals {
            lines_total: 2,
            lines_dropped: 2,
            ..Default::default()
        });
        assert_eq!(score, 70);
    }

    #[test]
    fn test_floor_at_zero() {
        let score = scorer().score(&ScoreSignals {
            ocr_used: true,
            missing_fields: 4,
            total_mismatch: true,
            lines_total: 2,
            lines_dropped: 2,
        });
        // 100 - 25 - 24 - 15 - 30 = 6, still above the floor
        assert_eq!(score, 6);

        let harsh = ConfidenceScorer::new(ScoringConfig {
            ocr_fallback: 90,
            ..ScoringConfig::default()
        });
        assert_eq!(
            harsh.score(&ScoreSignals {
                ocr_used: true,
                missing_fields: 4,
                lines_total: 0,
                ..Default::default()
            }),
            0
        );
    }

    #[test]
    fn test_deterministic() {
        let signals = ScoreSignals {
            ocr_used: true,
            missing_fields: 1,
            lines_total: 5,
            lines_dropped: 1,
            ..Default::default()
        };
        assert_eq!(scorer().score(&signals), scorer().score(&signals));
    }
}
