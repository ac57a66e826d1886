//! Cost classification of invoice rows.
//!
//! Each candidate line is parsed into quantity / unit price / total from its
//! trailing numeric tokens, then assigned a cost category from an ordered
//! keyword lexicon. Precedence is fixed and auditable: overtime lines often
//! also contain labor words, and vehicle words co-occur with travel
//! distances, so overtime is checked before labor and travel before vehicle.
//! Ambiguity is resolved by that order alone, not by magnitude or context.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::lines::TextLine;
use crate::models::{CostCategory, LineItem};

use super::rules::amounts::{is_numeric_token, parse_norwegian_amount};

/// Ordered (category, keyword set) lexicon. Evaluated top to bottom; the
/// first category with a keyword hit wins.
const LEXICON: &[(CostCategory, &[&str])] = &[
    (
        CostCategory::Overtime,
        &["overtid", "kveldstillegg", "helgetillegg", "nattillegg"],
    ),
    (
        CostCategory::Labor,
        &[
            "arbeid",
            "timer",
            "time",
            "montering",
            "montør",
            "service",
            "reparasjon",
            "feilsøking",
        ],
    ),
    (
        CostCategory::Travel,
        &[
            "reise",
            "reisetid",
            "kjøring",
            "kjøretid",
            "km",
            "bompenger",
            "diett",
            "sone",
        ],
    ),
    (
        CostCategory::Vehicle,
        &["servicebil", "kjøretøy", "bilkostnad", "bilgodtgjørelse"],
    ),
    (
        CostCategory::Parts,
        &[
            "deler",
            "reservedel",
            "reservedeler",
            "materiell",
            "komponent",
            "pakning",
            "termostat",
            "kompressor",
            "ventil",
            "fordamper",
            "filter",
            "element",
            "rekvisita",
        ],
    ),
];

/// Classify a row description against the lexicon.
///
/// Keywords match whole words only, so "servicebil" never hits the labor
/// keyword "service". Falls back to [`CostCategory::Other`] when no
/// keyword matches.
pub fn classify_description(description: &str) -> CostCategory {
    let lowered = description.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    for (category, keywords) in LEXICON {
        if keywords.iter().any(|kw| words.iter().any(|w| w == kw)) {
            return *category;
        }
    }
    CostCategory::Other
}

/// Rows produced by one classification pass.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedRows {
    /// Parsed rows in document order.
    pub rows: Vec<LineItem>,
    /// Candidate lines seen.
    pub lines_total: usize,
    /// Candidate lines dropped as unparseable.
    pub lines_dropped: usize,
}

/// Heuristic row parser and classifier.
pub struct CostClassifier;

impl CostClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Parse and classify candidate lines, preserving document order.
    ///
    /// Lines without a parseable total are dropped but counted, so the
    /// scorer can penalize a high drop rate.
    pub fn classify(&self, lines: &[&TextLine]) -> ClassifiedRows {
        let mut result = ClassifiedRows {
            lines_total: lines.len(),
            ..Default::default()
        };

        for line in lines {
            match self.parse_row(line) {
                Some(item) => result.rows.push(item),
                None => {
                    trace!(line = %line.raw, "dropped unparseable row");
                    result.lines_dropped += 1;
                }
            }
        }

        debug!(
            rows = result.rows.len(),
            dropped = result.lines_dropped,
            "row classification complete"
        );

        result
    }

    /// Parse one line into a [`LineItem`].
    ///
    /// Numeric-token policy: a trailing run of numeric tokens is read as
    /// one of `[total]`, `[unit_price, total]`, or
    /// `[quantity, unit_price, total]`. A run longer than three keeps its
    /// last three values; the leading extras fold back into the
    /// description.
    fn parse_row(&self, line: &TextLine) -> Option<LineItem> {
        let tokens = &line.tokens;
        if tokens.is_empty() {
            return None;
        }

        // Trailing numeric run
        let mut run_start = tokens.len();
        while run_start > 0 && is_numeric_token(&tokens[run_start - 1]) {
            run_start -= 1;
        }
        let run = &tokens[run_start..];
        if run.is_empty() {
            return None;
        }

        let mut values: Vec<Decimal> = run
            .iter()
            .filter_map(|t| parse_norwegian_amount(t))
            .collect();
        if values.len() != run.len() {
            return None;
        }

        let mut description_tokens: Vec<&str> =
            tokens[..run_start].iter().map(|t| t.as_str()).collect();
        if values.len() > 3 {
            let extra = values.len() - 3;
            for token in &run[..extra] {
                description_tokens.push(token.as_str());
            }
            values.drain(..extra);
        }

        let (quantity, unit_price, total_price) = match values.len() {
            1 => (Decimal::ONE, values[0], values[0]),
            2 => {
                let (unit, total) = (values[0], values[1]);
                let quantity = if unit > Decimal::ZERO {
                    (total / unit).round_dp(2)
                } else {
                    Decimal::ONE
                };
                (quantity, unit, total)
            }
            _ => (values[0], values[1], values[2]),
        };

        let description = description_tokens.join(" ");
        if description.is_empty() {
            // A bare numeric line carries no classifiable content
            return None;
        }

        Some(LineItem {
            line_index: line.index,
            description: description.clone(),
            quantity,
            unit_price,
            total_price,
            category: classify_description(&description),
        })
    }
}

impl Default for CostClassifier {
    fn default() -> Self {
        Self::new()
    }
}
