//! Totals aggregation and reconciliation against a printed total.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{LineItem, ReconcileConfig, Totals};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Category subtotals and grand total.
    pub totals: Totals,
    /// Printed total recognized on the document, if any.
    pub explicit_total: Option<Decimal>,
    /// Printed total minus summed rows, when a printed total exists.
    pub delta: Option<Decimal>,
    /// True when the gap exceeds the configured tolerance.
    pub mismatch: bool,
}

/// Aggregates classified rows and cross-checks the printed total.
///
/// A printed total always wins over line-sum arithmetic; a divergence
/// beyond tolerance is flagged for the scorer, never raised as an error,
/// since invoices frequently round differently than their rows.
pub struct TotalsReconciler {
    config: ReconcileConfig,
}

impl TotalsReconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Sum `rows` per category and reconcile against `printed_total`.
    pub fn reconcile(&self, rows: &[LineItem], printed_total: Option<Decimal>) -> Reconciliation {
        let mut totals = Totals::default();
        for row in rows {
            totals.add(row.category, row.total_price);
        }

        let line_sum = totals.category_sum();

        let mut result = Reconciliation {
            explicit_total: printed_total,
            ..Default::default()
        };

        match printed_total {
            Some(printed) => {
                let delta = printed - line_sum;
                totals.grand_total = printed;
                result.mismatch = delta.abs() > self.config.total_tolerance;
                result.delta = Some(delta);

                if result.mismatch {
                    debug!(%printed, %line_sum, %delta, "printed total diverges from row sum");
                }
            }
            None => {
                totals.grand_total = line_sum;
            }
        }

        result.totals = totals;
        result
    }

    /// True when a row's printed total is consistent with
    /// `quantity * unit_price` within the row tolerance.
    pub fn row_consistent(&self, row: &LineItem) -> bool {
        let computed = row.quantity * row.unit_price;
        (computed - row.total_price).abs() <= self.config.row_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostCategory;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(category: CostCategory, total: &str) -> LineItem {
        LineItem {
            line_index: 0,
            description: String::new(),
            quantity: Decimal::ONE,
            unit_price: dec(total),
            total_price: dec(total),
            category,
        }
    }

    #[test]
    fn test_sum_without_printed_total() {
        let rows = vec![
            row(CostCategory::Labor, "325.00"),
            row(CostCategory::Parts, "248.00"),
        ];
        let result = TotalsReconciler::new(ReconcileConfig::default()).reconcile(&rows, None);

        assert_eq!(result.totals.work_cost, dec("325.00"));
        assert_eq!(result.totals.parts_cost, dec("248.00"));
        assert_eq!(result.totals.grand_total, dec("573.00"));
        assert!(!result.mismatch);
        assert_eq!(result.delta, None);
    }

    #[test]
    fn test_printed_total_within_tolerance() {
        let rows = vec![
            row(CostCategory::Labor, "1950.00"),
            row(CostCategory::Parts, "9647.30"),
        ];
        let result = TotalsReconciler::new(ReconcileConfig::default())
            .reconcile(&rows, Some(dec("11597.00")));

        // Printed total wins even though the sum is 11597.30
        assert_eq!(result.totals.grand_total, dec("11597.00"));
        assert_eq!(result.delta, Some(dec("-0.30")));
        assert!(!result.mismatch);
    }

    #[test]
    fn test_printed_total_beyond_tolerance_flagged() {
        let rows = vec![row(CostCategory::Labor, "1000.00")];
        let result = TotalsReconciler::new(ReconcileConfig::default())
            .reconcile(&rows, Some(dec("1200.00")));

        assert_eq!(result.totals.grand_total, dec("1200.00"));
        assert!(result.mismatch);
        assert_eq!(result.delta, Some(dec("200.00")));
    }

    #[test]
    fn test_row_consistency() {
        let reconciler = TotalsReconciler::new(ReconcileConfig::default());

        let mut item = row(CostCategory::Labor, "1300.00");
        item.quantity = dec("2.0");
        item.unit_price = dec("650.00");
        assert!(reconciler.row_consistent(&item));

        item.unit_price = dec("600.00");
        assert!(!reconciler.row_consistent(&item));
    }
}
