//! Text summary, CSV export, and a plain-text PR table for an evaluation run.

use crate::error::{Result, VrevalError};
use crate::eval::evaluator::Evaluation;
use crate::eval::metrics::PrCurve;
use std::fmt::Write as _;
use std::path::Path;

/// Aggregate figures of a run with at least one evaluated query.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub total_queries: usize,
    pub skipped_queries: usize,
    pub mean_average_precision: f64,
    pub pr_curve: PrCurve,
}

impl EvaluationReport {
    /// Fails with `NoEvaluableQueries` when every query was skipped.
    pub fn from_evaluation(evaluation: &Evaluation) -> Result<Self> {
        let skipped_queries = evaluation.skipped().len();
        let (Some(mean_average_precision), Some(pr_curve)) = (
            evaluation.mean_average_precision(),
            evaluation.mean_pr_curve(),
        ) else {
            return Err(VrevalError::NoEvaluableQueries {
                skipped: skipped_queries,
            });
        };
        Ok(Self {
            total_queries: evaluation.queries().len(),
            skipped_queries,
            mean_average_precision,
            pr_curve,
        })
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Total queries: {}\t\tmAP={:.4}",
            self.total_queries, self.mean_average_precision
        )
    }

    /// `mAP,<v>`, a blank line, then the `Recall,...` and `Precision,...` rows.
    pub fn to_csv(&self) -> String {
        let recall = join_floats(self.pr_curve.points().map(|(r, _)| r));
        let precision = join_floats(self.pr_curve.points().map(|(_, p)| p));
        format!(
            "mAP,{:?}\n\nRecall,{}\nPrecision,{}",
            self.mean_average_precision, recall, precision
        )
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_csv())?;
        log::info!("Stored mAP and PR-curve points in {}", path.display());
        Ok(())
    }
}

fn join_floats(values: impl Iterator<Item = f64>) -> String {
    values
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a PR curve as a two-column table with a bar per recall level.
pub fn render_pr_table(curve: &PrCurve) -> String {
    const BAR_WIDTH: f64 = 40.0;
    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:>9}", "Recall", "Precision");
    let _ = writeln!(out, "{:-<58}", "");
    for (recall, precision) in curve.points() {
        let bar = "#".repeat((precision.clamp(0.0, 1.0) * BAR_WIDTH).round() as usize);
        let _ = writeln!(out, "{:>6.2}  {:>9.4}  {}", recall, precision, bar);
    }
    out
}
