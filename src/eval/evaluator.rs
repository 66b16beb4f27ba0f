//! The FIVR evaluation process: per-query AP and interpolated PR curves,
//! folded into mAP and a mean PR curve.

use crate::dataset::{Annotations, Dataset, LabelMap, Results, VideoId};
use crate::error::Result;
use crate::eval::ground_truth::{query_ground_truth, rank_candidates, RelevantLabels};
use crate::eval::metrics::{average_precision, query_pr_curve, PrCurve};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use std::fmt;

/// Knobs for an evaluation run.
#[derive(Debug, Clone, Copy)]
pub struct EvalOptions {
    /// Log a `Query:<id> AP=<ap>` line per evaluated query.
    pub verbose: bool,
    /// Evaluate queries on the rayon pool.
    pub parallel: bool,
    /// Show a progress bar ticking once per query.
    pub progress: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            parallel: true,
            progress: false,
        }
    }
}

/// Why a query was left out of the aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingResults,
    NotInDataset,
    EmptyGroundTruth,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingResults => "is missing from the result file",
            SkipReason::NotInDataset => "is not in the dataset",
            SkipReason::EmptyGroundTruth => "has an empty annotation set",
        };
        f.write_str(text)
    }
}

/// Per-query outcome for an evaluated query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEvaluation {
    pub query: VideoId,
    pub average_precision: f64,
    pub pr_curve: PrCurve,
    /// Size of the query's ground truth.
    pub relevant: usize,
    /// Number of admissible candidates that were ranked.
    pub ranked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedQuery {
    pub query: VideoId,
    pub reason: SkipReason,
}

/// Everything an evaluation run produced, in annotation order.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    queries: Vec<QueryEvaluation>,
    skipped: Vec<SkippedQuery>,
}

impl Evaluation {
    pub fn queries(&self) -> &[QueryEvaluation] {
        &self.queries
    }

    pub fn skipped(&self) -> &[SkippedQuery] {
        &self.skipped
    }

    /// One AP per evaluated query.
    pub fn ap_list(&self) -> Vec<f64> {
        self.queries.iter().map(|q| q.average_precision).collect()
    }

    /// mAP over evaluated queries; None if every query was skipped.
    pub fn mean_average_precision(&self) -> Option<f64> {
        if self.queries.is_empty() {
            return None;
        }
        let sum: f64 = self.queries.iter().map(|q| q.average_precision).sum();
        Some(sum / self.queries.len() as f64)
    }

    /// Elementwise mean of the per-query PR curves; None if every query was skipped.
    pub fn mean_pr_curve(&self) -> Option<PrCurve> {
        let curves: Vec<PrCurve> = self.queries.iter().map(|q| q.pr_curve).collect();
        PrCurve::mean(&curves)
    }
}

enum Outcome {
    Evaluated(QueryEvaluation),
    Skipped(SkippedQuery),
}

/// Evaluate every annotated query against its similarity results.
///
/// Queries without results, outside the dataset, or with no relevant video in
/// the dataset are skipped with a warning. A non-finite score on an admissible
/// candidate aborts the run.
pub fn evaluate(
    annotations: &Annotations,
    results: &Results,
    relevant_labels: &RelevantLabels,
    dataset: &Dataset,
    options: EvalOptions,
) -> Result<Evaluation> {
    let run = |(query, labels): (&VideoId, &LabelMap)| {
        evaluate_query(query, labels, results, relevant_labels, dataset)
    };
    let bar = progress_bar(annotations.len(), options.progress);
    let outcomes: Result<Vec<Outcome>> = if options.parallel {
        let entries: Vec<(&VideoId, &LabelMap)> = annotations.iter().collect();
        entries
            .into_par_iter()
            .progress_with(bar.clone())
            .map(run)
            .collect()
    } else {
        annotations
            .iter()
            .progress_with(bar.clone())
            .map(run)
            .collect()
    };
    bar.finish_and_clear();
    let outcomes = outcomes?;

    // Logged after the join so output order matches annotation order
    let mut evaluation = Evaluation::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Evaluated(q) => {
                if options.verbose {
                    log::info!("Query:{}\t\tAP={:.4}", q.query, q.average_precision);
                }
                evaluation.queries.push(q);
            }
            Outcome::Skipped(s) => {
                log::warn!("Query {} {}", s.query, s.reason);
                evaluation.skipped.push(s);
            }
        }
    }

    log::debug!(
        "Evaluated {} queries, skipped {}",
        evaluation.queries.len(),
        evaluation.skipped.len()
    );
    Ok(evaluation)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Queries");
    bar
}

fn evaluate_query(
    query: &VideoId,
    labels: &LabelMap,
    results: &Results,
    relevant_labels: &RelevantLabels,
    dataset: &Dataset,
) -> Result<Outcome> {
    let skip = |reason| {
        Ok(Outcome::Skipped(SkippedQuery {
            query: query.clone(),
            reason,
        }))
    };

    let Some(scores) = results.get(query) else {
        return skip(SkipReason::MissingResults);
    };
    if !dataset.contains(query) {
        return skip(SkipReason::NotInDataset);
    }
    let ground_truth = query_ground_truth(labels, relevant_labels, dataset);
    if ground_truth.is_empty() {
        return skip(SkipReason::EmptyGroundTruth);
    }

    let ranking = rank_candidates(query, scores, dataset)?;
    Ok(Outcome::Evaluated(QueryEvaluation {
        query: query.clone(),
        average_precision: average_precision(&ranking, &ground_truth),
        pr_curve: query_pr_curve(&ranking, &ground_truth, dataset.len()),
        relevant: ground_truth.len(),
        ranked: ranking.len(),
    }))
}
