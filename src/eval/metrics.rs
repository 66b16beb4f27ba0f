//! Evaluation metrics: Average Precision and the 21-point interpolated PR curve.

use std::collections::HashSet;

/// Number of recall levels on the canonical grid (0.00, 0.05, ..., 1.00).
pub const RECALL_STEPS: usize = 21;

/// Recall levels `k / 20` for k = 0..=20, increasing.
pub fn recall_levels() -> [f64; RECALL_STEPS] {
    std::array::from_fn(|k| k as f64 / (RECALL_STEPS - 1) as f64)
}

/// Interpolated precision at each recall level, ordered by increasing recall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrCurve([f64; RECALL_STEPS]);

impl PrCurve {
    pub fn new(precisions: [f64; RECALL_STEPS]) -> Self {
        Self(precisions)
    }

    pub fn precisions(&self) -> &[f64; RECALL_STEPS] {
        &self.0
    }

    /// (recall, precision) pairs, recall increasing.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        recall_levels().into_iter().zip(self.0.iter().copied())
    }

    /// Elementwise mean. Returns None for an empty slice.
    pub fn mean(curves: &[PrCurve]) -> Option<PrCurve> {
        if curves.is_empty() {
            return None;
        }
        let mut sum = [0.0; RECALL_STEPS];
        for curve in curves {
            for (acc, p) in sum.iter_mut().zip(curve.0.iter()) {
                *acc += p;
            }
        }
        let n = curves.len() as f64;
        Some(PrCurve(sum.map(|s| s / n)))
    }
}

/// One precision/recall pair produced by a score threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub precision: f64,
    pub recall: f64,
}

/// Average Precision of a ranking: the sum of precision at the rank of each
/// relevant hit, divided by the size of the ground truth (so relevant videos
/// that were never ranked contribute zero). Returns 0.0 for an empty ground truth.
pub fn average_precision(ranking: &[(&str, f64)], ground_truth: &HashSet<&str>) -> f64 {
    if ground_truth.is_empty() {
        return 0.0;
    }
    let mut found = 0usize;
    let mut sum = 0.0;
    for (rank, (video, _)) in ranking.iter().enumerate() {
        if ground_truth.contains(video) {
            found += 1;
            sum += found as f64 / (rank + 1) as f64;
        }
    }
    sum / ground_truth.len() as f64
}

/// (relevant, score) per ranked video, padded to cover the whole dataset.
///
/// Relevant videos missing from the ranking are appended as (true, 0.0), then
/// (false, 0.0) entries fill up to `dataset_len`.
pub fn padded_relevance(
    ranking: &[(&str, f64)],
    ground_truth: &HashSet<&str>,
    dataset_len: usize,
) -> Vec<(bool, f64)> {
    let mut items: Vec<(bool, f64)> = ranking
        .iter()
        .map(|(video, score)| (ground_truth.contains(video), *score))
        .collect();
    let hits = items.iter().filter(|(relevant, _)| *relevant).count();
    let missing = ground_truth.len().saturating_sub(hits);
    items.extend(std::iter::repeat((true, 0.0)).take(missing));
    let total = dataset_len.max(items.len());
    items.resize(total, (false, 0.0));
    items
}

/// Operating points as the score threshold sweeps from high to low: one per
/// distinct score, preceded by the (recall 0, precision 1) origin.
///
/// With no relevant items only the origin is returned.
pub fn precision_recall_points(items: &[(bool, f64)]) -> Vec<OperatingPoint> {
    let mut points = vec![OperatingPoint {
        precision: 1.0,
        recall: 0.0,
    }];
    let positives = items.iter().filter(|(relevant, _)| *relevant).count();
    if positives == 0 {
        return points;
    }

    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (mut tp, mut fp) = (0usize, 0usize);
    for (i, &(relevant, score)) in sorted.iter().enumerate() {
        if relevant {
            tp += 1;
        } else {
            fp += 1;
        }
        // Only the last item of a run of equal scores yields a threshold
        let closes_threshold = sorted.get(i + 1).map_or(true, |next| next.1 != score);
        if closes_threshold {
            points.push(OperatingPoint {
                precision: tp as f64 / (tp + fp) as f64,
                recall: tp as f64 / positives as f64,
            });
        }
    }
    points
}

/// Interpolated precision at each recall level: the best precision among
/// operating points whose recall reaches at least that level.
pub fn interpolated_pr_curve(points: &[OperatingPoint]) -> PrCurve {
    let levels = recall_levels();
    let mut curve = [0.0; RECALL_STEPS];
    for point in points {
        for (best, level) in curve.iter_mut().zip(levels.iter()) {
            if point.recall >= *level && point.precision > *best {
                *best = point.precision;
            }
        }
    }
    PrCurve(curve)
}

/// Full per-query PR pipeline: pad, sweep thresholds, interpolate.
pub fn query_pr_curve(
    ranking: &[(&str, f64)],
    ground_truth: &HashSet<&str>,
    dataset_len: usize,
) -> PrCurve {
    let items = padded_relevance(ranking, ground_truth, dataset_len);
    interpolated_pr_curve(&precision_recall_points(&items))
}
