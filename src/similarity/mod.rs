//! Query-vs-dataset similarities from global video features.
//!
//! Produces the `Results` structure consumed by the evaluator: for every
//! query, cosine similarity against each dataset video, keeping only scores
//! above a floor.

pub mod features;

pub use features::FeatureMatrix;

use crate::dataset::{Dataset, Results, ScoreMap, VideoId};
use crate::error::{Result, VrevalError};
use rayon::prelude::*;

/// Compute cosine similarity between two vectors
///
/// # Arguments
///
/// * `a` - First vector
/// * `b` - Second vector (same length as `a`)
///
/// # Returns
///
/// Cosine similarity in [-1, 1], or 0.0 if either vector has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Score every query against every dataset video.
///
/// Feature rows must line up with `dataset` order, so a dataset that dropped
/// repeated ids is rejected. Candidates scoring at or
/// below `min_score` are dropped, as is the query itself. Queries that are not
/// in the dataset are skipped with a warning.
pub fn compute_results(
    features: &FeatureMatrix,
    dataset: &Dataset,
    query_ids: &[VideoId],
    min_score: f32,
) -> Result<Results> {
    if dataset.duplicates() > 0 {
        return Err(VrevalError::InvalidInput(format!(
            "dataset lists {} repeated ids, feature rows cannot be aligned",
            dataset.duplicates()
        )));
    }
    if features.rows() != dataset.len() {
        return Err(VrevalError::InvalidInput(format!(
            "feature matrix has {} rows but the dataset has {} videos",
            features.rows(),
            dataset.len()
        )));
    }

    let queries: Vec<(&VideoId, usize)> = query_ids
        .iter()
        .filter_map(|query| match dataset.index_of(query) {
            Some(row) => Some((query, row)),
            None => {
                log::warn!("Query {} is not in the dataset, no similarities computed", query);
                None
            }
        })
        .collect();

    let scored: Vec<(VideoId, ScoreMap)> = queries
        .into_par_iter()
        .map(|(query, row)| {
            let query_vec = features.row(row);
            let scores: ScoreMap = dataset
                .ids()
                .iter()
                .enumerate()
                .filter(|(candidate_row, _)| *candidate_row != row)
                .filter_map(|(candidate_row, candidate)| {
                    let similarity = cosine_similarity(query_vec, features.row(candidate_row));
                    (similarity > min_score).then(|| (candidate.clone(), f64::from(similarity)))
                })
                .collect();
            (query.clone(), scores)
        })
        .collect();

    log::info!("Computed similarities for {} queries", scored.len());
    Ok(scored.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let similarity = cosine_similarity(&a, &a);
        assert!((similarity - 1.0).abs() < 1e-6, "Identical vectors should have similarity 1.0");
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0, "Zero magnitude vector should return 0.0");
    }

    #[test]
    fn test_cosine_similarity_different_magnitudes() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![2.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    fn fixture() -> (FeatureMatrix, Dataset) {
        let features = FeatureMatrix::from_rows(vec![
            vec![1.0, 0.0],  // q
            vec![1.0, 0.1],  // a: close to q
            vec![0.0, 1.0],  // b: orthogonal
            vec![-1.0, 0.0], // c: opposite
            vec![0.7, 0.7],  // d
        ])
        .unwrap();
        let dataset = Dataset::from_ids(["q", "a", "b", "c", "d"]);
        (features, dataset)
    }

    #[test]
    fn test_compute_results_drops_self_and_non_positive() {
        let (features, dataset) = fixture();
        let results = compute_results(&features, &dataset, &["q".to_string()], 0.0).unwrap();

        let scores = &results["q"];
        let candidates: Vec<&str> = scores.keys().map(String::as_str).collect();
        assert_eq!(candidates, vec!["a", "d"]);
        assert!(scores["a"] > scores["d"]);
    }

    #[test]
    fn test_compute_results_min_score_floor() {
        let (features, dataset) = fixture();
        let results = compute_results(&features, &dataset, &["q".to_string()], 0.9).unwrap();
        let candidates: Vec<&str> = results["q"].keys().map(String::as_str).collect();
        assert_eq!(candidates, vec!["a"]);

        let results = compute_results(&features, &dataset, &["q".to_string()], -2.0).unwrap();
        assert_eq!(results["q"].len(), 4);
    }

    #[test]
    fn test_compute_results_keeps_query_order_and_skips_unknown() {
        let (features, dataset) = fixture();
        let queries = vec!["d".to_string(), "missing".to_string(), "a".to_string()];
        let results = compute_results(&features, &dataset, &queries, 0.0).unwrap();

        let order: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["d", "a"]);
        assert!(!results["a"].contains_key("a"));
    }

    #[test]
    fn test_compute_results_row_count_mismatch() {
        let (features, _) = fixture();
        let dataset = Dataset::from_ids(["q", "a"]);
        let err = compute_results(&features, &dataset, &["q".to_string()], 0.0).unwrap_err();
        assert!(matches!(err, VrevalError::InvalidInput(_)));
    }

    #[test]
    fn test_compute_results_rejects_repeated_ids() {
        // Five feature rows, five raw lines, but only four distinct ids
        let (features, _) = fixture();
        let dataset = Dataset::parse("q\na\nb\na\nd\n");
        assert_eq!(dataset.duplicates(), 1);
        let err = compute_results(&features, &dataset, &["q".to_string()], 0.0).unwrap_err();
        assert!(matches!(err, VrevalError::InvalidInput(msg) if msg.contains("repeated ids")));
    }
}
