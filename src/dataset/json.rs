use crate::dataset::{Annotations, Results};
use crate::error::{Result, VrevalError};
use std::path::Path;

/// Parse an annotation document: `{query: {label: [video, ...]}}`.
pub fn parse_annotations(content: &str) -> Result<Annotations> {
    serde_json::from_str(content)
        .map_err(|e| VrevalError::Parse(format!("annotations JSON: {}", e)))
}

/// Parse a result document: `{query: {candidate: score}}`.
pub fn parse_results(content: &str) -> Result<Results> {
    serde_json::from_str(content).map_err(|e| VrevalError::Parse(format!("results JSON: {}", e)))
}

/// Load the annotation file.
pub fn load_annotations(path: &Path) -> Result<Annotations> {
    let content = std::fs::read_to_string(path)?;
    let annotations = parse_annotations(&content).map_err(|e| with_path(e, path))?;
    log::info!("Loaded annotations for {} queries from {}", annotations.len(), path.display());
    Ok(annotations)
}

/// Load the result file.
pub fn load_results(path: &Path) -> Result<Results> {
    let content = std::fs::read_to_string(path)?;
    let results = parse_results(&content).map_err(|e| with_path(e, path))?;
    log::info!("Loaded results for {} queries from {}", results.len(), path.display());
    Ok(results)
}

/// Write results as pretty-printed JSON, preserving query and candidate order.
pub fn save_results(path: &Path, results: &Results) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, results)?;
    log::info!("Stored results for {} queries in {}", results.len(), path.display());
    Ok(())
}

fn with_path(err: VrevalError, path: &Path) -> VrevalError {
    match err {
        VrevalError::Parse(msg) => VrevalError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_annotations_preserves_order() {
        let json = r#"{
            "q2": {"ND": ["a", "b"], "DS": ["c"]},
            "q1": {"CS": ["d"]}
        }"#;
        let annotations = parse_annotations(json).unwrap();
        let queries: Vec<&str> = annotations.keys().map(String::as_str).collect();
        assert_eq!(queries, vec!["q2", "q1"]);
        let labels: Vec<&str> = annotations["q2"].keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["ND", "DS"]);
        assert_eq!(annotations["q2"]["ND"], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_results_preserves_candidate_order() {
        let json = r#"{"q": {"z": 0.5, "a": 0.5, "m": 0.9}}"#;
        let results = parse_results(json).unwrap();
        let candidates: Vec<&str> = results["q"].keys().map(String::as_str).collect();
        assert_eq!(candidates, vec!["z", "a", "m"]);
        assert!((results["q"]["m"] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_parse_results_accepts_integer_scores() {
        let results = parse_results(r#"{"q": {"a": 1, "b": -1}}"#).unwrap();
        assert_eq!(results["q"]["a"], 1.0);
        assert_eq!(results["q"]["b"], -1.0);
    }

    #[test]
    fn test_parse_results_rejects_wrong_shape() {
        // Results keyed by query must map to objects, not lists
        let err = parse_results(r#"{"q": [0.1, 0.2]}"#).unwrap_err();
        assert!(matches!(err, VrevalError::Parse(_)));
        assert!(err.to_string().contains("results JSON"));

        let err = parse_results(r#"{"q": {"a": "high"}}"#).unwrap_err();
        assert!(matches!(err, VrevalError::Parse(_)));
    }

    #[test]
    fn test_parse_annotations_rejects_wrong_shape() {
        let err = parse_annotations(r#"["q1", "q2"]"#).unwrap_err();
        assert!(matches!(err, VrevalError::Parse(_)));
    }

    #[test]
    fn test_save_then_load_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json");
        let results = parse_results(r#"{"q": {"b": 0.25, "a": 0.75}}"#).unwrap();

        save_results(&path, &results).unwrap();
        let loaded = load_results(&path).unwrap();

        assert_eq!(loaded, results);
        let candidates: Vec<&str> = loaded["q"].keys().map(String::as_str).collect();
        assert_eq!(candidates, vec!["b", "a"]);
    }

    #[test]
    fn test_load_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("annotation.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_annotations(&path).unwrap_err();
        assert!(err.to_string().contains("annotation.json"));
    }
}
