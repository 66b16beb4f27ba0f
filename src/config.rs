use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::eval::RelevantLabels;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
}

/// Input file locations
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_annotations_file")]
    pub annotations_file: PathBuf,
    /// Newline-delimited video ids; order aligns feature matrix rows.
    #[serde(default = "default_dataset_ids")]
    pub dataset_ids: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            annotations_file: default_annotations_file(),
            dataset_ids: default_dataset_ids(),
        }
    }
}

/// Evaluation behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Label tags counted as relevant (DSVR by default).
    #[serde(default = "default_relevant_labels")]
    pub relevant_labels: Vec<String>,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            relevant_labels: default_relevant_labels(),
            quiet: false,
            parallel: default_parallel(),
        }
    }
}

/// CSV export of mAP and PR-curve points
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file")]
    pub file: PathBuf,
    #[serde(default)]
    pub save: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file: default_export_file(),
            save: false,
        }
    }
}

/// Similarity producer settings
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityConfig {
    /// Candidates scoring at or below this are left out of the result file.
    #[serde(default)]
    pub min_score: f32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

fn default_annotations_file() -> PathBuf {
    PathBuf::from("dataset/annotation.json")
}

fn default_dataset_ids() -> PathBuf {
    PathBuf::from("dataset/youtube_ids.txt")
}

fn default_relevant_labels() -> Vec<String> {
    vec!["ND".to_string(), "DS".to_string()]
}

fn default_parallel() -> bool {
    true
}

fn default_export_file() -> PathBuf {
    PathBuf::from("mAP_PRcurve_points.csv")
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path in the VREVAL_CONFIG environment variable (must exist)
    /// 2. ./vreval.toml in the current directory (defaults if absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        match std::env::var("VREVAL_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let path = PathBuf::from("vreval.toml");
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    log::debug!("No vreval.toml found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read, parse, and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        self.relevant_labels()
            .context("evaluation.relevant_labels must name at least one label")?;

        let min_score = self.similarity.min_score;
        if !min_score.is_finite() || !(-1.0..=1.0).contains(&min_score) {
            anyhow::bail!("similarity.min_score must be between -1.0 and 1.0");
        }

        if self.export.file.as_os_str().is_empty() {
            anyhow::bail!("export.file must not be empty");
        }

        Ok(())
    }

    pub fn relevant_labels(&self) -> crate::Result<RelevantLabels> {
        RelevantLabels::new(&self.evaluation.relevant_labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(config_path: Option<&Path>, f: impl FnOnce()) {
        let original = std::env::var("VREVAL_CONFIG").ok();
        match config_path {
            Some(p) => std::env::set_var("VREVAL_CONFIG", p),
            None => std::env::remove_var("VREVAL_CONFIG"),
        }
        f();
        std::env::remove_var("VREVAL_CONFIG");
        if let Some(val) = original {
            std::env::set_var("VREVAL_CONFIG", val);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dataset.annotations_file, PathBuf::from("dataset/annotation.json"));
        assert_eq!(config.dataset.dataset_ids, PathBuf::from("dataset/youtube_ids.txt"));
        assert_eq!(config.export.file, PathBuf::from("mAP_PRcurve_points.csv"));
        assert_eq!(config.relevant_labels().unwrap().to_string(), "ND,DS");
        assert!(!config.export.save);
        assert!(config.evaluation.parallel);
        assert_eq!(config.similarity.min_score, 0.0);
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(
            &config_path,
            r#"
[dataset]
dataset_ids = "ids.txt"

[evaluation]
relevant_labels = ["ND", "DS", "CS", "IS"]
quiet = true

[export]
save = true
"#,
        )
        .unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.dataset.dataset_ids, PathBuf::from("ids.txt"));
            assert_eq!(config.dataset.annotations_file, PathBuf::from("dataset/annotation.json"));
            assert_eq!(config.relevant_labels().unwrap().to_string(), "ND,DS,CS,IS");
            assert!(config.evaluation.quiet);
            assert!(config.export.save);
        });
    }

    #[test]
    fn test_config_defaults_without_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.relevant_labels().unwrap().to_string(), "ND,DS");
        });
    }

    #[test]
    fn test_config_picks_up_local_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("vreval.toml"),
            "[similarity]\nmin_score = 0.25\n",
        )
        .unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.similarity.min_score, 0.25);
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(Some(Path::new("nonexistent.toml")), || {
            let config = Config::load();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("nonexistent.toml"));
        });
    }

    #[test]
    fn test_config_rejects_empty_labels() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[evaluation]\nrelevant_labels = []\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_min_score() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[similarity]\nmin_score = 1.5\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("min_score"));
    }

    #[test]
    fn test_config_rejects_unknown_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[plotting]\nenabled = true\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
