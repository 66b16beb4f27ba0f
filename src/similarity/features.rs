use crate::error::{Result, VrevalError};
use std::path::Path;

/// Dense row-major matrix of global video features, one row per dataset video.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl FeatureMatrix {
    /// Build from rows; every row must have the length of the first.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(VrevalError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                    row: i,
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            dim,
        })
    }

    /// Load features from `.json` (array of arrays) or a whitespace-separated
    /// text matrix (one row per line) for any other extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let matrix = if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse_text(&content)
        }
        .map_err(|e| match e {
            VrevalError::Parse(msg) => VrevalError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        log::info!(
            "Loaded {} feature vectors of dimension {} from {}",
            matrix.rows,
            matrix.dim,
            path.display()
        );
        Ok(matrix)
    }

    pub fn parse_json(content: &str) -> Result<Self> {
        let rows: Vec<Vec<f32>> = serde_json::from_str(content)
            .map_err(|e| VrevalError::Parse(format!("feature JSON: {}", e)))?;
        Self::from_rows(rows)
    }

    pub fn parse_text(content: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|v| {
                    v.parse::<f32>().map_err(|e| {
                        VrevalError::Parse(format!(
                            "line {}: bad value {:?}: {}",
                            line_no + 1,
                            v,
                            e
                        ))
                    })
                })
                .collect::<Result<Vec<f32>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}
