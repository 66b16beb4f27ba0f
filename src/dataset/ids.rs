use crate::dataset::VideoId;
use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// The universe of videos eligible to be retrieved and counted.
///
/// Keeps file order so a feature matrix can be aligned row-by-row; the
/// evaluator itself only uses membership and `len()`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    ids: Vec<VideoId>,
    index: HashMap<VideoId, usize>,
    duplicates: usize,
}

impl Dataset {
    /// Build a dataset from ids. Ids are trimmed, blank entries skipped and
    /// repeats dropped after the first occurrence.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dataset = Dataset::default();
        for raw in ids {
            let id = raw.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            if dataset.index.contains_key(id) {
                log::warn!("Duplicate video id {} in dataset, keeping the first", id);
                dataset.duplicates += 1;
                continue;
            }
            dataset.index.insert(id.to_string(), dataset.ids.len());
            dataset.ids.push(id.to_string());
        }
        dataset
    }

    /// Parse a newline-delimited id list.
    pub fn parse(content: &str) -> Self {
        Self::from_ids(content.lines())
    }

    /// Load a newline-delimited id list from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::parse(&content);
        if dataset.duplicates > 0 {
            log::warn!(
                "Dropped {} duplicate ids from {}",
                dataset.duplicates,
                path.display()
            );
        }
        log::info!("Loaded {} dataset ids from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Row position of `id` in file order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[VideoId] {
        &self.ids
    }

    /// Number of repeated ids dropped while building.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
