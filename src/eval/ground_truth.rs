//! Relevant-label selection, per-query ground truth, and candidate ranking.

use crate::dataset::{Dataset, LabelMap, ScoreMap};
use crate::error::{Result, VrevalError};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// FIVR retrieval task; each one widens the set of labels counted as relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RetrievalTask {
    /// Duplicate Scene Video Retrieval: ND, DS
    Dsvr,
    /// Complementary Scene Video Retrieval: ND, DS, CS
    Csvr,
    /// Incident Scene Video Retrieval: ND, DS, CS, IS
    Isvr,
}

impl RetrievalTask {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            RetrievalTask::Dsvr => &["ND", "DS"],
            RetrievalTask::Csvr => &["ND", "DS", "CS"],
            RetrievalTask::Isvr => &["ND", "DS", "CS", "IS"],
        }
    }
}

/// Label tags that count as relevant for a run. Never empty, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantLabels(Vec<String>);

impl RelevantLabels {
    /// Build from tags, trimming each and dropping blanks and repeats.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = Vec::new();
        for label in labels {
            let tag = label.as_ref().trim();
            if tag.is_empty() || tags.iter().any(|t| t == tag) {
                continue;
            }
            tags.push(tag.to_string());
        }
        if tags.is_empty() {
            return Err(VrevalError::InvalidInput(
                "relevant label set must not be empty".to_string(),
            ));
        }
        Ok(Self(tags))
    }

    /// Parse a comma-separated tag list such as `ND,DS`.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    pub fn from_task(task: RetrievalTask) -> Self {
        Self(task.labels().iter().map(|l| l.to_string()).collect())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromStr for RelevantLabels {
    type Err = VrevalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RelevantLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Videos relevant to a query: the union of every relevant label's list,
/// restricted to the dataset.
pub fn query_ground_truth<'a>(
    labels: &'a LabelMap,
    relevant: &RelevantLabels,
    dataset: &Dataset,
) -> HashSet<&'a str> {
    relevant
        .iter()
        .filter_map(move |label| labels.get(label))
        .flatten()
        .map(String::as_str)
        .filter(|video| dataset.contains(video))
        .collect()
}

/// Admissible candidates (in the dataset, not the query) sorted by score,
/// highest first. The sort is stable, so equal scores keep score-map order.
///
/// Fails on a non-finite score for an admissible candidate.
pub fn rank_candidates<'a>(
    query: &str,
    scores: &'a ScoreMap,
    dataset: &Dataset,
) -> Result<Vec<(&'a str, f64)>> {
    let mut ranking = Vec::with_capacity(scores.len());
    for (candidate, &score) in scores {
        if candidate == query || !dataset.contains(candidate) {
            continue;
        }
        if !score.is_finite() {
            return Err(VrevalError::InvalidInput(format!(
                "non-finite score {} for candidate {} of query {}",
                score, candidate, query
            )));
        }
        ranking.push((candidate.as_str(), score));
    }
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranking)
}
