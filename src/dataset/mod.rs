//! Evaluation inputs: the dataset universe, query annotations, and similarity results.

pub mod ids;
pub mod json;

pub use ids::Dataset;
pub use json::{load_annotations, load_results, parse_annotations, parse_results, save_results};

use indexmap::IndexMap;

/// Opaque video identifier (e.g. a YouTube id).
pub type VideoId = String;

/// Label tag -> videos judged under that label, for a single query.
pub type LabelMap = IndexMap<String, Vec<VideoId>>;

/// Query -> label map, in file order.
pub type Annotations = IndexMap<VideoId, LabelMap>;

/// Candidate -> similarity score, in file order (the tie-break order).
pub type ScoreMap = IndexMap<VideoId, f64>;

/// Query -> candidate scores, in file order.
pub type Results = IndexMap<VideoId, ScoreMap>;
