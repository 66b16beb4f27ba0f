//! Retrieval evaluation: ground truth, AP/mAP, interpolated PR curves, and reporting.

pub mod evaluator;
pub mod ground_truth;
pub mod metrics;
pub mod report;

pub use evaluator::{evaluate, EvalOptions, Evaluation, QueryEvaluation, SkipReason, SkippedQuery};
pub use ground_truth::{query_ground_truth, rank_candidates, RelevantLabels, RetrievalTask};
pub use metrics::{average_precision, recall_levels, PrCurve, RECALL_STEPS};
pub use report::{render_pr_table, EvaluationReport};
