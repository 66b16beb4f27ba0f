pub mod config;
pub mod error;
pub mod dataset;
pub mod eval;
pub mod similarity;

pub use config::Config;
pub use error::{Result, VrevalError};
pub use dataset::{Annotations, Dataset, Results, VideoId};
pub use eval::{evaluate, EvalOptions, Evaluation, EvaluationReport, PrCurve, RelevantLabels};
