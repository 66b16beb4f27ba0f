//! Similarity CLI: cosine similarities of every annotated query against the dataset.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vreval::{
    dataset::{load_annotations, save_results},
    similarity::{compute_results, FeatureMatrix},
    Config, Dataset, VideoId,
};

/// Calculate query-vs-dataset similarities from global video features.
#[derive(Parser, Debug)]
#[command(name = "similarities")]
struct Args {
    /// Feature vectors, one row per dataset video in dataset-id order
    /// (.json array of arrays, or whitespace-separated text).
    #[arg(short = 'f', long)]
    feature_file: PathBuf,

    /// Where the JSON result file is written.
    #[arg(short = 'r', long)]
    result_file: PathBuf,

    /// Annotation file; its keys are the queries [default: from config].
    #[arg(short = 'a', long)]
    annotations_file: Option<PathBuf>,

    /// Newline-delimited video ids of the dataset [default: from config].
    #[arg(short = 'd', long)]
    dataset_ids: Option<PathBuf>,

    /// Keep only candidates scoring above this [default: from config].
    #[arg(long, allow_hyphen_values = true)]
    min_score: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let annotations_file = args
        .annotations_file
        .unwrap_or_else(|| config.dataset.annotations_file.clone());
    let dataset_ids = args
        .dataset_ids
        .unwrap_or_else(|| config.dataset.dataset_ids.clone());
    let min_score = args.min_score.unwrap_or(config.similarity.min_score);
    if !min_score.is_finite() {
        anyhow::bail!("--min-score must be a finite number");
    }

    let feature_file = args.feature_file.clone();
    let (features, annotations, dataset) = tokio::try_join!(
        tokio::task::spawn_blocking(move || FeatureMatrix::load(&feature_file)),
        tokio::task::spawn_blocking(move || load_annotations(&annotations_file)),
        tokio::task::spawn_blocking(move || Dataset::load(&dataset_ids)),
    )?;
    let features = features
        .with_context(|| format!("Failed to load features from {}", args.feature_file.display()))?;
    let query_ids: Vec<VideoId> = annotations
        .context("Failed to load annotations")?
        .into_keys()
        .collect();
    let dataset = dataset.context("Failed to load dataset ids")?;

    let result_file = args.result_file;
    tokio::task::spawn_blocking(move || {
        let results = compute_results(&features, &dataset, &query_ids, min_score)?;
        println!("Store results in file: {}", result_file.display());
        save_results(&result_file, &results)
    })
    .await??;

    Ok(())
}
