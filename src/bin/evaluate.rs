//! Evaluation CLI: mAP and interpolated PR-curve of a result file against the annotations.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vreval::{
    dataset::{load_annotations, load_results},
    eval::{evaluate, render_pr_table, EvalOptions, EvaluationReport, RelevantLabels, RetrievalTask},
    Config, Dataset,
};

/// Compute mAP and the interpolated PR-curve of a retrieval result file.
#[derive(Parser, Debug)]
#[command(name = "evaluate")]
struct Args {
    /// JSON result file: {query: {candidate: similarity}}.
    #[arg(short = 'r', long)]
    result_file: PathBuf,

    /// Comma-separated labels considered relevant (e.g. ND,DS).
    #[arg(short = 'l', long, conflicts_with = "task")]
    relevant_labels: Option<String>,

    /// Retrieval task preset: dsvr (ND,DS), csvr (ND,DS,CS), isvr (ND,DS,CS,IS).
    #[arg(short = 't', long, value_enum)]
    task: Option<RetrievalTask>,

    /// Annotation file of the dataset [default: from config].
    #[arg(short = 'a', long)]
    annotations_file: Option<PathBuf>,

    /// Newline-delimited video ids of the dataset [default: from config].
    #[arg(short = 'd', long)]
    dataset_ids: Option<PathBuf>,

    /// Where the CSV export goes when --save-results is set [default: from config].
    #[arg(short = 'e', long)]
    export_file: Option<PathBuf>,

    /// Store mAP and PR-curve points in the export file.
    #[arg(short = 's', long)]
    save_results: bool,

    /// Show a progress bar instead of per-query AP.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Print the interpolated PR-curve as a table.
    #[arg(short = 'p', long)]
    plot_pr_curve: bool,

    /// Evaluate queries on a single thread.
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let relevant_labels = match (&args.task, &args.relevant_labels) {
        (Some(task), _) => RelevantLabels::from_task(*task),
        (None, Some(list)) => RelevantLabels::parse(list)?,
        (None, None) => config.relevant_labels()?,
    };
    let annotations_file = args
        .annotations_file
        .clone()
        .unwrap_or_else(|| config.dataset.annotations_file.clone());
    let dataset_ids = args
        .dataset_ids
        .clone()
        .unwrap_or_else(|| config.dataset.dataset_ids.clone());
    let export_file = args
        .export_file
        .clone()
        .unwrap_or_else(|| config.export.file.clone());
    let quiet = args.quiet || config.evaluation.quiet;
    let options = EvalOptions {
        verbose: !quiet,
        parallel: config.evaluation.parallel && !args.sequential,
        progress: quiet,
    };

    log::info!("Relevant labels: {}", relevant_labels);

    let result_file = args.result_file.clone();
    let (results, annotations, dataset) = tokio::try_join!(
        tokio::task::spawn_blocking(move || load_results(&result_file)),
        tokio::task::spawn_blocking(move || load_annotations(&annotations_file)),
        tokio::task::spawn_blocking(move || Dataset::load(&dataset_ids)),
    )?;
    let results =
        results.with_context(|| format!("Failed to load {}", args.result_file.display()))?;
    let annotations = annotations.context("Failed to load annotations")?;
    let dataset = dataset.context("Failed to load dataset ids")?;

    let evaluation = tokio::task::spawn_blocking(move || {
        evaluate(&annotations, &results, &relevant_labels, &dataset, options)
    })
    .await??;

    let report = match EvaluationReport::from_evaluation(&evaluation) {
        Ok(report) => report,
        Err(e) => {
            println!("==========================================");
            println!("No evaluable queries ({} skipped).", evaluation.skipped().len());
            return Err(e.into());
        }
    };

    println!("==========================================");
    println!("{}", report.summary_line());
    if report.skipped_queries > 0 {
        println!("Skipped queries: {}", report.skipped_queries);
    }

    if args.plot_pr_curve {
        println!();
        print!("{}", render_pr_table(&report.pr_curve));
    }

    if args.save_results || config.export.save {
        report
            .write_csv(&export_file)
            .with_context(|| format!("Failed to write {}", export_file.display()))?;
    }

    Ok(())
}
