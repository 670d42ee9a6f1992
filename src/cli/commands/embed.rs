//! Implementation of the `fooddb embed` command.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::AppContext;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::EmbeddingPipeline;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} embedded (ETA: {eta})";

#[derive(Args)]
pub struct EmbedArgs {
    /// Records pulled from the store per round
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Records per embedding API call
    #[arg(long)]
    pub api_batch_size: Option<usize>,

    /// Number of concurrent workers (1 = sequential)
    #[arg(long, short = 'p')]
    pub parallel: Option<usize>,

    /// Maximum execution time in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Embedding model to use
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn execute(args: EmbedArgs, mut config: Config, json: bool) -> Result<()> {
    if let Some(batch_size) = args.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(api_batch_size) = args.api_batch_size {
        config.pipeline.api_batch_size = api_batch_size;
    }
    if let Some(parallel) = args.parallel {
        config.pipeline.parallelism = parallel;
    }
    if let Some(timeout) = args.timeout {
        config.pipeline.timeout_secs = timeout;
    }
    if let Some(model) = args.model {
        config.embedding.model = model;
    }
    ConfigLoader::validate(&config)?;

    let ctx = AppContext::build(&config).await?;

    let mut pipeline = EmbeddingPipeline::new(
        ctx.records.clone(),
        ctx.index.clone(),
        ctx.provider.clone(),
        config.pipeline.clone(),
    );

    let bar = if json {
        None
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .expect("valid progress template")
                .progress_chars("█▓▒░ "),
        );
        Some(bar)
    };

    if let Some(bar) = bar.clone() {
        pipeline = pipeline.with_progress(move |progress| {
            if bar.length() == Some(0) {
                bar.set_length(progress.total_candidates);
            }
            bar.set_position(progress.embedded + progress.failed);
        });
    }

    let report = pipeline.run().await.context("Embedding pipeline failed")?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Embedded {} of {} candidate records in {:.2}s ({} failed, {} skipped)",
            report.embedded,
            report.total_candidates,
            report.elapsed.as_secs_f64(),
            report.failed,
            report.skipped,
        );
        if report.deadline_hit {
            println!(
                "Deadline reached; {} records remain and will be picked up by the next run",
                report.remaining()
            );
        }
    }

    Ok(())
}
