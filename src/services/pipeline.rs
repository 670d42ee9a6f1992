//! Batch embedding pipeline.
//!
//! Orchestrates embedding generation for every record missing an
//! embedding, within a concurrency and wall-clock budget. Work proceeds
//! in rounds: a round pulls up to `batch_size` candidates, partitions
//! them into sub-batches of `api_batch_size`, and dispatches those to a
//! bounded pool of `parallelism` workers. Each worker performs one
//! embedding API call followed by one transactional bulk insert, so
//! every completed sub-batch is durable on its own.
//!
//! The deadline is cooperative: it is checked before a sub-batch starts
//! and passed into the embedding client so retry backoffs cannot sleep
//! past it, but in-flight calls always finish on their own terms.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    FoodRecord, PipelineConfig, PipelineProgress, PipelineReport, RecordEmbedding,
};
use crate::domain::ports::{EmbeddingProvider, RecordSource, VectorIndex};

type ProgressFn = dyn Fn(PipelineProgress) + Send + Sync;

/// Result of one sub-batch worker.
enum SubBatchOutcome {
    /// Embedded and committed this many records
    Embedded(u64),
    /// These records failed after the client's retries were exhausted
    Failed(Vec<i64>),
    /// Deadline expired before dispatch; records were not attempted
    Skipped(u64),
}

/// End-to-end embedding generation over the missing-embedding set.
pub struct EmbeddingPipeline {
    records: Arc<dyn RecordSource>,
    index: Arc<dyn VectorIndex>,
    provider: Arc<dyn EmbeddingProvider>,
    config: PipelineConfig,
    progress: Option<Arc<ProgressFn>>,
}

impl EmbeddingPipeline {
    pub fn new(
        records: Arc<dyn RecordSource>,
        index: Arc<dyn VectorIndex>,
        provider: Arc<dyn EmbeddingProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            records,
            index,
            provider,
            config,
            progress: None,
        }
    }

    /// Register a callback invoked after every completed round, in
    /// addition to the tracing events the pipeline always emits.
    pub fn with_progress(mut self, f: impl Fn(PipelineProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    fn validate_config(&self) -> DomainResult<()> {
        if self.config.batch_size == 0 {
            return Err(DomainError::ValidationFailed(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.config.api_batch_size == 0 {
            return Err(DomainError::ValidationFailed(
                "api_batch_size must be at least 1".to_string(),
            ));
        }
        if self.config.api_batch_size > self.provider.max_batch_size() {
            return Err(DomainError::ValidationFailed(format!(
                "api_batch_size {} exceeds the embedding client maximum of {}",
                self.config.api_batch_size,
                self.provider.max_batch_size()
            )));
        }
        if self.config.parallelism == 0 {
            return Err(DomainError::ValidationFailed(
                "parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Run the pipeline until all candidates are processed or the
    /// deadline elapses.
    ///
    /// Re-running after a partial or failed run is always safe: only
    /// records still missing an embedding are selected, so completed
    /// work is never redone. Records whose sub-batch failed are excluded
    /// from re-selection for the remainder of this run and become
    /// candidates again on the next invocation.
    pub async fn run(&self) -> DomainResult<PipelineReport> {
        self.validate_config()?;

        // Schema/dimension disagreements surface here, before any work.
        self.index.ensure_schema(self.provider.dimension()).await?;

        let start = Instant::now();
        let deadline = start + Duration::from_secs(self.config.timeout_secs);

        let total_candidates = self.records.count_missing().await?;
        if total_candidates == 0 {
            info!("no records missing embeddings");
            return Ok(PipelineReport {
                total_candidates: 0,
                embedded: 0,
                failed: 0,
                skipped: 0,
                deadline_hit: false,
                elapsed: start.elapsed(),
            });
        }

        info!(
            total_candidates,
            batch_size = self.config.batch_size,
            api_batch_size = self.config.api_batch_size,
            parallelism = self.config.parallelism,
            timeout_secs = self.config.timeout_secs,
            model = self.provider.model(),
            "starting embedding pipeline"
        );

        let mut embedded: u64 = 0;
        let mut failed: u64 = 0;
        let mut skipped: u64 = 0;
        let mut deadline_hit = false;
        let mut failed_ids: HashSet<i64> = HashSet::new();

        loop {
            if Instant::now() >= deadline {
                deadline_hit = true;
                break;
            }

            // Over-fetch by the failed count so in-run failures cannot
            // mask fresh candidates sorting after them.
            let limit = self.config.batch_size.saturating_add(failed_ids.len() as u32);
            let mut candidates = self.records.candidates_missing_embedding(limit).await?;
            candidates.retain(|r| !failed_ids.contains(&r.fdc_id));
            candidates.truncate(self.config.batch_size as usize);

            if candidates.is_empty() {
                break;
            }

            let sub_batches: Vec<Vec<FoodRecord>> = candidates
                .chunks(self.config.api_batch_size)
                .map(<[FoodRecord]>::to_vec)
                .collect();

            debug!(
                round_records = candidates.len(),
                sub_batches = sub_batches.len(),
                "dispatching round"
            );

            let outcomes: Vec<DomainResult<SubBatchOutcome>> =
                stream::iter(sub_batches.into_iter().map(|sb| self.process_sub_batch(sb, deadline)))
                    .buffer_unordered(self.config.parallelism)
                    .collect()
                    .await;

            for outcome in outcomes {
                match outcome {
                    Ok(SubBatchOutcome::Embedded(n)) => embedded += n,
                    Ok(SubBatchOutcome::Failed(ids)) => {
                        failed += ids.len() as u64;
                        failed_ids.extend(ids);
                    }
                    Ok(SubBatchOutcome::Skipped(n)) => {
                        skipped += n;
                        deadline_hit = true;
                    }
                    Err(err) => return Err(err),
                }
            }

            let progress = PipelineProgress {
                total_candidates,
                embedded,
                failed,
            };
            info!(
                embedded,
                failed,
                remaining = progress.remaining(),
                elapsed_secs = start.elapsed().as_secs(),
                "round complete"
            );
            if let Some(callback) = &self.progress {
                callback(progress);
            }

            if deadline_hit {
                break;
            }
        }

        let report = PipelineReport {
            total_candidates,
            embedded,
            failed,
            skipped,
            deadline_hit,
            elapsed: start.elapsed(),
        };

        if deadline_hit {
            warn!(
                embedded = report.embedded,
                failed = report.failed,
                remaining = report.remaining(),
                "deadline reached, stopping with partial completion"
            );
        } else {
            info!(
                embedded = report.embedded,
                failed = report.failed,
                elapsed_secs = report.elapsed.as_secs(),
                "embedding pipeline complete"
            );
        }

        Ok(report)
    }

    /// One worker's unit of work: a single embedding API call followed
    /// by a single transactional insert.
    ///
    /// Contained failures are logged and reported as `Failed`; only
    /// fatal errors (schema or dimension disagreement) propagate and
    /// abort the run.
    async fn process_sub_batch(
        &self,
        sub_batch: Vec<FoodRecord>,
        deadline: Instant,
    ) -> DomainResult<SubBatchOutcome> {
        if Instant::now() >= deadline {
            debug!(records = sub_batch.len(), "deadline reached, sub-batch not dispatched");
            return Ok(SubBatchOutcome::Skipped(sub_batch.len() as u64));
        }

        let ids: Vec<i64> = sub_batch.iter().map(|r| r.fdc_id).collect();
        let texts: Vec<String> = sub_batch.iter().map(|r| r.description.clone()).collect();

        let api_start = Instant::now();
        let vectors = match self.provider.embed_batch(&texts, Some(deadline)).await {
            Ok(vectors) => vectors,
            Err(err) if err.is_fatal() => return Err(err),
            Err(DomainError::DeadlineExceeded) => {
                debug!(records = ids.len(), "deadline cut retry backoff short, sub-batch not completed");
                return Ok(SubBatchOutcome::Skipped(ids.len() as u64));
            }
            Err(err) => {
                warn!(
                    record_ids = ?ids,
                    error = %err,
                    "sub-batch embedding failed, records stay eligible for the next run"
                );
                return Ok(SubBatchOutcome::Failed(ids));
            }
        };
        debug!(
            records = ids.len(),
            api_ms = api_start.elapsed().as_millis() as u64,
            "embedding call complete"
        );

        // Positional zip: the client guarantees vectors[i] embeds texts[i].
        let rows: Vec<RecordEmbedding> = sub_batch
            .iter()
            .zip(vectors)
            .map(|(record, vector)| {
                RecordEmbedding::new(record.fdc_id, vector, self.provider.model())
            })
            .collect();

        match self.index.bulk_insert(&rows).await {
            Ok(()) => Ok(SubBatchOutcome::Embedded(rows.len() as u64)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!(
                    record_ids = ?ids,
                    error = %err,
                    "sub-batch insert rolled back, records stay eligible for the next run"
                );
                Ok(SubBatchOutcome::Failed(ids))
            }
        }
    }
}
