/*!
 * Job-level worker pool.
 *
 * Jobs share nothing mutable, so many pipelines run at once. Each job is
 * composited on the blocking pool (it is pure CPU work), then handed to the
 * render sink. A failed job is recorded and the rest of the batch carries on.
 */

use futures::stream::{self, StreamExt};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::pipeline::{CaptionPipeline, JobInput, JobReport};
use crate::render::RenderSink;

/// Result of one job in a batch
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// Render job handed off
    Completed { report: JobReport, output: PathBuf },
    /// The job could not be composited or submitted
    Failed { id: String, error: String },
}

impl JobOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Completed { report, .. } => &report.id,
            Self::Failed { id, .. } => id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Outcomes of a batch, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}

/// Runs many jobs through one pipeline
pub struct BatchCompositor {
    pipeline: Arc<CaptionPipeline>,
    sink: Arc<dyn RenderSink>,
    max_concurrent_jobs: usize,
    seed: Option<u64>,
}

impl BatchCompositor {
    /// Create a batch runner; concurrency and seed come from the pipeline's configuration
    pub fn new(pipeline: CaptionPipeline, sink: Arc<dyn RenderSink>) -> Self {
        let config = pipeline.config();
        Self {
            max_concurrent_jobs: config.batch.concurrent_jobs.max(1),
            seed: config.background.seed,
            pipeline: Arc::new(pipeline),
            sink,
        }
    }

    /// Random source for the job at `index`
    ///
    /// Seeded runs derive one generator per job from the seed and the job's
    /// position, so results do not depend on scheduling order.
    fn rng_for(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_os_rng(),
        }
    }

    /// Composite and submit every job
    pub async fn run(
        &self,
        jobs: Vec<JobInput>,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> BatchSummary {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_jobs));
        let total_jobs = jobs.len();
        let processed_jobs = Arc::new(AtomicUsize::new(0));

        let results = stream::iter(jobs.into_iter().enumerate())
            .map(|(job_index, job)| {
                let pipeline = self.pipeline.clone();
                let sink = self.sink.clone();
                let semaphore = semaphore.clone();
                let processed_jobs = processed_jobs.clone();
                let progress_callback = progress_callback.clone();
                let mut rng = self.rng_for(job_index);

                async move {
                    let _permit = semaphore.acquire().await;
                    let start_time = Instant::now();
                    let id = job.id.clone();

                    let composed = tokio::task::spawn_blocking(move || pipeline.run(&job, &mut rng)).await;

                    let outcome = match composed {
                        Ok(Ok((render_job, report))) => match sink.submit(&render_job).await {
                            Ok(output) => JobOutcome::Completed { report, output },
                            Err(e) => JobOutcome::Failed {
                                id: id.clone(),
                                error: format!("{:#}", e),
                            },
                        },
                        Ok(Err(e)) => JobOutcome::Failed {
                            id: id.clone(),
                            error: e.to_string(),
                        },
                        Err(e) => JobOutcome::Failed {
                            id: id.clone(),
                            error: format!("Worker panicked: {}", e),
                        },
                    };

                    match &outcome {
                        JobOutcome::Completed { .. } => {
                            info!("Job {} completed in {:?}", id, start_time.elapsed());
                        }
                        JobOutcome::Failed { error, .. } => {
                            error!("Job {} failed: {}", id, error);
                        }
                    }

                    let current = processed_jobs.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_jobs);

                    (job_index, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_jobs)
            .collect::<Vec<_>>()
            .await;

        // Sort results by job index to maintain input order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(idx, _)| *idx);

        BatchSummary {
            outcomes: sorted_results.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }
}
