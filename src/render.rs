/*!
 * Hand-off to the rasterizer.
 *
 * Pixel compositing and encoding live outside this crate. A `RenderSink`
 * receives each finished render job; the JSON sink writes it next to where
 * the final video belongs so an external renderer can pick it up.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::compositor::RenderJob;
use crate::file_utils::FileManager;

/// Receiver of finished render jobs
///
/// Implementations must not be called before composition completes; nothing
/// outside the engine is touched until `submit`.
#[async_trait]
pub trait RenderSink: Send + Sync + Debug {
    /// Accept one render job
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Location of the written job, or a handle describing it
    async fn submit(&self, job: &RenderJob) -> Result<PathBuf>;

    /// Whether output for `id` already exists
    fn exists(&self, id: &str) -> bool;
}

/// Writes `<dir>/<id>.render.json`
#[derive(Debug, Clone)]
pub struct JsonRenderSink {
    output_dir: PathBuf,
}

impl JsonRenderSink {
    /// Create a sink writing into `output_dir`
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Target path for a job id
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.render.json", id))
    }
}

#[async_trait]
impl RenderSink for JsonRenderSink {
    async fn submit(&self, job: &RenderJob) -> Result<PathBuf> {
        let path = self.path_for(&job.id);
        let json = serde_json::to_string_pretty(job).context("Failed to serialize render job")?;

        FileManager::ensure_dir(&self.output_dir)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write render job: {}", path.display()))?;

        info!("Wrote render job {} ({} layers)", path.display(), job.layers.len());
        Ok(path)
    }

    fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }
}

/// Keeps submitted jobs in memory
#[derive(Debug, Default)]
pub struct MemoryRenderSink {
    jobs: Mutex<Vec<RenderJob>>,
}

impl MemoryRenderSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted so far
    pub fn jobs(&self) -> Vec<RenderJob> {
        self.jobs.lock().map(|jobs| jobs.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RenderSink for MemoryRenderSink {
    async fn submit(&self, job: &RenderJob) -> Result<PathBuf> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Render sink lock poisoned"))?;
        jobs.push(job.clone());
        Ok(PathBuf::from(format!("memory://{}", job.id)))
    }

    fn exists(&self, id: &str) -> bool {
        self.jobs
            .lock()
            .map(|jobs| jobs.iter().any(|job| job.id == id))
            .unwrap_or(false)
    }
}
