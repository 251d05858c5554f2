use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::background::SourceVideo;
use crate::batch::{BatchCompositor, BatchSummary, JobOutcome};
use crate::captions::{load_font_metrics, FontMetrics};
use crate::file_utils::{DataLayout, FileManager, JobFile, ScriptEntry};
use crate::media_probe::MediaProbe;
use crate::pipeline::{CaptionPipeline, JobInput, JobReport};
use crate::render::{JsonRenderSink, RenderSink};
use crate::word_timing::load_alignment;

// @module: Application controller for caption compositing

/// Main application controller: loads jobs, runs the pipeline, hands off render jobs
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Media descriptor source
    probe: MediaProbe,

    // @field: Text measurement shared by every pipeline
    metrics: Arc<dyn FontMetrics>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let metrics = load_font_metrics(&config.captions).context("Failed to load caption font")?;
        Ok(Self {
            config,
            probe: MediaProbe::default(),
            metrics,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn pipeline(&self) -> CaptionPipeline {
        CaptionPipeline::new(self.config.clone(), self.metrics.clone())
    }

    fn rng(&self) -> StdRng {
        match self.config.background.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Audio duration, or `None` when it cannot be probed
    async fn audio_duration(&self, audio: &Path) -> Option<f64> {
        match self.probe.probe_audio_duration(audio).await {
            Ok(duration) => Some(duration),
            Err(e) => {
                warn!("Could not probe {}: {}, using last word end", audio.display(), e);
                None
            }
        }
    }

    /// Run one self-contained job file
    ///
    /// Returns `None` when the output already exists and `force_overwrite` is off.
    pub async fn run_job_file(
        &self,
        job_path: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<JobReport>> {
        if !FileManager::file_exists(&job_path) {
            return Err(anyhow!("Job file does not exist: {:?}", job_path));
        }

        let base_dir = job_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let output_dir = output_dir.unwrap_or_else(|| base_dir.clone());
        let sink = JsonRenderSink::new(&output_dir);

        let mut input = JobFile::load(&job_path)?.into_input(&base_dir)?;

        if sink.exists(&input.id) && !force_overwrite {
            warn!("Skipping {}, render job already exists (use -f to force overwrite)", input.id);
            return Ok(None);
        }

        if input.audio_duration.is_none() {
            let audio = base_dir.join(&input.audio_path);
            input.audio_duration = self.audio_duration(&audio).await;
        }
        if input.backgrounds.is_empty() {
            return Err(anyhow!("Job {} lists no background sources", input.id));
        }

        let pipeline = self.pipeline();
        let mut rng = self.rng();
        let (render_job, report) = pipeline
            .run(&input, &mut rng)
            .with_context(|| format!("Failed to composite job {}", input.id))?;

        let output = sink.submit(&render_job).await?;
        info!("Job {} written to {}", report.id, output.display());

        Ok(Some(report))
    }

    /// Probe every background clip in the data directory
    async fn background_sources(&self, layout: &DataLayout) -> Result<Vec<SourceVideo>> {
        let mut sources = Vec::new();
        for path in layout.background_videos()? {
            match self.probe.probe_video(&path).await {
                Ok(source) => sources.push(source),
                Err(e) => warn!("Skipping background {}: {}", path.display(), e),
            }
        }

        if sources.is_empty() {
            return Err(anyhow!("No usable background videos in {:?}", layout.videos_dir()));
        }
        debug!("{} background sources available", sources.len());
        Ok(sources)
    }

    async fn load_entry(
        &self,
        layout: &DataLayout,
        entry: &ScriptEntry,
        backgrounds: &[SourceVideo],
    ) -> Result<JobInput> {
        let audio = layout.audio_for(&entry.id);
        let words = load_alignment(layout.alignment_for(&entry.id))?;

        Ok(JobInput {
            id: entry.id.clone(),
            title: entry.title.clone(),
            subreddit: entry.subreddit_label(),
            audio_path: audio.to_string_lossy().into_owned(),
            audio_duration: self.audio_duration(&audio).await,
            words,
            backgrounds: backgrounds.to_vec(),
        })
    }

    /// Run every script in a data directory
    pub async fn run_data_dir(&self, data_dir: PathBuf, force_overwrite: bool) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        let layout = DataLayout::new(&data_dir);
        let sink = Arc::new(JsonRenderSink::new(layout.final_dir()));

        let entries = layout.discover_scripts()?;
        if entries.is_empty() {
            warn!("No scripts with audio and word timings found in {:?}", layout.scripts_dir());
            return Ok(BatchSummary::default());
        }

        let backgrounds = self.background_sources(&layout).await?;

        let mut jobs = Vec::with_capacity(entries.len());
        let mut load_failures = Vec::new();
        for entry in &entries {
            if sink.exists(&entry.id) && !force_overwrite {
                info!("Skipping {}, render job already exists", entry.id);
                continue;
            }
            match self.load_entry(&layout, entry, &backgrounds).await {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    error!("Failed to load job {}: {:#}", entry.id, e);
                    load_failures.push(JobOutcome::Failed {
                        id: entry.id.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        let progress_bar = ProgressBar::new(jobs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Compositing");

        let pb = progress_bar.clone();
        let batch = BatchCompositor::new(self.pipeline(), sink);
        let mut summary = batch
            .run(jobs, move |current, _total| pb.set_position(current as u64))
            .await;

        progress_bar.finish_and_clear();

        load_failures.append(&mut summary.outcomes);
        summary.outcomes = load_failures;

        info!(
            "Batch finished in {:?}: {} completed, {} failed",
            start_time.elapsed(),
            summary.completed(),
            summary.failed()
        );

        Ok(summary)
    }
}
