/*!
 * The per-job compositing pipeline.
 *
 * One parameterised pass: timing check, grouping, layout, highlight timing,
 * title resolution, background fit and composition. Grouping strategy and
 * highlight style come from configuration, so every variant of the output
 * runs through this same code path. The pass is pure CPU work with no I/O.
 */

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app_config::Config;
use crate::background::{BackgroundFitPlanner, SourceVideo};
use crate::captions::grouping::{CaptionGrouper, GroupBreak};
use crate::captions::highlight::HighlightTimelineBuilder;
use crate::captions::layout::{ApproximateMetrics, FontMetrics, LayoutSettings, LineLayoutEngine};
use crate::compositor::{CompositionInput, LayerKind, RenderJob, TimedBlock, TimelineCompositor};
use crate::errors::CompositionError;
use crate::title::TitleCardResolver;
use crate::word_timing::{inspect_stream, WordTiming};

/// Everything one video needs, already loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    /// Job identifier, also the output file stem
    pub id: String,
    /// Title read out at the start of the voice-over
    #[serde(default)]
    pub title: String,
    /// Community label for the title card
    #[serde(default)]
    pub subreddit: String,
    /// Voice-over audio reference
    pub audio_path: String,
    /// Voice-over duration in seconds, when known
    #[serde(default)]
    pub audio_duration: Option<f64>,
    /// Alignment stream
    pub words: Vec<WordTiming>,
    /// Candidate background footage
    pub backgrounds: Vec<SourceVideo>,
}

/// What happened while compositing one job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobReport {
    pub id: String,
    pub word_count: usize,
    pub zero_duration_words: usize,
    pub out_of_order_words: usize,
    pub overlapping_words: usize,
    pub group_count: usize,
    pub block_count: usize,
    pub overflow_splits: usize,
    pub clamped_highlights: usize,
    pub clipped_words: usize,
    pub title_duration: Option<f64>,
    pub title_matched: bool,
    pub caption_layers: usize,
    pub layer_count: usize,
    pub duration: f64,
}

/// Runs jobs through the engine with one configuration
#[derive(Clone)]
pub struct CaptionPipeline {
    config: Config,
    grouper: Arc<CaptionGrouper>,
    layout: LineLayoutEngine,
    highlights: HighlightTimelineBuilder,
    titles: TitleCardResolver,
    backgrounds: BackgroundFitPlanner,
    compositor: TimelineCompositor,
}

impl CaptionPipeline {
    /// Create a pipeline with the given font metrics
    pub fn new(config: Config, metrics: Arc<dyn FontMetrics>) -> Self {
        let settings = LayoutSettings::from_config(&config.captions, &config.background);
        Self {
            grouper: Arc::new(CaptionGrouper::new(config.captions.grouping.clone())),
            layout: LineLayoutEngine::new(metrics, settings),
            highlights: HighlightTimelineBuilder::new(),
            titles: TitleCardResolver::new(),
            backgrounds: BackgroundFitPlanner::new(&config.background),
            compositor: TimelineCompositor::new(&config.captions, &config.render),
            config,
        }
    }

    /// Create a pipeline using approximate metrics for the configured font size
    pub fn with_approximate_metrics(config: Config) -> Self {
        let metrics = Arc::new(ApproximateMetrics::from_config(&config.captions));
        Self::new(config, metrics)
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Composite one job
    pub fn run<R: Rng>(&self, job: &JobInput, rng: &mut R) -> Result<(RenderJob, JobReport), CompositionError> {
        let stats = inspect_stream(&job.words)?;

        let duration = match job.audio_duration {
            Some(d) if d > 0.0 && d.is_finite() => d,
            _ => {
                debug!("{}: no audio duration, using last word end {:.3}s", job.id, stats.stream_end);
                stats.stream_end
            }
        };

        let mut report = JobReport {
            id: job.id.clone(),
            word_count: stats.word_count,
            zero_duration_words: stats.zero_duration,
            out_of_order_words: stats.out_of_order,
            overlapping_words: stats.overlapping,
            duration,
            ..Default::default()
        };

        let groups = self.grouper.group(&job.words);
        report.group_count = groups.len();

        let mut blocks = Vec::with_capacity(groups.len());
        for group in &groups {
            for block in self.layout.layout(group) {
                if block.group.closed_by() == GroupBreak::LineOverflow {
                    report.overflow_splits += 1;
                }
                report.clipped_words += block
                    .lines
                    .iter()
                    .flat_map(|line| line.placements.iter())
                    .filter(|p| p.clipped)
                    .count();

                let highlights = self.highlights.build(&block);
                report.clamped_highlights += highlights.iter().filter(|h| h.clamped).count();
                blocks.push(TimedBlock { block, highlights });
            }
        }
        report.block_count = blocks.len();

        let title = self.titles.resolve(&job.title, &job.subreddit, &job.words);
        report.title_duration = title.as_ref().map(|t| t.duration);
        report.title_matched = title.as_ref().is_some_and(|t| t.matched_index.is_some());

        let plans = self
            .backgrounds
            .plan_all(duration, &job.backgrounds, self.config.background.random_source, rng)?;

        let render_job = self.compositor.compose(CompositionInput {
            id: &job.id,
            audio_path: &job.audio_path,
            duration,
            frame_width: self.config.background.frame_width,
            frame_height: self.config.background.frame_height,
            backgrounds: plans,
            title,
            blocks,
        })?;

        report.caption_layers = render_job.layers_of(LayerKind::CaptionLine).count();
        report.layer_count = render_job.layers.len();

        info!(
            "{}: {} words, {} caption blocks, {} layers, {:.2}s",
            job.id, report.word_count, report.block_count, report.layer_count, report.duration
        );

        Ok((render_job, report))
    }
}
