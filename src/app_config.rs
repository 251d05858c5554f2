use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the engine configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Caption grouping, layout and highlight settings
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Background footage fitting
    #[serde(default)]
    pub background: BackgroundConfig,

    /// Settings handed through to the rasterizer
    #[serde(default)]
    pub render: RenderConfig,

    /// Job-level concurrency
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How words are chunked into on-screen caption groups
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Close a group only when the syllable budget would overflow
    SyllableBudget {
        #[serde(default = "default_target_syllables")]
        target_syllables: u32,
    },
    /// Syllable budget plus an immediate break after sentence-terminal words
    SentenceAware {
        #[serde(default = "default_target_syllables")]
        target_syllables: u32,
        #[serde(default = "default_terminal_marks")]
        terminal_marks: String,
    },
}

impl GroupingStrategy {
    // @returns: Syllable budget for the strategy
    pub fn target_syllables(&self) -> u32 {
        match self {
            Self::SyllableBudget { target_syllables } => *target_syllables,
            Self::SentenceAware { target_syllables, .. } => *target_syllables,
        }
    }
}

impl Default for GroupingStrategy {
    fn default() -> Self {
        Self::SentenceAware {
            target_syllables: default_target_syllables(),
            terminal_marks: default_terminal_marks(),
        }
    }
}

/// How the spoken word is emphasised inside its caption group
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HighlightStyle {
    /// The active word is redrawn in `color` over the base line
    Overlay {
        #[serde(default = "default_highlight_color")]
        color: String,
    },
    /// The whole group is redrawn per word with a scale-in ramp
    Pop {
        #[serde(default = "default_highlight_color")]
        color: String,
        #[serde(default = "default_pop_scale_from")]
        scale_from: f64,
        #[serde(default = "default_pop_ramp_secs")]
        ramp_secs: f64,
    },
}

impl HighlightStyle {
    // @returns: Fill colour of the highlighted word
    pub fn color(&self) -> &str {
        match self {
            Self::Overlay { color } => color,
            Self::Pop { color, .. } => color,
        }
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::Overlay {
            color: default_highlight_color(),
        }
    }
}

/// What happens to caption groups that start while the title card is up
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TitleOverlapPolicy {
    /// Drop the group entirely
    #[default]
    Suppress,
    /// Keep the group but start it when the title card ends
    Defer,
}

/// Caption settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Grouping strategy
    #[serde(default)]
    pub grouping: GroupingStrategy,

    /// Highlight style
    #[serde(default)]
    pub highlight: HighlightStyle,

    /// TrueType/OpenType font used for measuring and drawing captions
    ///
    /// When unset, widths are approximated from `char_width_factor`.
    #[serde(default)]
    pub font_path: Option<String>,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Extra vertical space between caption lines in pixels
    #[serde(default = "default_line_leading")]
    pub line_leading: u32,

    /// Maximum line width as a fraction of the frame width
    #[serde(default = "default_max_line_width_fraction")]
    pub max_line_width_fraction: f64,

    /// Maximum lines per on-screen caption block
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Vertical centre of the caption block as a fraction of frame height
    #[serde(default = "default_vertical_anchor")]
    pub vertical_anchor: f64,

    /// Average glyph advance relative to the font size (approximate metrics)
    #[serde(default = "default_char_width_factor")]
    pub char_width_factor: f64,

    /// Base text colour
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Drop shadow colour
    #[serde(default = "default_shadow_color")]
    pub shadow_color: String,

    /// Drop shadow offsets in pixels, drawn in order under the text
    #[serde(default = "default_shadow_offsets")]
    pub shadow_offsets: Vec<(i32, i32)>,

    /// Caption groups overlapping the title card
    #[serde(default)]
    pub title_overlap: TitleOverlapPolicy,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            grouping: GroupingStrategy::default(),
            highlight: HighlightStyle::default(),
            font_path: None,
            font_size: default_font_size(),
            line_leading: default_line_leading(),
            max_line_width_fraction: default_max_line_width_fraction(),
            max_lines: default_max_lines(),
            vertical_anchor: default_vertical_anchor(),
            char_width_factor: default_char_width_factor(),
            text_color: default_text_color(),
            shadow_color: default_shadow_color(),
            shadow_offsets: default_shadow_offsets(),
            title_overlap: TitleOverlapPolicy::default(),
        }
    }
}

/// Background stacking mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    /// One source fills the frame
    #[default]
    Single,
    /// Two sources stacked top and bottom, each filling half the frame
    Dual,
}

/// Background fitting settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackgroundConfig {
    /// Output frame width in pixels
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    /// Output frame height in pixels
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    /// Playback speed multiplier applied to the source footage
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,

    /// Seconds of source kept unused at the end of the clip
    #[serde(default)]
    pub safety_margin_secs: f64,

    /// Seed for offset and footage selection (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Pick the background clip at random instead of the first one
    #[serde(default)]
    pub random_source: bool,

    /// Single or dual stacked footage
    #[serde(default)]
    pub stack: StackMode,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            speed_factor: default_speed_factor(),
            safety_margin_secs: 0.0,
            seed: None,
            random_source: false,
            stack: StackMode::default(),
        }
    }
}

/// Settings passed through untouched to the rasterizer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Video codec name understood by the encoder
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec name understood by the encoder
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
        }
    }
}

/// Batch processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Maximum number of jobs composited at once
    #[serde(default = "default_concurrent_jobs")]
    pub concurrent_jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent_jobs: default_concurrent_jobs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_syllables() -> u32 {
    4
}

fn default_terminal_marks() -> String {
    ".!?".to_string()
}

fn default_highlight_color() -> String {
    "yellow".to_string()
}

fn default_pop_scale_from() -> f64 {
    1.2
}

fn default_pop_ramp_secs() -> f64 {
    0.15
}

fn default_font_size() -> u32 {
    80
}

fn default_line_leading() -> u32 {
    20
}

fn default_max_line_width_fraction() -> f64 {
    0.7
}

fn default_max_lines() -> usize {
    2
}

fn default_vertical_anchor() -> f64 {
    0.5
}

fn default_char_width_factor() -> f64 {
    0.55
}

fn default_text_color() -> String {
    "white".to_string()
}

fn default_shadow_color() -> String {
    "black".to_string()
}

fn default_shadow_offsets() -> Vec<(i32, i32)> {
    vec![(2, 2), (1, 1)]
}

fn default_frame_width() -> u32 {
    886
}

fn default_frame_height() -> u32 {
    1920
}

fn default_speed_factor() -> f64 {
    1.0
}

fn default_fps() -> u32 {
    30
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_concurrent_jobs() -> usize {
    4
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let captions = &self.captions;

        if captions.grouping.target_syllables() == 0 {
            return Err(anyhow!("Syllable budget must be at least 1"));
        }

        if let GroupingStrategy::SentenceAware { terminal_marks, .. } = &captions.grouping {
            if terminal_marks.is_empty() {
                return Err(anyhow!("Sentence-aware grouping needs at least one terminal mark"));
            }
        }

        if !(captions.max_line_width_fraction > 0.0 && captions.max_line_width_fraction <= 1.0) {
            return Err(anyhow!(
                "max_line_width_fraction must be in (0, 1], got {}",
                captions.max_line_width_fraction
            ));
        }

        if captions.max_lines == 0 {
            return Err(anyhow!("max_lines must be at least 1"));
        }

        if captions.font_size == 0 {
            return Err(anyhow!("font_size must be at least 1"));
        }

        if captions.font_path.as_deref().is_some_and(|path| path.trim().is_empty()) {
            return Err(anyhow!("font_path cannot be empty; remove it to use approximate metrics"));
        }

        if !(0.0..=1.0).contains(&captions.vertical_anchor) {
            return Err(anyhow!(
                "vertical_anchor must be in [0, 1], got {}",
                captions.vertical_anchor
            ));
        }

        if captions.char_width_factor <= 0.0 {
            return Err(anyhow!("char_width_factor must be positive"));
        }

        if let HighlightStyle::Pop { scale_from, ramp_secs, .. } = &captions.highlight {
            if *scale_from <= 0.0 || *ramp_secs < 0.0 {
                return Err(anyhow!("Pop highlight needs a positive scale and a non-negative ramp"));
            }
        }

        let background = &self.background;
        if background.frame_width == 0 || background.frame_height == 0 {
            return Err(anyhow!(
                "Frame size must be non-zero, got {}x{}",
                background.frame_width,
                background.frame_height
            ));
        }

        if !(background.speed_factor > 0.0 && background.speed_factor.is_finite()) {
            return Err(anyhow!("speed_factor must be positive, got {}", background.speed_factor));
        }

        if background.safety_margin_secs < 0.0 {
            return Err(anyhow!("safety_margin_secs cannot be negative"));
        }

        if self.render.fps == 0 {
            return Err(anyhow!("fps must be at least 1"));
        }

        if self.batch.concurrent_jobs == 0 {
            return Err(anyhow!("concurrent_jobs must be at least 1"));
        }

        Ok(())
    }
}
