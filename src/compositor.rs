/*!
 * Timeline composition.
 *
 * Flattens background plans, the title card and the laid-out caption blocks
 * into one ordered list of time-bounded layers. Later layers draw over
 * earlier ones at equal time, so the order is part of the output contract:
 * backgrounds, then the title, then caption layers by ascending start with
 * each caption line ahead of its own highlights.
 */

use log::debug;
use serde::Serialize;

use crate::app_config::{CaptionConfig, HighlightStyle, RenderConfig, TitleOverlapPolicy};
use crate::background::BackgroundPlan;
use crate::captions::highlight::HighlightInterval;
use crate::captions::layout::{CaptionBlock, LayoutLine};
use crate::errors::CompositionError;
use crate::title::TitleCard;

/// What a layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Background,
    Title,
    CaptionLine,
    Highlight,
}

/// Text appearance shared by the base caption and the title card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font file the layout was measured with, `None` for the renderer's default
    pub font_path: Option<String>,
    pub font_size: u32,
    pub color: String,
    pub shadow_color: String,
    pub shadow_offsets: Vec<(i32, i32)>,
}

impl TextStyle {
    /// Base caption style from configuration
    pub fn from_config(captions: &CaptionConfig) -> Self {
        Self {
            font_path: captions.font_path.clone(),
            font_size: captions.font_size,
            color: captions.text_color.clone(),
            shadow_color: captions.shadow_color.clone(),
            shadow_offsets: captions.shadow_offsets.clone(),
        }
    }
}

/// Geometry or text a layer carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContent {
    /// Cropped and scaled background footage
    Footage(BackgroundPlan),
    /// Title card text
    TitleCard {
        subreddit: String,
        title_text: String,
        style: TextStyle,
    },
    /// A caption block, every row with its word anchors
    Caption { lines: Vec<LayoutLine>, style: TextStyle },
    /// One word redrawn in the highlight colour at its base anchor
    Word {
        word_index: usize,
        word: String,
        x: f64,
        y: f64,
        width: f64,
        color: String,
    },
    /// The whole block redrawn with the active word coloured, scaling in
    Pop {
        word_index: usize,
        lines: Vec<LayoutLine>,
        color: String,
        scale_from: f64,
        ramp_secs: f64,
    },
}

/// One time-bounded visual layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLayer {
    pub kind: LayerKind,
    /// Start in output seconds
    pub start: f64,
    /// End in output seconds, exclusive
    pub end: f64,
    pub content: LayerContent,
}

/// Audio reference handed to the encoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioTrack {
    pub path: String,
}

/// Everything the rasterizer needs for one video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderJob {
    pub id: String,
    pub duration: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio: AudioTrack,
    pub layers: Vec<RenderLayer>,
}

impl RenderJob {
    /// Layers of one kind, in render order
    pub fn layers_of(&self, kind: LayerKind) -> impl Iterator<Item = &RenderLayer> {
        self.layers.iter().filter(move |layer| layer.kind == kind)
    }
}

/// A laid-out caption block with its highlight windows
#[derive(Debug, Clone)]
pub struct TimedBlock<'a> {
    pub block: CaptionBlock<'a>,
    pub highlights: Vec<HighlightInterval>,
}

/// Inputs of one composition pass
#[derive(Debug)]
pub struct CompositionInput<'j, 'a> {
    pub id: &'j str,
    pub audio_path: &'j str,
    pub duration: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub backgrounds: Vec<BackgroundPlan>,
    pub title: Option<TitleCard>,
    pub blocks: Vec<TimedBlock<'a>>,
}

/// Merges planned pieces into an ordered render job
#[derive(Debug, Clone)]
pub struct TimelineCompositor {
    text_style: TextStyle,
    highlight: HighlightStyle,
    title_overlap: TitleOverlapPolicy,
    render: RenderConfig,
}

impl TimelineCompositor {
    /// Create a compositor from caption and render settings
    pub fn new(captions: &CaptionConfig, render: &RenderConfig) -> Self {
        Self {
            text_style: TextStyle::from_config(captions),
            highlight: captions.highlight.clone(),
            title_overlap: captions.title_overlap,
            render: render.clone(),
        }
    }

    /// Build the render job
    pub fn compose(&self, input: CompositionInput<'_, '_>) -> Result<RenderJob, CompositionError> {
        let total = input.duration;
        if !(total > 0.0 && total.is_finite()) {
            return Err(CompositionError::InvalidDuration(total));
        }

        let mut layers = Vec::new();

        // A short extract still spans the whole output; the plan's window says how much footage exists
        for plan in input.backgrounds {
            push_bounded(&mut layers, LayerKind::Background, 0.0, total, total, LayerContent::Footage(plan));
        }

        // Captions may not start before the title card ends
        let mut caption_floor = None;
        if let Some(title) = input.title {
            caption_floor = Some(title.duration);
            push_bounded(
                &mut layers,
                LayerKind::Title,
                0.0,
                title.duration,
                total,
                LayerContent::TitleCard {
                    subreddit: title.subreddit,
                    title_text: title.title_text,
                    style: self.text_style.clone(),
                },
            );
        }

        let fixed = layers.len();
        let mut dropped = 0;

        for timed in input.blocks {
            let group_start = timed.block.group.start();
            let group_end = timed.block.group.end();

            let start = match caption_floor {
                Some(floor) if group_start <= floor => match self.title_overlap {
                    TitleOverlapPolicy::Suppress => {
                        dropped += 1;
                        continue;
                    }
                    TitleOverlapPolicy::Defer => floor,
                },
                _ => group_start,
            };

            push_bounded(
                &mut layers,
                LayerKind::CaptionLine,
                start,
                group_end,
                total,
                LayerContent::Caption {
                    lines: timed.block.lines.clone(),
                    style: self.text_style.clone(),
                },
            );

            for interval in &timed.highlights {
                if let Some(content) = self.highlight_content(&timed.block, interval) {
                    push_bounded(
                        &mut layers,
                        LayerKind::Highlight,
                        interval.start.max(start),
                        interval.end,
                        total,
                        content,
                    );
                }
            }
        }

        if dropped > 0 {
            debug!("{}: {} caption groups hidden under the title card", input.id, dropped);
        }

        // Stable, so each caption line stays ahead of highlights sharing its start
        layers[fixed..].sort_by(|a, b| a.start.total_cmp(&b.start));

        Ok(RenderJob {
            id: input.id.to_string(),
            duration: total,
            frame_width: input.frame_width,
            frame_height: input.frame_height,
            fps: self.render.fps,
            video_codec: self.render.video_codec.clone(),
            audio_codec: self.render.audio_codec.clone(),
            audio: AudioTrack {
                path: input.audio_path.to_string(),
            },
            layers,
        })
    }

    fn highlight_content(&self, block: &CaptionBlock<'_>, interval: &HighlightInterval) -> Option<LayerContent> {
        let placement = block.placement(interval.word_index)?;

        Some(match &self.highlight {
            HighlightStyle::Overlay { color } => LayerContent::Word {
                word_index: interval.word_index,
                word: placement.word.clone(),
                x: placement.x,
                y: placement.y,
                width: placement.width,
                color: color.clone(),
            },
            HighlightStyle::Pop {
                color,
                scale_from,
                ramp_secs,
            } => LayerContent::Pop {
                word_index: interval.word_index,
                lines: block.lines.clone(),
                color: color.clone(),
                scale_from: *scale_from,
                ramp_secs: *ramp_secs,
            },
        })
    }
}

/// Clamp to `[0, total]` and keep the layer only if it still has length
fn push_bounded(
    layers: &mut Vec<RenderLayer>,
    kind: LayerKind,
    start: f64,
    end: f64,
    total: f64,
    content: LayerContent,
) {
    let start = start.max(0.0);
    let end = end.min(total);
    if start < end {
        layers.push(RenderLayer {
            kind,
            start,
            end,
            content,
        });
    }
}
