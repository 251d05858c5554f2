/*!
 * Line layout for caption groups.
 *
 * Greedy word wrap within a fraction of the frame width, one centred row per
 * line, rows stacked at a fixed pitch around a vertical anchor. Groups that
 * wrap past the line cap are split into sequential blocks before placement.
 * The anchor computed for each word is shared by the base text and its
 * highlight so both draw at the same pixel position.
 */

use log::{debug, warn};
use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

use crate::app_config::{BackgroundConfig, CaptionConfig};
use crate::captions::grouping::{CaptionGroup, GroupBreak};
use crate::word_timing::WordTiming;

/// Measures rendered text for the active font and size
pub trait FontMetrics: Send + Sync {
    /// Width of `text` in pixels
    fn measure(&self, text: &str) -> f64;
}

/// Font metrics approximated from per-character advance classes.
///
/// Used when no font file is configured. Widths are additive over
/// characters, so `measure("a b") == measure("a") + measure(" ") + measure("b")`.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMetrics {
    font_size: f64,
    char_width_factor: f64,
}

impl ApproximateMetrics {
    /// Create metrics for a font size and average advance factor
    pub fn new(font_size: u32, char_width_factor: f64) -> Self {
        Self {
            font_size: font_size as f64,
            char_width_factor,
        }
    }

    /// Metrics matching a caption configuration
    pub fn from_config(captions: &CaptionConfig) -> Self {
        Self::new(captions.font_size, captions.char_width_factor)
    }

    fn advance(&self, c: char) -> f64 {
        let class = match c {
            ' ' => 0.5,
            'i' | 'l' | 'j' | 'I' | '.' | ',' | '\'' | '!' | ':' | ';' | '|' => 0.45,
            'f' | 't' | 'r' | '(' | ')' | '"' | '-' => 0.65,
            'm' | 'w' | 'M' | 'W' | '@' => 1.5,
            c if c.is_uppercase() => 1.2,
            c if c.is_ascii() => 1.0,
            // Wide scripts and emoji
            _ => 1.8,
        };
        class * self.char_width_factor * self.font_size
    }
}

impl FontMetrics for ApproximateMetrics {
    fn measure(&self, text: &str) -> f64 {
        text.chars().map(|c| self.advance(c)).sum()
    }
}

/// Geometry inputs for layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Output frame width in pixels
    pub frame_width: u32,
    /// Output frame height in pixels
    pub frame_height: u32,
    /// Font size in pixels
    pub font_size: u32,
    /// Extra space between lines in pixels
    pub line_leading: u32,
    /// Maximum line width as a fraction of the frame width
    pub max_line_width_fraction: f64,
    /// Maximum lines per caption block
    pub max_lines: usize,
    /// Vertical centre of a block as a fraction of frame height
    pub vertical_anchor: f64,
}

impl LayoutSettings {
    /// Build settings from the caption and background configuration
    pub fn from_config(captions: &CaptionConfig, background: &BackgroundConfig) -> Self {
        Self {
            frame_width: background.frame_width,
            frame_height: background.frame_height,
            font_size: captions.font_size,
            line_leading: captions.line_leading,
            max_line_width_fraction: captions.max_line_width_fraction,
            max_lines: captions.max_lines.max(1),
            vertical_anchor: captions.vertical_anchor,
        }
    }

    /// Widest a line may grow before wrapping
    pub fn max_line_width(&self) -> f64 {
        self.frame_width as f64 * self.max_line_width_fraction
    }

    /// Distance between the tops of consecutive lines
    pub fn line_pitch(&self) -> f64 {
        (self.font_size + self.line_leading) as f64
    }
}

/// Where one word is drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordPlacement {
    /// Index of the word within its caption block
    pub word_index: usize,
    /// The word text
    pub word: String,
    /// Left edge in frame pixels
    pub x: f64,
    /// Top edge in frame pixels
    pub y: f64,
    /// Rendered width in pixels, after clipping
    pub width: f64,
    /// Whether the word was too wide for the frame and got clipped
    pub clipped: bool,
}

/// One visual row of a caption block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutLine {
    /// Words on the row, left to right
    pub placements: Vec<WordPlacement>,
    /// Left edge of the row
    pub x: f64,
    /// Top edge of the row
    pub y: f64,
    /// Rendered width of the row
    pub width: f64,
}

impl LayoutLine {
    /// Row text joined by single spaces
    pub fn text(&self) -> String {
        self.placements
            .iter()
            .map(|p| p.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A caption group (or overflow sub-group) with its laid-out lines
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionBlock<'a> {
    /// The words shown by this block
    pub group: CaptionGroup<'a>,
    /// Rows, top to bottom
    pub lines: Vec<LayoutLine>,
}

impl CaptionBlock<'_> {
    /// Placement of the word at `word_index` within the block
    pub fn placement(&self, word_index: usize) -> Option<&WordPlacement> {
        self.lines
            .iter()
            .flat_map(|line| line.placements.iter())
            .find(|p| p.word_index == word_index)
    }
}

/// Greedy caption line layout
#[derive(Clone)]
pub struct LineLayoutEngine {
    metrics: Arc<dyn FontMetrics>,
    settings: LayoutSettings,
}

impl LineLayoutEngine {
    /// Create an engine for the given metrics and geometry
    pub fn new(metrics: Arc<dyn FontMetrics>, settings: LayoutSettings) -> Self {
        Self { metrics, settings }
    }

    /// Active geometry
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Lay out a group, splitting it into several blocks when it wraps past the line cap
    pub fn layout<'a>(&self, group: &CaptionGroup<'a>) -> Vec<CaptionBlock<'a>> {
        let lines = self.wrap(group.words());

        if lines.len() <= self.settings.max_lines {
            return vec![self.place(group.clone(), &lines)];
        }

        let chunks: Vec<&[Range<usize>]> = lines.chunks(self.settings.max_lines).collect();
        debug!(
            "Group at word {} wraps to {} lines, splitting into {} blocks",
            group.first_index(),
            lines.len(),
            chunks.len()
        );

        let last = chunks.len() - 1;
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let range = chunk[0].start..chunk[chunk.len() - 1].end;
                let closed_by = if i == last { group.closed_by() } else { GroupBreak::LineOverflow };
                let sub_group = group.sub_group(range, closed_by);
                let sub_lines = self.wrap(sub_group.words());
                self.place(sub_group, &sub_lines)
            })
            .collect()
    }

    /// Greedy wrap; returns word ranges, one per line
    pub fn wrap(&self, words: &[WordTiming]) -> Vec<Range<usize>> {
        let max_width = self.settings.max_line_width();
        let space = self.metrics.measure(" ");
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;

        for (index, word) in words.iter().enumerate() {
            let width = self.metrics.measure(&word.word);

            if index > line_start && line_width + space + width > max_width {
                lines.push(line_start..index);
                line_start = index;
                line_width = 0.0;
            }

            if index > line_start {
                line_width += space;
            }
            line_width += width;
        }

        if line_start < words.len() {
            lines.push(line_start..words.len());
        }
        lines
    }

    fn place<'a>(&self, group: CaptionGroup<'a>, lines: &[Range<usize>]) -> CaptionBlock<'a> {
        let frame_width = self.settings.frame_width as f64;
        let frame_height = self.settings.frame_height as f64;
        let font_size = self.settings.font_size as f64;
        let pitch = self.settings.line_pitch();
        let space = self.metrics.measure(" ");

        let block_height = font_size + pitch * (lines.len().saturating_sub(1)) as f64;
        let mut top = frame_height * self.settings.vertical_anchor - block_height / 2.0;
        top = top.min(frame_height - block_height).max(0.0);

        let words = group.words();
        let mut laid_out = Vec::with_capacity(lines.len());

        for (row, range) in lines.iter().enumerate() {
            let widths: Vec<f64> = words[range.clone()]
                .iter()
                .map(|w| self.metrics.measure(&w.word))
                .collect();
            let natural_width =
                widths.iter().sum::<f64>() + space * widths.len().saturating_sub(1) as f64;

            let clipped = natural_width > frame_width;
            let line_width = natural_width.min(frame_width);
            let line_x = (frame_width - line_width) / 2.0;
            let y = top + pitch * row as f64;

            if clipped {
                warn!(
                    "Caption line {:?} is {:.0}px wide, clipping to {:.0}px frame",
                    words[range.start].word, natural_width, frame_width
                );
            }

            let mut x = line_x;
            let placements = range
                .clone()
                .zip(widths)
                .map(|(word_index, width)| {
                    let visible = if clipped {
                        width.min(frame_width - x.max(0.0)).max(0.0)
                    } else {
                        width
                    };
                    let placement = WordPlacement {
                        word_index,
                        word: words[word_index].word.clone(),
                        x,
                        y,
                        width: visible,
                        clipped: clipped && visible < width,
                    };
                    x += width + space;
                    placement
                })
                .collect();

            laid_out.push(LayoutLine {
                placements,
                x: line_x,
                y,
                width: line_width,
            });
        }

        CaptionBlock {
            group,
            lines: laid_out,
        }
    }
}
