/*!
 * Glyph-accurate font metrics.
 *
 * Widths come from the font's own advance and kerning tables, so the line
 * wrap, the centring and the word anchors agree with what the rasterizer
 * draws using the same font file.
 */

use anyhow::{anyhow, Context, Result};
use fontdue::{Font, FontSettings};
use log::{debug, info};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::CaptionConfig;
use crate::captions::layout::{ApproximateMetrics, FontMetrics};

/// Font metrics read from a TrueType/OpenType font
pub struct FontdueMetrics {
    font: Font,
    px: f32,
}

impl FontdueMetrics {
    /// Parse a font from memory for the given pixel size
    pub fn from_bytes(font_bytes: Vec<u8>, font_size: u32) -> Result<Self> {
        let font = Font::from_bytes(font_bytes, FontSettings::default())
            .map_err(|error| anyhow!("Failed to parse font: {}", error))?;
        Ok(Self {
            font,
            px: font_size as f32,
        })
    }

    /// Load a font file for the given pixel size
    pub fn from_path<P: AsRef<Path>>(font_path: P, font_size: u32) -> Result<Self> {
        let font_path = font_path.as_ref();
        let font_bytes =
            fs::read(font_path).with_context(|| format!("Failed to read font file: {}", font_path.display()))?;
        Self::from_bytes(font_bytes, font_size).with_context(|| format!("Invalid font file: {}", font_path.display()))
    }
}

impl FontMetrics for FontdueMetrics {
    fn measure(&self, text: &str) -> f64 {
        let mut width = 0.0f32;
        let mut previous = None;

        for c in text.chars() {
            if let Some(left) = previous {
                width += self.font.horizontal_kern(left, c, self.px).unwrap_or(0.0);
            }
            width += self.font.metrics(c, self.px).advance_width;
            previous = Some(c);
        }

        width as f64
    }
}

/// Metrics for a caption configuration
///
/// Uses the configured font when `font_path` is set, otherwise falls back to
/// [`ApproximateMetrics`].
pub fn load_font_metrics(captions: &CaptionConfig) -> Result<Arc<dyn FontMetrics>> {
    match &captions.font_path {
        Some(path) => {
            let metrics = FontdueMetrics::from_path(path, captions.font_size)?;
            info!("Measuring captions with {} at {}px", path, captions.font_size);
            Ok(Arc::new(metrics))
        }
        None => {
            debug!("No font configured, using approximate metrics");
            Ok(Arc::new(ApproximateMetrics::from_config(captions)))
        }
    }
}
