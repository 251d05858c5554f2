/*!
 * Background footage fitting.
 *
 * Picks which stretch of the source clip plays under the captions and how it
 * is cropped. The start offset is drawn from an injected random source, so a
 * seeded generator gives reproducible plans. Footage is always cropped around
 * the centre and scaled to fill its target rectangle, never letterboxed.
 */

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::app_config::{BackgroundConfig, StackMode};
use crate::errors::CompositionError;

/// Descriptor of a background clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    /// Path or handle understood by the rasterizer
    pub path: String,
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// How one background source is cut, cropped and placed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundPlan {
    /// Source path or handle
    pub source: String,
    /// Full length of the source in seconds
    pub source_duration: f64,
    /// First source second used
    pub window_start: f64,
    /// Source second where playback stops
    pub window_end: f64,
    /// Playback speed multiplier
    pub speed_factor: f64,
    /// Region of the source frame kept, in source pixels
    pub crop_rect: Rect,
    /// Where the scaled crop lands in the output frame
    pub target_rect: Rect,
    /// Output seconds the window covers at the given speed
    pub covered_duration: f64,
}

/// Centre crop of a `src_w`x`src_h` frame to the `target_w`:`target_h` aspect ratio
pub fn center_crop(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Rect {
    let (sw, sh, tw, th) = (src_w as u64, src_h as u64, target_w as u64, target_h as u64);

    if sw * th > tw * sh {
        // Wider than the target: trim the sides
        let new_w = ((sh * tw) / th).max(1) as u32;
        Rect::new((src_w - new_w) / 2, 0, new_w, src_h)
    } else {
        // Taller (or equal): trim top and bottom
        let new_h = ((sw * th) / tw).max(1).min(sh) as u32;
        Rect::new(0, (src_h - new_h) / 2, src_w, new_h)
    }
}

/// Plans background footage for a job
#[derive(Debug, Clone)]
pub struct BackgroundFitPlanner {
    frame_width: u32,
    frame_height: u32,
    speed_factor: f64,
    safety_margin: f64,
    stack: StackMode,
}

impl BackgroundFitPlanner {
    /// Create a planner from configuration
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            speed_factor: config.speed_factor,
            safety_margin: config.safety_margin_secs,
            stack: config.stack,
        }
    }

    /// Output rectangles for the active stack mode, top to bottom
    pub fn target_rects(&self) -> Vec<Rect> {
        match self.stack {
            StackMode::Single => vec![Rect::new(0, 0, self.frame_width, self.frame_height)],
            StackMode::Dual => {
                let top = self.frame_height / 2;
                vec![
                    Rect::new(0, 0, self.frame_width, top),
                    Rect::new(0, top, self.frame_width, self.frame_height - top),
                ]
            }
        }
    }

    /// Plan one background per target rectangle.
    ///
    /// With `random_pick` the sources are drawn at random, otherwise taken in
    /// order. Dual stacking with a single source reuses it with its own offset.
    pub fn plan_all<R: Rng>(
        &self,
        output_duration: f64,
        sources: &[SourceVideo],
        random_pick: bool,
        rng: &mut R,
    ) -> Result<Vec<BackgroundPlan>, CompositionError> {
        if sources.is_empty() {
            return Err(CompositionError::NoBackgroundSource);
        }

        let targets = self.target_rects();
        if targets.len() > sources.len() && !random_pick {
            warn!(
                "{} background slots but {} sources, reusing footage",
                targets.len(),
                sources.len()
            );
        }

        targets
            .into_iter()
            .enumerate()
            .map(|(slot, target)| {
                let source = if random_pick {
                    &sources[rng.random_range(0..sources.len())]
                } else {
                    &sources[slot % sources.len()]
                };
                self.plan(output_duration, source, target, rng)
            })
            .collect()
    }

    /// Plan a single source into `target`
    pub fn plan<R: Rng>(
        &self,
        output_duration: f64,
        source: &SourceVideo,
        target: Rect,
        rng: &mut R,
    ) -> Result<BackgroundPlan, CompositionError> {
        if !(output_duration > 0.0 && output_duration.is_finite()) {
            return Err(CompositionError::InvalidDuration(output_duration));
        }
        if !(source.duration > 0.0 && source.duration.is_finite()) {
            return Err(CompositionError::EmptySourceVideo {
                path: source.path.clone(),
            });
        }
        if source.width == 0 || source.height == 0 {
            return Err(CompositionError::InvalidFrame {
                width: source.width,
                height: source.height,
            });
        }
        if target.width == 0 || target.height == 0 {
            return Err(CompositionError::InvalidFrame {
                width: target.width,
                height: target.height,
            });
        }

        let (window_start, window_end) = self.fit_window(output_duration, source, rng);
        let crop_rect = center_crop(source.width, source.height, target.width, target.height);

        debug!(
            "Background {}: window [{:.2}, {:.2}) of {:.2}s, crop {:?}",
            source.path, window_start, window_end, source.duration, crop_rect
        );

        Ok(BackgroundPlan {
            source: source.path.clone(),
            source_duration: source.duration,
            window_start,
            window_end,
            speed_factor: self.speed_factor,
            crop_rect,
            target_rect: target,
            covered_duration: ((window_end - window_start) / self.speed_factor).min(output_duration),
        })
    }

    fn fit_window<R: Rng>(&self, output_duration: f64, source: &SourceVideo, rng: &mut R) -> (f64, f64) {
        let required = output_duration * self.speed_factor;

        if source.duration <= required {
            warn!(
                "Background {} is {:.2}s but {:.2}s is needed, using the whole clip",
                source.path, source.duration, required
            );
            return (0.0, source.duration);
        }

        let latest_start = source.duration - required - self.safety_margin;
        let start = if latest_start > 0.0 {
            rng.random_range(0.0..=latest_start)
        } else {
            0.0
        };

        (start, start + required)
    }
}
