/*!
 * # capsync - caption synchronisation and compositing
 *
 * A Rust library that turns word-level speech timings into a layered,
 * frame-accurate caption track for short-form vertical video.
 *
 * ## Features
 *
 * - Group spoken words into short caption chunks by syllable budget and sentence ends
 * - Wrap and centre caption lines within the frame
 * - Time a highlight for every spoken word, pixel-aligned with its base text
 * - Size a title card to the time it takes to read the title
 * - Fit background footage to the voice-over (random offset, centre crop, dual stacking)
 * - Flatten everything into an ordered render job for an external renderer
 * - Batch processing of many jobs in parallel
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `word_timing`: Alignment stream loading and checks
 * - `syllables`: Syllable estimation
 * - `captions`: Caption construction:
 *   - `captions::grouping`: Word grouping
 *   - `captions::layout`: Line wrapping and placement
 *   - `captions::highlight`: Per-word highlight timing
 * - `title`: Title card timing
 * - `background`: Background footage fitting
 * - `compositor`: Render layer ordering
 * - `pipeline`: The per-job compositing pass
 * - `render`: Hand-off to the renderer
 * - `media_probe`: ffprobe media descriptors
 * - `batch`: Concurrent job processing
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod background;
pub mod batch;
pub mod captions;
pub mod compositor;
pub mod errors;
pub mod file_utils;
pub mod media_probe;
pub mod pipeline;
pub mod render;
pub mod syllables;
pub mod title;
pub mod word_timing;

// Re-export main types for easier usage
pub use app_config::Config;
pub use background::{BackgroundFitPlanner, BackgroundPlan, SourceVideo};
pub use captions::{CaptionGroup, CaptionGrouper, FontMetrics, LineLayoutEngine};
pub use compositor::{LayerKind, RenderJob, RenderLayer, TimelineCompositor};
pub use errors::CompositionError;
pub use pipeline::{CaptionPipeline, JobInput, JobReport};
pub use title::{TitleCard, TitleCardResolver};
pub use word_timing::WordTiming;
