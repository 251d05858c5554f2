/*!
 * Caption construction from word-level timings.
 *
 * - `grouping`: chunking the alignment stream into caption groups
 * - `layout`: wrapping and placing each group inside the frame
 * - `font`: glyph-accurate text measurement
 * - `highlight`: per-word emphasis windows inside each group
 */

pub mod font;
pub mod grouping;
pub mod highlight;
pub mod layout;

// Re-export main types
pub use font::{load_font_metrics, FontdueMetrics};
pub use grouping::{CaptionGroup, CaptionGrouper, GroupBreak};
pub use highlight::{HighlightInterval, HighlightTimelineBuilder};
pub use layout::{
    ApproximateMetrics, CaptionBlock, FontMetrics, LayoutLine, LayoutSettings, LineLayoutEngine,
    WordPlacement,
};
