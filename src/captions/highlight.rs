/*!
 * Highlight timing for the spoken word inside a caption block.
 *
 * Each word gets exactly its own alignment window. Upstream data that breaks
 * the ordering contract is repaired locally: a start that runs back into the
 * previous window is moved forward, and an empty window is stretched to a
 * minimum length. The job carries on either way.
 */

use log::warn;
use serde::Serialize;

use crate::captions::layout::CaptionBlock;

/// Smallest highlight window, in seconds
pub const MIN_HIGHLIGHT_SECS: f64 = 0.001;

/// When one word of a block is emphasised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightInterval {
    /// Index of the word within its caption block
    pub word_index: usize,
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
    /// Whether the window had to be repaired
    #[serde(skip)]
    pub clamped: bool,
}

/// Builds highlight windows for caption blocks
#[derive(Debug, Clone)]
pub struct HighlightTimelineBuilder {
    min_duration: f64,
}

impl Default for HighlightTimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightTimelineBuilder {
    /// Create a builder with the default minimum window
    pub fn new() -> Self {
        Self {
            min_duration: MIN_HIGHLIGHT_SECS,
        }
    }

    /// One interval per word of the block, in word order
    pub fn build(&self, block: &CaptionBlock<'_>) -> Vec<HighlightInterval> {
        let mut intervals = Vec::with_capacity(block.group.len());
        let mut previous_end: Option<f64> = None;

        for (word_index, word) in block.group.words().iter().enumerate() {
            let mut start = word.start;
            let mut end = word.end;
            let mut clamped = false;

            if let Some(prev) = previous_end {
                if start < prev {
                    start = prev;
                    clamped = true;
                }
            }
            if end < start + self.min_duration {
                end = start + self.min_duration;
                clamped = true;
            }

            if clamped {
                warn!(
                    "Clamped highlight for {:?}: [{:.3}, {:.3}) -> [{:.3}, {:.3})",
                    word.word, word.start, word.end, start, end
                );
            }

            previous_end = Some(end);
            intervals.push(HighlightInterval {
                word_index,
                start,
                end,
                clamped,
            });
        }

        intervals
    }
}
