/*!
 * Word-level timing data from the forced-alignment step.
 *
 * The alignment service writes a JSON file next to each voice-over. Several
 * shapes exist in the wild (a bare array, or an object wrapping `words` or
 * `word_segments`), and aligners omit `start`/`end` for tokens they could not
 * place. Those tokens are skipped here rather than failing the job.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::errors::CompositionError;

/// A single spoken word with its offsets in the audio track, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The word as written in the script, punctuation included
    #[serde(alias = "text")]
    pub word: String,

    /// Start offset in seconds
    pub start: f64,

    /// End offset in seconds
    pub end: f64,
}

impl WordTiming {
    /// Create a new word timing
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// Duration in seconds (may be zero or negative for bad upstream data)
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

// Aligner output before required fields are checked
#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(alias = "text")]
    word: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
}

/// Parse an alignment JSON document into word timings
pub fn parse_alignment_json(content: &str) -> Result<Vec<WordTiming>> {
    let json: Value = serde_json::from_str(content).context("Failed to parse alignment JSON")?;

    let items = match &json {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .get("words")
            .or_else(|| map.get("word_segments"))
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| anyhow!("Alignment JSON has no 'words' or 'word_segments' array"))?,
        _ => return Err(anyhow!("Alignment JSON must be an array or an object")),
    };

    let mut words = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.into_iter().enumerate() {
        let raw: RawWord = serde_json::from_value(item)
            .with_context(|| format!("Malformed alignment entry at index {}", index))?;

        match (raw.word, raw.start, raw.end) {
            (Some(word), Some(start), Some(end)) if start.is_finite() && end.is_finite() => {
                words.push(WordTiming::new(word.trim(), start, end));
            }
            (word, _, _) => {
                skipped += 1;
                warn!(
                    "Skipping unaligned word {:?} at index {}",
                    word.unwrap_or_default(),
                    index
                );
            }
        }
    }

    debug!("Parsed {} aligned words ({} skipped)", words.len(), skipped);
    Ok(words)
}

/// Load word timings from an alignment JSON file
pub fn load_alignment<P: AsRef<Path>>(path: P) -> Result<Vec<WordTiming>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read alignment file: {}", path.display()))?;
    parse_alignment_json(&content)
        .with_context(|| format!("Failed to load alignment file: {}", path.display()))
}

/// Summary of upstream timing quality for one stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingStats {
    /// Number of words in the stream
    pub word_count: usize,
    /// Words whose end is not after their start
    pub zero_duration: usize,
    /// Words starting before the previous word started
    pub out_of_order: usize,
    /// Words starting before the previous word ended
    pub overlapping: usize,
    /// Latest end offset in the stream
    pub stream_end: f64,
}

impl TimingStats {
    /// Whether the stream satisfies the monotonic, non-overlapping contract
    pub fn is_clean(&self) -> bool {
        self.zero_duration == 0 && self.out_of_order == 0 && self.overlapping == 0
    }
}

/// Check a stream against the alignment contract.
///
/// Violations are counted and logged, not rejected. The only fatal case is a
/// stream with no word of positive duration.
pub fn inspect_stream(words: &[WordTiming]) -> Result<TimingStats, CompositionError> {
    let mut stats = TimingStats {
        word_count: words.len(),
        ..Default::default()
    };

    let mut previous: Option<&WordTiming> = None;
    for word in words {
        if word.end <= word.start {
            stats.zero_duration += 1;
        }
        if let Some(prev) = previous {
            if word.start < prev.start {
                stats.out_of_order += 1;
            } else if word.start < prev.end {
                stats.overlapping += 1;
            }
        }
        stats.stream_end = stats.stream_end.max(word.end);
        previous = Some(word);
    }

    if words.is_empty() || stats.zero_duration == words.len() {
        return Err(CompositionError::NoTimingData);
    }

    if !stats.is_clean() {
        warn!(
            "Alignment stream violates ordering: {} zero-duration, {} out of order, {} overlapping of {} words",
            stats.zero_duration, stats.out_of_order, stats.overlapping, stats.word_count
        );
    }

    Ok(stats)
}
