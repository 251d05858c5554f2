/*!
 * Title card timing.
 *
 * The voice-over starts by reading the title, so the title card stays up
 * until the title's last word has been spoken. That word is located in the
 * alignment stream; if it cannot be found the card spans the whole stream.
 */

use log::{debug, warn};
use serde::Serialize;

use crate::word_timing::WordTiming;

/// Introductory overlay shown while the title is read out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleCard {
    /// Community label shown above the title
    pub subreddit: String,
    /// Title text
    pub title_text: String,
    /// Seconds the card stays on screen, from zero
    pub duration: f64,
    /// Stream index of the word that ended the title, when found
    #[serde(skip)]
    pub matched_index: Option<usize>,
}

/// Normalise a token for matching: lowercase, surrounding punctuation removed
pub fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Latest end time in the stream
fn stream_end(words: &[WordTiming]) -> f64 {
    words.iter().map(|w| w.end).fold(0.0, f64::max)
}

/// Resolves how long the title card stays up
#[derive(Debug, Clone, Default)]
pub struct TitleCardResolver;

impl TitleCardResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Build the title card, or `None` when there is no title or no timing data
    pub fn resolve(&self, title: &str, subreddit: &str, words: &[WordTiming]) -> Option<TitleCard> {
        let tokens: Vec<String> = title
            .split_whitespace()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect();

        let last_token = tokens.last()?;
        if words.is_empty() {
            return None;
        }

        // The last title word cannot be spoken before the title's other words
        let search_from = (tokens.len() - 1).min(words.len() - 1);

        let matched = words
            .iter()
            .enumerate()
            .skip(search_from)
            .find(|(_, w)| w.end > 0.0 && normalize_token(&w.word) == *last_token);

        let (duration, matched_index) = match matched {
            Some((index, word)) => {
                debug!("Title ends at word {} ({:?}) at {:.3}s", index, word.word, word.end);
                (word.end, Some(index))
            }
            None => {
                warn!(
                    "Title word {:?} not found in alignment stream, title card spans whole stream",
                    last_token
                );
                (stream_end(words), None)
            }
        };

        if !(duration > 0.0 && duration.is_finite()) {
            warn!("Alignment stream has no positive end time, skipping title card");
            return None;
        }

        Some(TitleCard {
            subreddit: subreddit.to_string(),
            title_text: title.trim().to_string(),
            duration,
            matched_index,
        })
    }
}
