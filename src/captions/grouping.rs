/*!
 * Caption grouping.
 *
 * Words are chunked into short on-screen groups by a syllable budget, and
 * (for the sentence-aware strategy) a group always closes right after a
 * sentence-terminal word. Groups borrow contiguous slices of the input, so
 * together they partition the stream exactly.
 */

use log::debug;

use crate::app_config::GroupingStrategy;
use crate::syllables::{EnglishSyllables, SyllableCounter};
use crate::word_timing::WordTiming;

// @const: Closing characters allowed after a terminal mark, e.g. `end."`
const TRAILING_CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '”', '’', '»'];

/// Why a group was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBreak {
    /// The next word would have overflowed the syllable budget
    Budget,
    /// The last word ends a sentence
    SentenceEnd,
    /// The stream ran out
    EndOfStream,
    /// Split off by the layout engine to respect the line cap
    LineOverflow,
}

/// A run of consecutive words shown together as one caption
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionGroup<'a> {
    words: &'a [WordTiming],
    first_index: usize,
    syllables: u32,
    closed_by: GroupBreak,
}

impl<'a> CaptionGroup<'a> {
    /// Build a group over a non-empty slice starting at `first_index` in the stream
    pub fn new(words: &'a [WordTiming], first_index: usize, syllables: u32, closed_by: GroupBreak) -> Self {
        debug_assert!(!words.is_empty(), "caption groups are never empty");
        Self {
            words,
            first_index,
            syllables,
            closed_by,
        }
    }

    /// Words of the group, in spoken order
    pub fn words(&self) -> &'a [WordTiming] {
        self.words
    }

    /// Index of the first word in the source stream
    pub fn first_index(&self) -> usize {
        self.first_index
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Estimated syllables in the group (0 for layout sub-groups)
    pub fn syllables(&self) -> u32 {
        self.syllables
    }

    /// Why the group was closed
    pub fn closed_by(&self) -> GroupBreak {
        self.closed_by
    }

    /// Start of the first word
    pub fn start(&self) -> f64 {
        self.words.first().map(|w| w.start).unwrap_or(0.0)
    }

    /// End of the last word
    pub fn end(&self) -> f64 {
        self.words.last().map(|w| w.end).unwrap_or(0.0)
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A sub-range of this group, `range` relative to the group
    pub fn sub_group(&self, range: std::ops::Range<usize>, closed_by: GroupBreak) -> CaptionGroup<'a> {
        let first_index = self.first_index + range.start;
        CaptionGroup {
            words: &self.words[range],
            first_index,
            syllables: 0,
            closed_by,
        }
    }
}

/// Single-pass grouper over an alignment stream
pub struct CaptionGrouper<C: SyllableCounter = EnglishSyllables> {
    strategy: GroupingStrategy,
    counter: C,
}

impl CaptionGrouper<EnglishSyllables> {
    /// Create a grouper using the English syllable heuristic
    pub fn new(strategy: GroupingStrategy) -> Self {
        Self::with_counter(strategy, EnglishSyllables::new())
    }
}

impl<C: SyllableCounter> CaptionGrouper<C> {
    /// Create a grouper with a custom syllable counter
    pub fn with_counter(strategy: GroupingStrategy, counter: C) -> Self {
        Self { strategy, counter }
    }

    /// The active strategy
    pub fn strategy(&self) -> &GroupingStrategy {
        &self.strategy
    }

    /// Whether a word closes a sentence under the active strategy
    pub fn is_sentence_terminal(&self, word: &str) -> bool {
        match &self.strategy {
            GroupingStrategy::SyllableBudget { .. } => false,
            GroupingStrategy::SentenceAware { terminal_marks, .. } => {
                ends_with_terminal(word, terminal_marks)
            }
        }
    }

    /// Partition the stream into caption groups
    pub fn group<'a>(&self, words: &'a [WordTiming]) -> Vec<CaptionGroup<'a>> {
        let budget = self.strategy.target_syllables();
        let mut groups = Vec::new();
        let mut group_start = 0;
        let mut syllables = 0u32;

        for (index, word) in words.iter().enumerate() {
            let cost = self.counter.estimate(&word.word).max(1);

            if syllables.saturating_add(cost) > budget && index > group_start {
                groups.push(CaptionGroup::new(
                    &words[group_start..index],
                    group_start,
                    syllables,
                    GroupBreak::Budget,
                ));
                group_start = index;
                syllables = 0;
            }

            syllables = syllables.saturating_add(cost);

            if self.is_sentence_terminal(&word.word) {
                groups.push(CaptionGroup::new(
                    &words[group_start..=index],
                    group_start,
                    syllables,
                    GroupBreak::SentenceEnd,
                ));
                group_start = index + 1;
                syllables = 0;
            }
        }

        if group_start < words.len() {
            groups.push(CaptionGroup::new(
                &words[group_start..],
                group_start,
                syllables,
                GroupBreak::EndOfStream,
            ));
        }

        debug!("Grouped {} words into {} caption groups", words.len(), groups.len());
        groups
    }
}

/// Whether `word` ends with one of `marks`, ignoring closing quotes and brackets
pub fn ends_with_terminal(word: &str, marks: &str) -> bool {
    word.trim_end()
        .trim_end_matches(TRAILING_CLOSERS)
        .chars()
        .next_back()
        .is_some_and(|c| marks.contains(c))
}
