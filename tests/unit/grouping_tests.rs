/*!
 * Tests for caption grouping
 */

use capsync::app_config::GroupingStrategy;
use capsync::captions::{CaptionGrouper, GroupBreak};
use capsync::syllables::estimate;

use crate::common;

fn sentence_aware() -> CaptionGrouper {
    CaptionGrouper::new(GroupingStrategy::default())
}

#[test]
fn test_group_withExampleStream_shouldMatchExpectedSpan() {
    let words = common::quick_brown_fox();

    let groups = sentence_aware().group(&words);

    assert_eq!(groups.len(), 1);
    assert_eq!((groups[0].start(), groups[0].end()), (0.0, 1.1));
    assert_eq!(groups[0].text(), "the quick brown fox.");
}

#[test]
fn test_group_withGeneratedStreams_shouldPartitionInput() {
    let grouper = sentence_aware();
    for seed in 0..25 {
        let words = common::generated_stream(seed, 80);
        let groups = grouper.group(&words);

        let rebuilt: Vec<&str> = groups.iter().flat_map(|g| g.words().iter().map(|w| w.word.as_str())).collect();
        let original: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(rebuilt, original, "seed {}", seed);
        assert!(groups.iter().all(|g| !g.is_empty()));
    }
}

#[test]
fn test_group_withGeneratedStreams_shouldRespectBudget() {
    let grouper = sentence_aware();
    let budget = GroupingStrategy::default().target_syllables();

    for seed in 0..25 {
        let words = common::generated_stream(seed, 80);
        for group in grouper.group(&words) {
            if group.closed_by() == GroupBreak::Budget {
                let total: u32 = group.words().iter().map(|w| estimate(&w.word)).sum();
                // A lone oversized word is the only way past the budget
                assert!(total <= budget || group.len() == 1, "seed {} group {:?}", seed, group.text());
            }
        }
    }
}

#[test]
fn test_group_withGeneratedStreams_shouldEndOnSentenceOrStreamEnd() {
    let grouper = sentence_aware();

    for seed in 0..25 {
        let words = common::generated_stream(seed, 80);
        let groups = grouper.group(&words);
        let last = groups.len() - 1;

        for (i, group) in groups.iter().enumerate() {
            // No terminal word in the interior of a group
            for word in &group.words()[..group.len() - 1] {
                assert!(!grouper.is_sentence_terminal(&word.word), "seed {} word {:?}", seed, word.word);
            }
            if i == last {
                continue;
            }
            let ends_sentence = grouper.is_sentence_terminal(&group.words()[group.len() - 1].word);
            assert!(ends_sentence || group.closed_by() == GroupBreak::Budget);
        }
    }
}

#[test]
fn test_group_withCustomTerminalMarks_shouldBreakOnThem() {
    let words = common::stream(&[("wait", 0.0, 0.2), ("what;", 0.2, 0.4), ("no", 0.4, 0.6)]);
    let grouper = CaptionGrouper::new(GroupingStrategy::SentenceAware {
        target_syllables: 10,
        terminal_marks: ";".to_string(),
    });

    let groups = grouper.group(&words);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].text(), "wait what;");
}
