/*!
 * Tests for caption line layout
 */

use std::sync::Arc;

use capsync::app_config::{BackgroundConfig, CaptionConfig, GroupingStrategy};
use capsync::captions::{
    ApproximateMetrics, CaptionGrouper, FontMetrics, LayoutSettings, LineLayoutEngine,
};

use crate::common;

fn default_engine() -> LineLayoutEngine {
    let captions = CaptionConfig::default();
    let settings = LayoutSettings::from_config(&captions, &BackgroundConfig::default());
    LineLayoutEngine::new(Arc::new(ApproximateMetrics::from_config(&captions)), settings)
}

#[test]
fn test_approximateMetrics_shouldBeAdditive() {
    let metrics = ApproximateMetrics::new(80, 0.55);
    let joined = metrics.measure("hello world");
    let parts = metrics.measure("hello") + metrics.measure(" ") + metrics.measure("world");
    assert!((joined - parts).abs() < 1e-9);
    assert!(metrics.measure("WWW") > metrics.measure("iii"));
}

#[test]
fn test_layout_withGeneratedStreams_shouldCenterEveryLine() {
    let engine = default_engine();
    let frame = engine.settings().frame_width as f64;
    let grouper = CaptionGrouper::new(GroupingStrategy::default());

    for seed in 0..20 {
        let words = common::generated_stream(seed, 60);
        for group in grouper.group(&words) {
            for block in engine.layout(&group) {
                assert!(block.lines.len() <= engine.settings().max_lines);
                for line in &block.lines {
                    assert!(line.x >= 0.0);
                    assert!(line.x + line.width <= frame + 1e-6);
                    let left = line.x;
                    let right = frame - (line.x + line.width);
                    assert!((left - right).abs() < 1e-6, "seed {} line {:?}", seed, line.text());
                }
            }
        }
    }
}

#[test]
fn test_layout_withSplitGroup_shouldKeepWordsAndTimes() {
    let engine = default_engine();
    let words = common::stream(&[
        ("extraordinarily", 0.0, 0.8),
        ("unbelievable", 0.8, 1.5),
        ("neighbourhood", 1.5, 2.2),
        ("barbecue", 2.2, 2.9),
        ("everyone", 2.9, 3.4),
    ]);
    let group = CaptionGrouper::new(GroupingStrategy::SyllableBudget { target_syllables: 100 })
        .group(&words)
        .remove(0);

    let blocks = engine.layout(&group);

    assert!(blocks.len() > 1);
    let rebuilt: Vec<(&str, f64, f64)> = blocks
        .iter()
        .flat_map(|b| b.group.words().iter().map(|w| (w.word.as_str(), w.start, w.end)))
        .collect();
    let original: Vec<(&str, f64, f64)> = words.iter().map(|w| (w.word.as_str(), w.start, w.end)).collect();
    assert_eq!(rebuilt, original);
}

#[test]
fn test_layout_withTwoLines_shouldUseFixedPitch() {
    let engine = LineLayoutEngine::new(
        Arc::new(common::MonoMetrics),
        LayoutSettings {
            frame_width: 200,
            frame_height: 1000,
            font_size: 40,
            line_leading: 10,
            max_line_width_fraction: 0.4,
            max_lines: 2,
            vertical_anchor: 0.5,
        },
    );
    let words = common::stream(&[("aaaa", 0.0, 0.1), ("bbbb", 0.1, 0.2)]);
    let group = CaptionGrouper::new(GroupingStrategy::default()).group(&words).remove(0);

    let blocks = engine.layout(&group);

    let lines = &blocks[0].lines;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].y - lines[0].y, 50.0);
    // Block height 40 + 50 = 90, centred on 500
    assert_eq!(lines[0].y, 455.0);
}

#[test]
fn test_placement_shouldMatchLinePlacements() {
    let engine = default_engine();
    let words = common::quick_brown_fox();
    let group = CaptionGrouper::new(GroupingStrategy::default()).group(&words).remove(0);

    let block = engine.layout(&group).remove(0);

    for index in 0..words.len() {
        let placement = block.placement(index).unwrap();
        assert_eq!(placement.word, words[index].word);
    }
    assert!(block.placement(words.len()).is_none());
}
