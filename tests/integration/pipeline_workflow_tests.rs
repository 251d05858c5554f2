/*!
 * End-to-end compositing properties over whole jobs
 */

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use capsync::app_config::{Config, HighlightStyle, StackMode, TitleOverlapPolicy};
use capsync::captions::{FontMetrics, FontdueMetrics};
use capsync::compositor::{LayerContent, LayerKind};
use capsync::errors::CompositionError;
use capsync::pipeline::CaptionPipeline;
use capsync::word_timing::WordTiming;

use crate::common;

fn pipeline(config: Config) -> CaptionPipeline {
    CaptionPipeline::new(config, Arc::new(common::MonoMetrics))
}

#[test]
fn test_run_withExampleStream_shouldEmitFourExactHighlights() {
    let job = common::job_input("fox", "", common::quick_brown_fox());

    let (render_job, report) = pipeline(Config::default()).run(&job, &mut StdRng::seed_from_u64(1)).unwrap();

    assert_eq!(report.group_count, 1);
    assert!(report.title_duration.is_none());
    let spans: Vec<(f64, f64)> = render_job.layers_of(LayerKind::Highlight).map(|l| (l.start, l.end)).collect();
    assert_eq!(spans, vec![(0.0, 0.2), (0.2, 0.5), (0.5, 0.8), (0.8, 1.1)]);
    let line = render_job.layers_of(LayerKind::CaptionLine).next().unwrap();
    assert_eq!((line.start, line.end), (0.0, 1.1));
}

#[test]
fn test_run_withGeneratedJobs_shouldKeepLayerInvariants() {
    let pipeline = pipeline(Config::default());

    for seed in 0..20 {
        let words = common::generated_stream(seed, 120);
        let job = common::job_input("gen", "never thought my neighbour", words);

        let (render_job, report) = pipeline.run(&job, &mut StdRng::seed_from_u64(seed)).unwrap();
        let title_end = report.title_duration.unwrap();

        assert_eq!(render_job.layers[0].kind, LayerKind::Background);
        assert_eq!(render_job.layers[1].kind, LayerKind::Title);

        let mut last_start = 0.0;
        for layer in &render_job.layers[2..] {
            assert!(matches!(layer.kind, LayerKind::CaptionLine | LayerKind::Highlight));
            assert!(layer.start >= last_start, "seed {}", seed);
            last_start = layer.start;
        }
        for layer in &render_job.layers {
            assert!(layer.start >= 0.0 && layer.start < layer.end && layer.end <= render_job.duration);
        }
        for line in render_job.layers_of(LayerKind::CaptionLine) {
            assert!(line.start >= title_end);
        }
    }
}

#[test]
fn test_run_withGeneratedJobs_shouldCoverEveryShownWord() {
    let pipeline = pipeline(Config::default());

    for seed in 0..10 {
        let words = common::generated_stream(seed, 60);
        let job = common::job_input("gen", "", words.clone());

        let (render_job, _) = pipeline.run(&job, &mut StdRng::seed_from_u64(seed)).unwrap();

        let mut spans: Vec<(f64, f64)> = render_job.layers_of(LayerKind::Highlight).map(|l| (l.start, l.end)).collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        let expected: Vec<(f64, f64)> = words.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(spans, expected, "seed {}", seed);
    }
}

#[test]
fn test_run_withOverlay_shouldDrawHighlightOnBaseAnchor() {
    let job = common::job_input("fox", "", common::quick_brown_fox());
    let (render_job, _) = pipeline(Config::default()).run(&job, &mut StdRng::seed_from_u64(1)).unwrap();

    let caption = render_job.layers_of(LayerKind::CaptionLine).next().unwrap();
    let LayerContent::Caption { lines, .. } = &caption.content else {
        panic!("caption layer without caption content");
    };
    let anchors: Vec<(f64, f64)> = lines.iter().flat_map(|l| l.placements.iter().map(|p| (p.x, p.y))).collect();

    let highlight_anchors: Vec<(f64, f64)> = render_job
        .layers_of(LayerKind::Highlight)
        .map(|l| match &l.content {
            LayerContent::Word { x, y, color, .. } => {
                assert_eq!(color, "yellow");
                (*x, *y)
            }
            other => panic!("unexpected highlight content {:?}", other),
        })
        .collect();

    assert_eq!(highlight_anchors, anchors);
}

#[test]
fn test_run_withPopStyle_shouldRedrawBlockPerWord() {
    let mut config = Config::default();
    config.captions.highlight = HighlightStyle::Pop {
        color: "yellow".to_string(),
        scale_from: 1.2,
        ramp_secs: 0.15,
    };
    let job = common::job_input("fox", "", common::quick_brown_fox());

    let (render_job, _) = pipeline(config).run(&job, &mut StdRng::seed_from_u64(1)).unwrap();

    let indices: Vec<usize> = render_job
        .layers_of(LayerKind::Highlight)
        .map(|l| match &l.content {
            LayerContent::Pop { word_index, lines, scale_from, .. } => {
                assert_eq!(*scale_from, 1.2);
                assert!(!lines.is_empty());
                *word_index
            }
            other => panic!("unexpected highlight content {:?}", other),
        })
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_run_withDeferPolicy_shouldShowMoreCaptionsThanSuppress() {
    let words = common::stream(&[
        ("I", 0.0, 0.2),
        ("quit", 0.2, 0.5),
        ("today", 0.5, 0.9),
        ("and", 0.9, 1.0),
        ("left.", 1.0, 1.4),
    ]);
    let job = common::job_input("t", "I quit today", words);

    let (suppressed, _) = pipeline(Config::default()).run(&job, &mut StdRng::seed_from_u64(1)).unwrap();

    let mut config = Config::default();
    config.captions.title_overlap = TitleOverlapPolicy::Defer;
    let (deferred, _) = pipeline(config).run(&job, &mut StdRng::seed_from_u64(1)).unwrap();

    assert_eq!(suppressed.layers_of(LayerKind::CaptionLine).count(), 0);
    let deferred_lines: Vec<f64> = deferred.layers_of(LayerKind::CaptionLine).map(|l| l.start).collect();
    assert_eq!(deferred_lines, vec![0.9]);
}

#[test]
fn test_run_withDualStack_shouldEmitTwoBackgroundsFirst() {
    let mut config = Config::default();
    config.background.stack = StackMode::Dual;
    let job = common::job_input("dual", "", common::quick_brown_fox());

    let (render_job, _) = pipeline(config).run(&job, &mut StdRng::seed_from_u64(5)).unwrap();

    assert_eq!(render_job.layers[0].kind, LayerKind::Background);
    assert_eq!(render_job.layers[1].kind, LayerKind::Background);
    assert_eq!(render_job.layers_of(LayerKind::Background).count(), 2);
}

#[test]
fn test_run_withNonMonotonicStream_shouldClampAndContinue() {
    common::init_test_logging();
    let words = vec![
        WordTiming::new("so", 0.0, 0.5),
        WordTiming::new("then", 0.3, 0.6),
        WordTiming::new("uh", 0.6, 0.6),
    ];
    let job = common::job_input("messy", "", words);

    let (render_job, report) = pipeline(Config::default()).run(&job, &mut StdRng::seed_from_u64(2)).unwrap();

    assert_eq!(report.zero_duration_words, 1);
    assert_eq!(report.overlapping_words, 1);
    assert_eq!(report.clamped_highlights, 2);
    let spans: Vec<(f64, f64)> = render_job.layers_of(LayerKind::Highlight).map(|l| (l.start, l.end)).collect();
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0);
    }
}

#[test]
fn test_run_withEmptySourceVideo_shouldFailJob() {
    let mut job = common::job_input("nobg", "", common::quick_brown_fox());
    job.backgrounds = vec![common::landscape_source(0.0)];

    let result = pipeline(Config::default()).run(&job, &mut StdRng::seed_from_u64(2));

    assert!(matches!(result, Err(CompositionError::EmptySourceVideo { .. })));
}

#[test]
fn test_run_withSameSeed_shouldProduceIdenticalJobs() {
    let pipeline = pipeline(Config::default());
    let job = common::job_input("det", "", common::generated_stream(3, 40));

    let (a, _) = pipeline.run(&job, &mut StdRng::seed_from_u64(77)).unwrap();
    let (b, _) = pipeline.run(&job, &mut StdRng::seed_from_u64(77)).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_run_withGlyphMetrics_shouldCentreMeasuredLines() {
    let font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
    if !std::path::Path::new(font_path).exists() {
        return;
    }
    let mut config = Config::default();
    config.captions.font_path = Some(font_path.to_string());
    let metrics = Arc::new(FontdueMetrics::from_path(font_path, config.captions.font_size).unwrap());
    let frame_width = config.background.frame_width as f64;
    let pipeline = CaptionPipeline::new(config, metrics.clone());
    let job = common::job_input("glyphs", "", common::generated_stream(5, 80));

    let (render_job, _) = pipeline.run(&job, &mut StdRng::seed_from_u64(5)).unwrap();

    for layer in render_job.layers_of(LayerKind::CaptionLine) {
        let LayerContent::Caption { lines, style } = &layer.content else {
            panic!("caption layer without caption content");
        };
        assert_eq!(style.font_path.as_deref(), Some(font_path));
        for line in lines {
            assert!(line.x + line.width <= frame_width + 1e-6);
            assert!((line.x - (frame_width - line.width) / 2.0).abs() < 1e-6);
            for placement in line.placements.iter().filter(|p| !p.clipped) {
                assert!((placement.width - metrics.measure(&placement.word)).abs() < 1e-9);
            }
        }
    }
}
