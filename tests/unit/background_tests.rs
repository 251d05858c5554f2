/*!
 * Tests for background footage fitting
 */

use rand::rngs::StdRng;
use rand::SeedableRng;

use capsync::app_config::{BackgroundConfig, StackMode};
use capsync::background::{center_crop, BackgroundFitPlanner, Rect, SourceVideo};
use capsync::errors::CompositionError;

use crate::common;

fn planner(config: BackgroundConfig) -> BackgroundFitPlanner {
    BackgroundFitPlanner::new(&config)
}

#[test]
fn test_plan_withInsufficientMaterial_shouldReturnShortWindow() {
    let planner = planner(BackgroundConfig::default());
    let mut rng = StdRng::seed_from_u64(0);

    let plans = planner.plan_all(8.0, &[common::landscape_source(5.0)], false, &mut rng).unwrap();

    assert_eq!(plans.len(), 1);
    assert_eq!((plans[0].window_start, plans[0].window_end), (0.0, 5.0));
}

#[test]
fn test_plan_withSpeedFactor_shouldConsumeMoreSource() {
    let planner = planner(BackgroundConfig {
        speed_factor: 2.0,
        ..BackgroundConfig::default()
    });

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = planner
            .plan(10.0, &common::landscape_source(100.0), Rect::new(0, 0, 886, 1920), &mut rng)
            .unwrap();
        assert!((plan.window_end - plan.window_start - 20.0).abs() < 1e-9);
        assert!(plan.window_end <= 100.0);
        assert!(plan.window_end - plan.window_start >= 10.0 / plan.speed_factor);
    }
}

#[test]
fn test_plan_withDifferentSeeds_shouldVaryOffset() {
    let planner = planner(BackgroundConfig::default());
    let offsets: Vec<f64> = (0..8)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            planner
                .plan(10.0, &common::landscape_source(600.0), Rect::new(0, 0, 886, 1920), &mut rng)
                .unwrap()
                .window_start
        })
        .collect();

    assert!(offsets.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn test_plan_withZeroSizedSource_shouldFail() {
    let planner = planner(BackgroundConfig::default());
    let source = SourceVideo {
        path: "broken.mp4".to_string(),
        duration: 10.0,
        width: 0,
        height: 1080,
    };
    let mut rng = StdRng::seed_from_u64(0);

    let result = planner.plan(5.0, &source, Rect::new(0, 0, 886, 1920), &mut rng);

    assert_eq!(result, Err(CompositionError::InvalidFrame { width: 0, height: 1080 }));
}

#[test]
fn test_centerCrop_shouldAlwaysMatchTargetAspectAndStayInside() {
    let sources = [(1920, 1080), (1080, 1920), (886, 1920), (4000, 3000), (720, 2400)];
    for (w, h) in sources {
        let crop = center_crop(w, h, 886, 1920);
        assert!(crop.x + crop.width <= w);
        assert!(crop.y + crop.height <= h);
        let aspect = crop.width as f64 / crop.height as f64;
        assert!((aspect - 886.0 / 1920.0).abs() < 0.01, "source {}x{}", w, h);
    }
}

#[test]
fn test_planAll_withRandomPick_shouldUseProvidedSources() {
    let planner = planner(BackgroundConfig {
        stack: StackMode::Dual,
        ..BackgroundConfig::default()
    });
    let sources = vec![
        SourceVideo {
            path: "a.mp4".to_string(),
            ..common::landscape_source(60.0)
        },
        SourceVideo {
            path: "b.mp4".to_string(),
            ..common::landscape_source(60.0)
        },
    ];
    let mut rng = StdRng::seed_from_u64(11);

    let plans = planner.plan_all(10.0, &sources, true, &mut rng).unwrap();

    assert_eq!(plans.len(), 2);
    assert!(plans.iter().all(|p| p.source == "a.mp4" || p.source == "b.mp4"));
    assert_eq!(plans[1].target_rect.y, 960);
}
