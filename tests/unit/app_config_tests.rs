/*!
 * Tests for application configuration functionality
 */

use capsync::app_config::{Config, GroupingStrategy, HighlightStyle, LogLevel, StackMode, TitleOverlapPolicy};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.captions.grouping.target_syllables(), 4);
    assert_eq!(config.captions.font_size, 80);
    assert_eq!(config.captions.font_path, None);
    assert_eq!(config.captions.line_leading, 20);
    assert_eq!(config.captions.max_line_width_fraction, 0.7);
    assert_eq!(config.captions.max_lines, 2);
    assert_eq!(config.captions.shadow_offsets, vec![(2, 2), (1, 1)]);
    assert_eq!(config.captions.highlight.color(), "yellow");
    assert_eq!(config.captions.title_overlap, TitleOverlapPolicy::Suppress);
    assert_eq!((config.background.frame_width, config.background.frame_height), (886, 1920));
    assert_eq!(config.background.speed_factor, 1.0);
    assert_eq!(config.background.stack, StackMode::Single);
    assert_eq!(config.render.fps, 30);
    assert_eq!(config.render.video_codec, "libx264");
    assert_eq!(config.batch.concurrent_jobs, 4);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.captions.grouping = GroupingStrategy::SyllableBudget { target_syllables: 0 };
    assert!(config.validate().is_err());
    config.captions.grouping = GroupingStrategy::default();

    config.captions.max_line_width_fraction = 1.5;
    assert!(config.validate().is_err());
    config.captions.max_line_width_fraction = 0.7;

    config.captions.max_lines = 0;
    assert!(config.validate().is_err());
    config.captions.max_lines = 2;

    config.background.frame_height = 0;
    assert!(config.validate().is_err());
    config.background.frame_height = 1920;

    config.background.speed_factor = 0.0;
    assert!(config.validate().is_err());
    config.background.speed_factor = 1.0;

    config.render.fps = 0;
    assert!(config.validate().is_err());
    config.render.fps = 30;

    config.batch.concurrent_jobs = 0;
    assert!(config.validate().is_err());
    config.batch.concurrent_jobs = 4;

    assert!(config.validate().is_ok());
}

/// Test partial configuration files
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "captions": {
            "grouping": {"type": "syllable_budget", "target_syllables": 6},
            "highlight": {"type": "pop"},
            "title_overlap": "defer"
        },
        "background": {"stack": "dual", "seed": 7},
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.captions.grouping, GroupingStrategy::SyllableBudget { target_syllables: 6 });
    assert!(matches!(config.captions.highlight, HighlightStyle::Pop { ramp_secs, .. } if ramp_secs == 0.15));
    assert_eq!(config.captions.title_overlap, TitleOverlapPolicy::Defer);
    assert_eq!(config.captions.font_size, 80);
    assert_eq!(config.background.stack, StackMode::Dual);
    assert_eq!(config.background.seed, Some(7));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

/// Test that a written default config reads back identically
#[test]
fn test_config_serialize_shouldReadBackSameValues() {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.captions.grouping, config.captions.grouping);
    assert_eq!(parsed.captions.highlight, config.captions.highlight);
    assert_eq!(parsed.background.frame_width, config.background.frame_width);
}

/// Test font path handling
#[test]
fn test_config_withFontPath_shouldDeserializeAndRejectEmpty() {
    let json = r#"{"captions": {"font_path": "fonts/Arial.ttf"}}"#;
    let mut config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.captions.font_path.as_deref(), Some("fonts/Arial.ttf"));
    assert!(config.validate().is_ok());

    config.captions.font_path = Some("   ".to_string());
    assert!(config.validate().is_err());
}
