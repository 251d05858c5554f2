/*!
 * Tests for title card timing
 */

use capsync::title::TitleCardResolver;

use crate::common;

#[test]
fn test_resolve_withUnknownLastWord_shouldSpanWholeStream() {
    let words = common::stream(&[("my", 0.0, 0.2), ("story", 0.2, 0.7), ("begins", 0.9, 1.6)]);

    let card = TitleCardResolver::new().resolve("A title nobody read", "r/tifu", &words).unwrap();

    assert_eq!(card.duration, 1.6);
    assert!(card.duration > 0.0);
}

#[test]
fn test_resolve_withCaseAndPunctuation_shouldStillMatch() {
    let words = common::stream(&[
        ("AITA", 0.0, 0.4),
        ("for", 0.4, 0.5),
        ("leaving?", 0.5, 1.0),
        ("So,", 1.3, 1.5),
    ]);

    let card = TitleCardResolver::new().resolve("AITA for LEAVING", "r/AmItheAsshole", &words).unwrap();

    assert_eq!(card.duration, 1.0);
    assert_eq!(card.title_text, "AITA for LEAVING");
}

#[test]
fn test_resolve_withTitleLongerThanStream_shouldStillResolve() {
    let words = common::stream(&[("short", 0.0, 0.3), ("stream", 0.3, 0.8)]);

    let card = TitleCardResolver::new()
        .resolve("a much longer title that ends in stream", "", &words)
        .unwrap();

    assert_eq!(card.duration, 0.8);
    assert_eq!(card.matched_index, Some(1));
}

#[test]
fn test_resolve_shouldNeverExceedStreamEnd() {
    let resolver = TitleCardResolver::new();
    for seed in 0..20 {
        let words = common::generated_stream(seed, 30);
        let stream_end = words.last().unwrap().end;
        let card = resolver.resolve("never thought anyway", "", &words).unwrap();
        assert!(card.duration > 0.0 && card.duration <= stream_end);
    }
}
