/*!
 * Tests for error types
 */

use capsync::errors::{AppError, CompositionError, ProbeError};

#[test]
fn test_compositionError_display_shouldDescribeCause() {
    assert!(CompositionError::NoTimingData.to_string().contains("No timing data"));
    let err = CompositionError::EmptySourceVideo {
        path: "bg.mp4".to_string(),
    };
    assert!(err.to_string().contains("bg.mp4"));
    assert!(CompositionError::InvalidFrame { width: 0, height: 10 }.to_string().contains("0x10"));
}

#[test]
fn test_appError_from_shouldWrapSources() {
    let app: AppError = CompositionError::NoTimingData.into();
    assert!(matches!(app, AppError::Composition(CompositionError::NoTimingData)));

    let app: AppError = ProbeError::MissingStream("audio").into();
    assert!(app.to_string().contains("audio"));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let any = anyhow::anyhow!("boom");
    assert!(matches!(AppError::from(any), AppError::Unknown(_)));
}
