/*!
 * Media descriptors from ffprobe.
 *
 * Background footage needs its duration and frame size, the voice-over only
 * its duration. Both come from `ffprobe -print_format json`. The JSON parsing
 * is separate from the process call so it can be exercised without ffprobe.
 */

use log::{debug, error};
use serde_json::{from_str, Value};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::background::SourceVideo;
use crate::errors::ProbeError;

/// Default probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Runs ffprobe against media files
#[derive(Debug, Clone)]
pub struct MediaProbe {
    timeout: Duration,
}

impl Default for MediaProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }
}

impl MediaProbe {
    /// Create a probe with the given timeout per call
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Duration and frame size of a video file
    pub async fn probe_video<P: AsRef<Path>>(&self, path: P) -> Result<SourceVideo, ProbeError> {
        let path = path.as_ref();
        let stdout = self.run(path, "v:0").await?;
        parse_video_descriptor(&path.to_string_lossy(), &stdout)
    }

    /// Duration of an audio file in seconds
    pub async fn probe_audio_duration<P: AsRef<Path>>(&self, path: P) -> Result<f64, ProbeError> {
        let stdout = self.run(path.as_ref(), "a:0").await?;
        parse_duration(&stdout)
    }

    async fn run(&self, path: &Path, stream: &str) -> Result<String, ProbeError> {
        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                stream,
            ])
            .arg(path)
            .output();

        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| ProbeError::CommandFailed(format!("Failed to execute ffprobe: {}", e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ProbeError::CommandFailed(format!(
                    "ffprobe timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed on {}: {}", path.display(), stderr.trim());
            return Err(ProbeError::CommandFailed(stderr.trim().to_string()));
        }

        debug!("Probed {}", path.display());
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_json(stdout: &str) -> Result<Value, ProbeError> {
    if stdout.trim().is_empty() {
        return Err(ProbeError::ParseError("empty ffprobe output".to_string()));
    }
    from_str(stdout).map_err(|e| ProbeError::ParseError(e.to_string()))
}

// ffprobe prints numbers as strings
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn first_stream(json: &Value) -> Option<&Value> {
    json.get("streams").and_then(|s| s.as_array()).and_then(|s| s.first())
}

/// Media duration from ffprobe JSON, preferring the container value
pub fn parse_duration(stdout: &str) -> Result<f64, ProbeError> {
    let json = parse_json(stdout)?;

    number(json.get("format").and_then(|f| f.get("duration")))
        .or_else(|| number(first_stream(&json).and_then(|s| s.get("duration"))))
        .filter(|d| d.is_finite())
        .ok_or_else(|| ProbeError::ParseError("no duration in ffprobe output".to_string()))
}

/// Video descriptor from ffprobe JSON
pub fn parse_video_descriptor(path: &str, stdout: &str) -> Result<SourceVideo, ProbeError> {
    let duration = parse_duration(stdout)?;
    let json = parse_json(stdout)?;
    let stream = first_stream(&json).ok_or(ProbeError::MissingStream("video"))?;

    let dimension = |key: &str| {
        let value = stream
            .get(key)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ProbeError::ParseError(format!("missing {} in video stream", key)))?;
        u32::try_from(value).map_err(|_| ProbeError::ParseError(format!("{} out of range: {}", key, value)))
    };

    Ok(SourceVideo {
        path: path.to_string(),
        duration,
        width: dimension("width")?,
        height: dimension("height")?,
    })
}
