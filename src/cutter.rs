//! Video-cut collaborator: time range in, clip file out.
//!
//! The orchestrator depends on the [`Cutter`] trait; the default implementation shells
//! out to ffmpeg with a stream-copy cut, which is fast and lossless. Range validation
//! happens here because the segment times are model output and cannot be trusted.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};

/// A collaborator that writes the `[start_seconds, end_seconds)` slice of `source` to
/// `output`.
///
/// Fails with [`Error::InvalidRange`] for empty, inverted, or out-of-bounds ranges and
/// [`Error::SourceNotFound`] when the source video is missing.
pub trait Cutter {
    fn cut(
        &self,
        start_seconds: f64,
        end_seconds: f64,
        source: &Path,
        output: &Path,
    ) -> Result<()>;
}

/// [`Cutter`] backed by the `ffmpeg`/`ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegCutter;

impl FfmpegCutter {
    pub fn new() -> Self {
        Self
    }

    /// Ask ffprobe for the container duration in seconds.
    fn probe_duration(&self, source: &Path) -> Result<f64> {
        let probe = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(source)
            .output()?;

        if !probe.status.success() {
            return Err(Error::msg(format!(
                "ffprobe failed for {}: {}",
                source.display(),
                String::from_utf8_lossy(&probe.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&probe.stdout);
        text.trim()
            .parse::<f64>()
            .map_err(|_| Error::msg(format!("unreadable ffprobe duration: {:?}", text.trim())))
    }
}

impl Cutter for FfmpegCutter {
    fn cut(
        &self,
        start_seconds: f64,
        end_seconds: f64,
        source: &Path,
        output: &Path,
    ) -> Result<()> {
        if !(start_seconds >= 0.0 && end_seconds > start_seconds) {
            return Err(Error::InvalidRange {
                start: start_seconds,
                end: end_seconds,
            });
        }
        if !source.exists() {
            return Err(Error::SourceNotFound(source.to_path_buf()));
        }

        let duration = self.probe_duration(source)?;
        if end_seconds > duration {
            return Err(Error::InvalidRange {
                start: start_seconds,
                end: end_seconds,
            });
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let cut = Command::new("ffmpeg")
            .args(cut_args(start_seconds, end_seconds, source, output))
            .output()?;

        if !cut.status.success() {
            return Err(Error::msg(format!(
                "ffmpeg cut failed for {}: {}",
                source.display(),
                String::from_utf8_lossy(&cut.stderr).trim()
            )));
        }

        info!(
            start = start_seconds,
            end = end_seconds,
            output = %output.display(),
            "clip written"
        );
        Ok(())
    }
}

/// Stream-copy cut: `-ss` before `-i` seeks to the nearest keyframe, `-c copy` avoids a
/// re-encode, `-avoid_negative_ts` repairs the timestamps stream copy can skew.
fn cut_args(start: f64, end: f64, source: &Path, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-y"),
        OsString::from("-hide_banner"),
        OsString::from("-loglevel"),
        OsString::from("error"),
        OsString::from("-ss"),
        OsString::from(format!("{start:.3}")),
        OsString::from("-i"),
        source.as_os_str().to_owned(),
        OsString::from("-t"),
        OsString::from(format!("{:.3}", end - start)),
        OsString::from("-c"),
        OsString::from("copy"),
        OsString::from("-avoid_negative_ts"),
        OsString::from("make_zero"),
        output.as_os_str().to_owned(),
    ]
}
