use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::timecode::Timecode;

/// One timestamped subtitle entry.
///
/// Cues are created once when a subtitle source is read and are read-only thereafter.
/// Ordering is by appearance in the source track.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: Timecode,
    pub end: Timecode,
    pub text: String,
}

/// An ordered subtitle track read from one `.srt` source.
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Derived from the source file stem; names the transcript everywhere downstream
    /// (reply logs, the persisted segment set, the clip output directory).
    pub name: String,
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Read a track from a `.srt` file, deriving the track name from the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| Error::msg(format!("no file stem in {}", path.display())))?;
        Ok(Self::from_srt(name, &content))
    }

    /// Parse SRT text into an ordered cue sequence.
    ///
    /// Parsing is tolerant: a block whose time line is missing or fails timecode
    /// normalization is skipped with a logged warning, and reading continues with the
    /// remaining blocks. Subtitle tracks in the wild are full of editor damage, and one
    /// broken entry should not cost the transcript.
    pub fn from_srt(name: impl Into<String>, content: &str) -> Self {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

        let mut cues = Vec::new();
        for block in content.split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }
            match parse_block(block) {
                Ok(cue) => cues.push(cue),
                Err(err) => warn!(block, %err, "skipping malformed subtitle block"),
            }
        }

        Self {
            name: name.into(),
            cues,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }
}

/// Parse one SRT block: an optional numeric index line, a `start --> end` time line,
/// then text lines until the end of the block.
fn parse_block(block: &str) -> Result<Cue> {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

    let first = lines
        .next()
        .ok_or_else(|| Error::msg("empty subtitle block"))?;

    // The index line is optional; some tools omit it.
    let time_line = if first.contains("-->") {
        first
    } else {
        lines
            .next()
            .ok_or_else(|| Error::msg("subtitle block has no time line"))?
    };

    let (start_raw, end_raw) = time_line
        .split_once("-->")
        .ok_or_else(|| Error::msg(format!("not a time line: {time_line:?}")))?;

    let start = Timecode::normalize(start_raw)?;
    let end = Timecode::normalize(end_raw)?;
    let text = lines.collect::<Vec<_>>().join("\n");

    Ok(Cue { start, end, text })
}
