use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::timecode::Timecode;

/// A structured, human-reviewable clip proposal recovered from one model reply.
///
/// Time ranges should be monotonically non-decreasing and non-overlapping across a
/// reply, but the model's output is advisory text; downstream consumers (the cutter)
/// revalidate every range instead of trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: Timecode,
    pub end_time: Timecode,
    /// Short display title (the prompt asks for at most ~20 display units).
    pub title: String,
    pub summary: String,
}

/// The ordered collection of segments for one source transcript.
///
/// This is the unit persisted and exchanged with the editing and cutting stages, and
/// the only on-disk shape kept compatible across versions. Field order matters:
/// `video_name`, `total_segments`, `segments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSet {
    pub video_name: String,
    pub total_segments: usize,
    pub segments: Vec<Segment>,
}

impl SegmentSet {
    /// Wrap a parsed segment sequence with its derived name and count.
    pub fn new(video_name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            video_name: video_name.into(),
            total_segments: segments.len(),
            segments,
        }
    }

    /// `total_segments` must always equal `segments.len()`; every edit below maintains
    /// this, but data loaded from hand-edited files should be checked.
    pub fn is_consistent(&self) -> bool {
        self.total_segments == self.segments.len()
    }

    /// Append a segment (reviewer "add").
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.total_segments = self.segments.len();
    }

    /// Replace the segment at `index` (reviewer "update"). Returns `false` when the
    /// index is out of bounds.
    pub fn update(&mut self, index: usize, segment: Segment) -> bool {
        match self.segments.get_mut(index) {
            Some(slot) => {
                *slot = segment;
                true
            }
            None => false,
        }
    }

    /// Remove and return the segment at `index` (reviewer "delete").
    pub fn remove(&mut self, index: usize) -> Option<Segment> {
        if index >= self.segments.len() {
            return None;
        }
        let removed = self.segments.remove(index);
        self.total_segments = self.segments.len();
        Some(removed)
    }

    /// Serialize as pretty-printed UTF-8 JSON (2-space indent, non-ASCII left unescaped).
    pub fn to_writer(&self, w: impl Write) -> Result<()> {
        let mut w = BufWriter::new(w);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn from_reader(r: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(r))?)
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_writer(File::create(path)?)?;
        info!(path = %path.display(), total = self.total_segments, "saved segment set");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: &str, end: &str, title: &str) -> Segment {
        Segment {
            start_time: Timecode::normalize(start).unwrap(),
            end_time: Timecode::normalize(end).unwrap(),
            title: title.to_string(),
            summary: format!("summary of {title}"),
        }
    }

    #[test]
    fn new_counts_segments() {
        let set = SegmentSet::new("talk", vec![seg("00:00:01", "00:01:00", "one")]);
        assert_eq!(set.total_segments, 1);
        assert!(set.is_consistent());
    }

    #[test]
    fn edits_keep_count_consistent() {
        let mut set = SegmentSet::new("talk", vec![seg("00:00:01", "00:01:00", "one")]);

        set.push(seg("00:01:00", "00:02:00", "two"));
        assert_eq!(set.total_segments, 2);

        assert!(set.update(0, seg("00:00:02", "00:01:00", "one edited")));
        assert_eq!(set.segments[0].title, "one edited");
        assert_eq!(set.total_segments, 2);

        assert!(!set.update(5, seg("00:00:02", "00:01:00", "nope")));

        let removed = set.remove(0).unwrap();
        assert_eq!(removed.title, "one edited");
        assert_eq!(set.total_segments, 1);
        assert!(set.remove(5).is_none());
        assert!(set.is_consistent());
    }

    #[test]
    fn persists_pretty_json_with_field_order_and_raw_utf8() -> Result<()> {
        let set = SegmentSet::new("视频", vec![seg("00:00:01", "00:01:00", "金句")]);
        let mut out = Vec::new();
        set.to_writer(&mut out)?;
        let text = String::from_utf8(out).unwrap();

        // Human-readable 2-space indentation, declared field order, unescaped non-ASCII.
        assert!(text.starts_with("{\n  \"video_name\": \"视频\",\n  \"total_segments\": 1,"));
        assert!(text.contains("金句"));
        assert!(!text.contains("\\u"));

        let start = text.find("\"start_time\"").unwrap();
        let end = text.find("\"end_time\"").unwrap();
        let title = text.find("\"title\"").unwrap();
        let summary = text.find("\"summary\"").unwrap();
        assert!(start < end && end < title && title < summary);
        Ok(())
    }

    #[test]
    fn round_trips_through_persisted_form() -> Result<()> {
        let set = SegmentSet::new(
            "talk",
            vec![
                seg("00:00:01", "00:01:00", "one"),
                seg("00:01:00", "00:02:00", "two"),
            ],
        );
        let mut out = Vec::new();
        set.to_writer(&mut out)?;

        let back = SegmentSet::from_reader(out.as_slice())?;
        assert_eq!(back, set);
        assert_eq!(back.total_segments, back.segments.len());
        Ok(())
    }
}
