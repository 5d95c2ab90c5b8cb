//! Tolerant recovery of structured segments from free-text model replies.
//!
//! The model is asked to answer in a fixed shape, but its output is advisory text, not a
//! guaranteed format. This parser therefore never fails outright: it isolates the answer
//! region(s), walks the labeled blocks inside, and skips any block that does not match
//! the grammar or whose time line does not normalize, keeping everything else.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::segment::Segment;
use crate::timecode::Timecode;

/// Marker line stamped before each model reply in an accumulated reply log.
///
/// Everything between this line and the next 20-equals line (or end of text) is one
/// answer region.
pub const ANSWER_MARKER: &str = "====================ANSWER====================";

const REGION_TERMINATOR: &str = "\n====================";

/// The outcome of parsing one reply (or one accumulated reply log).
///
/// An empty `segments` is a valid result; `answer_found` distinguishes "the reply had an
/// answer section with nothing usable in it" from "no answer section at all".
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Recovered segments, in order of appearance.
    pub segments: Vec<Segment>,
    /// Blocks that matched a label but failed the grammar or time normalization.
    pub skipped_blocks: usize,
    /// Whether at least one answer marker was present.
    pub answer_found: bool,
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"={20}ANSWER={20} *\n").unwrap())
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*Segment[ \t]*\d+[ \t]*:").unwrap())
}

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)^[ \t]*Segment[ \t]*\d+[ \t]*:\s*-\s*Time\s*:\s*(.+?)\s*-->\s*(.+?)\s*\n\s*-\s*Title\s*:\s*(.+?)\s*\n\s*-\s*Summary\s*:\s*(.+?)\s*\z",
        )
        .unwrap()
    })
}

/// Extract segments from a raw model reply.
///
/// Walks every answer region in order (an accumulated reply log holds one region per
/// chunk). A missing answer section and a malformed block are both recorded and logged,
/// never raised; order of the returned segments matches order of appearance.
pub fn parse(reply: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for region in answer_regions(reply) {
        report.answer_found = true;
        parse_region(region, &mut report);
    }

    if !report.answer_found {
        warn!("no answer section found in reply");
    } else if report.segments.is_empty() {
        warn!(
            skipped = report.skipped_blocks,
            "answer section contained no valid segments"
        );
    }

    report
}

/// Slice out every answer region: from the end of a marker line to the next 20-equals
/// line or end of text.
fn answer_regions(reply: &str) -> Vec<&str> {
    marker_re()
        .find_iter(reply)
        .map(|m| {
            let rest = &reply[m.end()..];
            match rest.find(REGION_TERMINATOR) {
                Some(i) => &rest[..i],
                None => rest,
            }
        })
        .collect()
}

fn parse_region(region: &str, report: &mut ParseReport) {
    let labels: Vec<usize> = label_re().find_iter(region).map(|m| m.start()).collect();

    for (idx, &start) in labels.iter().enumerate() {
        let end = labels.get(idx + 1).copied().unwrap_or(region.len());
        let block = &region[start..end];

        match parse_block(block) {
            Ok(segment) => report.segments.push(segment),
            Err(err) => {
                report.skipped_blocks += 1;
                warn!(%err, block, "skipping malformed segment block");
            }
        }
    }
}

/// Parse one labeled block. The time endpoints are normalized individually, so a single
/// unparseable timestamp rejects only this block.
fn parse_block(block: &str) -> Result<Segment> {
    let caps = block_re()
        .captures(block)
        .ok_or_else(|| Error::SegmentBlockMalformed(first_line(block).to_string()))?;

    let start_time = Timecode::normalize(&caps[1])?;
    let end_time = Timecode::normalize(&caps[2])?;

    Ok(Segment {
        start_time,
        end_time,
        title: caps[3].trim().to_string(),
        summary: caps[4].trim().to_string(),
    })
}

fn first_line(block: &str) -> &str {
    block.lines().next().unwrap_or_default().trim()
}
