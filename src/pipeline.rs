//! High-level orchestration: windower -> model -> parser -> cutter.
//!
//! The pipeline is a plain function over collaborator interfaces. It owns no I/O of its
//! own beyond what the injected [`ModelClient`] and [`Cutter`] perform, so the whole
//! flow is testable with fakes that return canned text or synthetic failures, and any
//! front end (CLI, service, GUI) is just a consumer of its lazily-produced clip
//! sequence.
//!
//! Failure isolation, from smallest to largest unit:
//! - a malformed reply block costs that block (handled inside the parser)
//! - a bad segment time range costs that segment's clip
//! - an unavailable model costs the current transcript, never its siblings

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cutter::Cutter;
use crate::error::Result;
use crate::model::ModelClient;
use crate::opts::Opts;
use crate::segment::{Segment, SegmentSet};
use crate::segment_parser::{self, ANSWER_MARKER};
use crate::srt::SubtitleTrack;
use crate::windower::chunks;

/// Drives one transcript at a time through segmentation and cutting.
///
/// A host may run several pipelines concurrently, one per input file; instances share
/// no mutable state.
pub struct Pipeline<M, C> {
    model: M,
    cutter: C,
    opts: Opts,
}

impl<M: ModelClient, C: Cutter> Pipeline<M, C> {
    pub fn new(model: M, cutter: C, opts: Opts) -> Self {
        Self {
            model,
            cutter,
            opts,
        }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Send every window of the track to the model and accumulate the marked replies
    /// into one reply log.
    ///
    /// Windows are processed strictly in order; a model failure aborts this transcript's
    /// remaining windows and surfaces to the caller.
    pub fn analyze(&self, track: &SubtitleTrack) -> Result<String> {
        let mut reply_log = String::new();
        let mut windows = 0usize;

        for chunk in chunks(&track.cues, self.opts.window_size, self.opts.overlap) {
            let reply = self.model.complete(&chunk.prompt_text())?;
            reply_log.push_str(ANSWER_MARKER);
            reply_log.push('\n');
            reply_log.push_str(&reply);
            reply_log.push_str("\n\n");
            windows += 1;
        }

        info!(track = %track.name, windows, "transcript analyzed");
        Ok(reply_log)
    }

    /// Parse an accumulated reply log into the transcript's segment set.
    pub fn segment(&self, reply_log: &str, video_name: &str) -> SegmentSet {
        let report = segment_parser::parse(reply_log);
        SegmentSet::new(video_name, report.segments)
    }

    /// Lazily cut each segment of `set` out of `video_path`.
    ///
    /// The returned iterator yields `(title, clip_path)` as clips finish, so a consumer
    /// can start publishing early clips while later ones are still being cut. Segments
    /// whose cut fails are logged and skipped; siblings are unaffected.
    pub fn clips(&self, set: SegmentSet, video_path: &Path) -> Clips<'_, C> {
        let clip_dir = self.opts.output_dir.join(&set.video_name);
        Clips {
            cutter: &self.cutter,
            video_path: video_path.to_path_buf(),
            clip_dir,
            segments: set.segments.into_iter(),
        }
    }

    /// The full pipeline for one transcript: analyze, parse, then cut lazily.
    pub fn run(&self, track: &SubtitleTrack, video_path: &Path) -> Result<Clips<'_, C>> {
        let reply_log = self.analyze(track)?;
        let set = self.segment(&reply_log, &track.name);
        Ok(self.clips(set, video_path))
    }
}

/// Lazy `(title, clip_path)` sequence produced by [`Pipeline::clips`].
#[derive(Debug)]
pub struct Clips<'a, C> {
    cutter: &'a C,
    video_path: PathBuf,
    clip_dir: PathBuf,
    segments: std::vec::IntoIter<Segment>,
}

impl<C: Cutter> Clips<'_, C> {
    fn cut_one(&self, segment: &Segment) -> Result<PathBuf> {
        let start = segment.start_time.seconds()?;
        let end = segment.end_time.seconds()?;
        let output = self
            .clip_dir
            .join(format!("{}.mp4", sanitize_filename(&segment.title)));
        self.cutter.cut(start, end, &self.video_path, &output)?;
        Ok(output)
    }
}

impl<C: Cutter> Iterator for Clips<'_, C> {
    type Item = (String, PathBuf);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let segment = self.segments.next()?;
            match self.cut_one(&segment) {
                Ok(path) => return Some((segment.title, path)),
                Err(err) => {
                    warn!(title = %segment.title, %err, "skipping segment");
                }
            }
        }
    }
}

/// Make a model-proposed title safe to use as a file name.
///
/// Titles name the clip and cover files, and models happily produce separators,
/// quotes, and whitespace runs.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
            c if c.is_control() => {}
            c if c.is_whitespace() => out.push('_'),
            c => out.push(c),
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators_and_whitespace() {
        assert_eq!(sanitize_filename("a/b: c?"), "a_b__c");
        assert_eq!(sanitize_filename("金句 时刻"), "金句_时刻");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename("..."), "untitled");
    }
}
