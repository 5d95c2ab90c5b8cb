use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use subclip::cutter::Cutter;
use subclip::error::{Error, Result};
use subclip::model::ModelClient;
use subclip::opts::Opts;
use subclip::pipeline::Pipeline;
use subclip::segment::SegmentSet;
use subclip::segment_parser::ANSWER_MARKER;
use subclip::srt::SubtitleTrack;

/// Model fake that hands out canned replies in order and records every prompt.
#[derive(Clone, Default)]
struct CannedModel {
    replies: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedModel {
    fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect())),
            prompts: Arc::default(),
        }
    }
}

impl ModelClient for CannedModel {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| Error::ModelUnavailable("out of canned replies".to_string()))
    }
}

/// Model fake that is always down.
struct DownModel;

impl ModelClient for DownModel {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::ModelUnavailable("connection refused".to_string()))
    }
}

/// Cutter fake that validates ranges like the real one and records successful cuts.
#[derive(Clone, Default, Debug)]
struct RecordingCutter {
    cuts: Arc<Mutex<Vec<(f64, f64, PathBuf)>>>,
}

impl Cutter for RecordingCutter {
    fn cut(
        &self,
        start_seconds: f64,
        end_seconds: f64,
        _source: &Path,
        output: &Path,
    ) -> Result<()> {
        if !(start_seconds >= 0.0 && end_seconds > start_seconds) {
            return Err(Error::InvalidRange {
                start: start_seconds,
                end: end_seconds,
            });
        }
        self.cuts
            .lock()
            .unwrap()
            .push((start_seconds, end_seconds, output.to_path_buf()));
        Ok(())
    }
}

fn track(cue_count: usize) -> SubtitleTrack {
    let mut srt = String::new();
    for i in 0..cue_count {
        srt.push_str(&format!(
            "{}\n00:{i:02}:00,000 --> 00:{i:02}:30,000\ncue {i}\n\n",
            i + 1
        ));
    }
    SubtitleTrack::from_srt("talk", &srt)
}

fn opts() -> Opts {
    Opts {
        window_size: 10,
        overlap: 2,
        output_dir: PathBuf::from("clips"),
    }
}

const THREE_SEGMENTS_ONE_INVERTED: &str = "Segment 1:\n- Time: [00:00:10] --> [00:05:00]\n- Title: intro\n- Summary: warm-up\n\nSegment 2:\n- Time: [00:10:00] --> [00:08:00]\n- Title: broken\n- Summary: inverted range\n\nSegment 3:\n- Time: [00:12:00] --> [00:15:00]\n- Title: finale\n- Summary: wrap-up";

#[test]
fn invalid_segment_is_skipped_but_siblings_are_cut() -> Result<()> {
    let cutter = RecordingCutter::default();
    let pipeline = Pipeline::new(
        CannedModel::with_replies(&[THREE_SEGMENTS_ONE_INVERTED]),
        cutter.clone(),
        opts(),
    );

    let clips: Vec<(String, PathBuf)> = pipeline
        .run(&track(5), Path::new("talk.mp4"))?
        .collect();

    let titles: Vec<&str> = clips.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(titles, ["intro", "finale"]);
    assert_eq!(clips[0].1, Path::new("clips/talk/intro.mp4"));
    assert_eq!(clips[1].1, Path::new("clips/talk/finale.mp4"));

    let cuts = cutter.cuts.lock().unwrap();
    assert_eq!(cuts.len(), 2);
    assert_eq!((cuts[0].0, cuts[0].1), (10.0, 300.0));
    assert_eq!((cuts[1].0, cuts[1].1), (720.0, 900.0));
    Ok(())
}

#[test]
fn model_outage_aborts_the_transcript_before_any_cut() {
    let cutter = RecordingCutter::default();
    let pipeline = Pipeline::new(DownModel, cutter.clone(), opts());

    let err = pipeline.run(&track(3), Path::new("talk.mp4")).unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)));
    assert!(cutter.cuts.lock().unwrap().is_empty());
}

#[test]
fn analyze_marks_one_answer_region_per_window() -> Result<()> {
    let model = CannedModel::with_replies(&["first reply", "second reply", "third reply"]);
    let pipeline = Pipeline::new(
        model.clone(),
        RecordingCutter::default(),
        Opts {
            window_size: 2,
            overlap: 1,
            output_dir: PathBuf::from("clips"),
        },
    );

    let reply_log = pipeline.analyze(&track(5))?;
    assert_eq!(reply_log.matches(ANSWER_MARKER).count(), 3);
    assert!(reply_log.contains("second reply"));

    // The second window carries the last cue of the first fresh slice as context.
    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[1].starts_with("[00:01:00 --> 00:01:30] cue 1 [00:02:00"));
    Ok(())
}

#[test]
fn segments_from_every_window_reach_the_clip_sequence() -> Result<()> {
    let replies = [
        "Segment 1:\n- Time: [00:00:10] --> [00:01:00]\n- Title: early\n- Summary: s",
        "Segment 1:\n- Time: [00:02:00] --> [00:03:00]\n- Title: late\n- Summary: s",
    ];
    let pipeline = Pipeline::new(
        CannedModel::with_replies(&replies),
        RecordingCutter::default(),
        Opts {
            window_size: 3,
            overlap: 1,
            output_dir: PathBuf::from("clips"),
        },
    );

    let clips: Vec<(String, PathBuf)> = pipeline
        .run(&track(6), Path::new("talk.mp4"))?
        .collect();
    let titles: Vec<&str> = clips.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(titles, ["early", "late"]);
    Ok(())
}

#[test]
fn parsed_segments_round_trip_through_the_persisted_form() -> Result<()> {
    let pipeline = Pipeline::new(
        CannedModel::with_replies(&[THREE_SEGMENTS_ONE_INVERTED]),
        RecordingCutter::default(),
        opts(),
    );

    let reply_log = pipeline.analyze(&track(4))?;
    let set = pipeline.segment(&reply_log, "video1");
    assert_eq!(set.video_name, "video1");
    assert_eq!(set.total_segments, 3);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("video1_segments.json");
    set.save(&path)?;

    let back = SegmentSet::load(&path)?;
    assert_eq!(back, set);
    assert_eq!(back.total_segments, back.segments.len());
    Ok(())
}
