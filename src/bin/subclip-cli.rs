use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use subclip::cover::CoverRenderer;
use subclip::cutter::{Cutter, FfmpegCutter};
use subclip::model::{ChatClient, ModelClient, ModelConfig};
use subclip::opts::Opts;
use subclip::pipeline::Pipeline;
use subclip::publish::{CommandPublisher, PublishConfig, Publisher};
use subclip::segment::SegmentSet;
use subclip::segment_parser;
use subclip::srt::SubtitleTrack;

fn main() -> Result<()> {
    subclip::logging::init();
    let params = Params::parse();
    match params.command {
        Command::Run(args) => run(args),
        Command::Parse(args) => reparse(args),
    }
}

#[derive(Parser, Debug)]
#[command(name = "subclip")]
#[command(about = "Cut long-form videos into publishable clips from their transcripts")]
struct Params {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every .srt transcript in a directory end to end
    Run(RunArgs),
    /// Re-parse a saved reply log into a segment set JSON
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory containing .srt transcripts and their source videos
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Where clips are written (one subdirectory per transcript)
    #[arg(short = 'o', long = "output", default_value = "output")]
    output: PathBuf,

    /// API key for the model endpoint; falls back to SUBCLIP_API_KEY
    #[arg(long = "api-key")]
    api_key: Option<String>,

    /// OpenAI-compatible API root
    #[arg(long = "base-url", default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Model name
    #[arg(short = 'm', long = "model", default_value = "gpt-4o-mini")]
    model: String,

    /// Fresh cues per model call
    #[arg(long = "window-size", default_value_t = 700)]
    window_size: usize,

    /// Cues carried from one window into the next
    #[arg(long = "overlap", default_value_t = 10)]
    overlap: usize,

    /// Uploader program; when omitted, clips are cut but not published
    #[arg(long = "uploader")]
    uploader: Option<PathBuf>,

    /// Tag attached to every upload (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Directory cover images are rendered into
    #[arg(long = "covers", default_value = "covers")]
    covers: PathBuf,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Saved reply log to re-parse
    #[arg(short = 'r', long = "reply")]
    reply: PathBuf,

    /// Video name for the segment set; defaults to the reply file stem
    #[arg(short = 'n', long = "name")]
    name: Option<String>,
}

fn run(args: RunArgs) -> Result<()> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("SUBCLIP_API_KEY").ok())
        .context("an API key is required (--api-key or SUBCLIP_API_KEY)")?;

    let model = ChatClient::new(ModelConfig {
        api_key,
        base_url: args.base_url.clone(),
        model: args.model.clone(),
    });
    let opts = Opts {
        window_size: args.window_size,
        overlap: args.overlap,
        output_dir: args.output.clone(),
    };
    let pipeline = Pipeline::new(model, FfmpegCutter::new(), opts);

    let publisher = args.uploader.as_ref().map(|program| {
        CommandPublisher::new(PublishConfig {
            program: program.clone(),
            tags: args.tags.clone(),
            extra_args: Vec::new(),
        })
    });
    let covers = CoverRenderer::new(&args.covers);

    let transcripts = find_transcripts(&args.input)?;
    ensure!(
        !transcripts.is_empty(),
        "no .srt transcripts found in {}",
        args.input.display()
    );
    info!(count = transcripts.len(), "processing transcripts");

    // One worker per transcript, capped at the core count. Transcripts share no mutable
    // state, so a failed one only costs its own thread.
    let pipeline_ref = &pipeline;
    let publisher_ref = publisher.as_ref();
    let covers_ref = &covers;
    for batch in transcripts.chunks(num_cpus::get().max(1)) {
        std::thread::scope(|scope| {
            for srt_path in batch {
                scope.spawn(move || {
                    if let Err(err) =
                        process_transcript(pipeline_ref, publisher_ref, covers_ref, srt_path)
                    {
                        error!(transcript = %srt_path.display(), %err, "transcript failed");
                    }
                });
            }
        });
    }

    Ok(())
}

fn process_transcript<M: ModelClient, C: Cutter>(
    pipeline: &Pipeline<M, C>,
    publisher: Option<&CommandPublisher>,
    covers: &CoverRenderer,
    srt_path: &Path,
) -> Result<()> {
    let track = SubtitleTrack::from_path(srt_path)?;
    ensure!(!track.is_empty(), "transcript has no cues");

    let reply_log = pipeline.analyze(&track)?;
    fs::write(srt_path.with_extension("txt"), &reply_log)?;

    let set = pipeline.segment(&reply_log, &track.name);
    let set_path = srt_path.with_file_name(format!("{}_segments.json", track.name));
    set.save(&set_path)?;

    let video_path = find_video(srt_path)
        .with_context(|| format!("no source video next to {}", srt_path.display()))?;

    for (title, clip_path) in pipeline.clips(set, &video_path) {
        info!(title, clip = %clip_path.display(), "clip ready");

        let Some(publisher) = publisher else {
            continue;
        };
        let cover = match covers.render(&title) {
            Ok(path) => Some(path),
            Err(err) => {
                error!(title, %err, "cover rendering failed");
                None
            }
        };
        if let Err(err) = publisher.publish(&title, &clip_path, cover.as_deref()) {
            error!(title, %err, "publish failed");
        }
        if let Some(cover) = cover {
            let _ = fs::remove_file(cover);
        }
    }

    Ok(())
}

fn reparse(args: ParseArgs) -> Result<()> {
    let content = fs::read_to_string(&args.reply)?;
    let name = args
        .name
        .clone()
        .or_else(|| {
            args.reply
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .context("cannot derive a video name from the reply path")?;

    let report = segment_parser::parse(&content);
    let set = SegmentSet::new(name, report.segments);

    let out = args
        .reply
        .with_file_name(format!("{}_segments.json", set.video_name));
    set.save(&out)?;
    info!(
        path = %out.display(),
        total = set.total_segments,
        skipped = report.skipped_blocks,
        "segments written"
    );
    Ok(())
}

fn find_transcripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut transcripts = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("cannot read {}", dir.display()))? {
        let path = entry?.path();
        let is_srt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));
        if is_srt {
            transcripts.push(path);
        }
    }
    transcripts.sort();
    Ok(transcripts)
}

/// Look for the source video next to the transcript, matching by stem.
fn find_video(srt_path: &Path) -> Option<PathBuf> {
    const EXTENSIONS: [&str; 7] = ["mp4", "mkv", "flv", "avi", "mov", "webm", "wmv"];
    EXTENSIONS
        .iter()
        .map(|ext| srt_path.with_extension(ext))
        .find(|candidate| candidate.exists())
}
