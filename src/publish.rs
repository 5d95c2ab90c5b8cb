//! Publishing collaborator: hand a finished clip to an external uploader.
//!
//! Upload tooling is platform-specific and changes often, so we wrap whatever uploader
//! binary the host configures instead of speaking any platform API ourselves. The
//! pipeline only sees the [`Publisher`] trait.

use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{Error, Result};

/// A collaborator that publishes one finished clip.
pub trait Publisher {
    fn publish(&self, title: &str, clip: &Path, cover: Option<&Path>) -> Result<()>;
}

/// Settings for the external uploader invocation.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Uploader program, resolved via `PATH` or given as an absolute path.
    pub program: PathBuf,
    /// Tags attached to every upload, each passed as `--tag <tag>`.
    pub tags: Vec<String>,
    /// Extra arguments appended verbatim (platform ids, quality flags, ...).
    pub extra_args: Vec<String>,
}

/// [`Publisher`] that spawns the configured uploader per clip and streams its stdout
/// into the log.
pub struct CommandPublisher {
    config: PublishConfig,
}

impl CommandPublisher {
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }
}

impl Publisher for CommandPublisher {
    fn publish(&self, title: &str, clip: &Path, cover: Option<&Path>) -> Result<()> {
        if !clip.exists() {
            return Err(Error::SourceNotFound(clip.to_path_buf()));
        }

        info!(title, clip = %clip.display(), "uploading clip");

        let mut child = Command::new(&self.config.program)
            .args(upload_args(&self.config, title, clip, cover))
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        // Surface uploader progress as it happens rather than after the fact.
        if let Some(out) = child.stdout.take() {
            for line in BufReader::new(out).lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    info!(uploader = %line.trim(), "uploader output");
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(Error::msg(format!(
                "uploader exited with {status} for {title:?}"
            )));
        }

        info!(title, "upload complete");
        Ok(())
    }
}

fn upload_args(
    config: &PublishConfig,
    title: &str,
    clip: &Path,
    cover: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![OsString::from("upload")];
    if let Some(cover) = cover {
        args.push(OsString::from("--cover"));
        args.push(cover.as_os_str().to_owned());
    }
    args.push(OsString::from("--title"));
    args.push(OsString::from(title));
    for tag in &config.tags {
        args.push(OsString::from("--tag"));
        args.push(OsString::from(tag));
    }
    for extra in &config.extra_args {
        args.push(OsString::from(extra));
    }
    args.push(clip.as_os_str().to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PublishConfig {
        PublishConfig {
            program: PathBuf::from("uploader"),
            tags: vec!["life".to_string(), "talk".to_string()],
            extra_args: vec!["--no-reprint".to_string(), "1".to_string()],
        }
    }

    #[test]
    fn builds_upload_invocation_in_order() {
        let args = upload_args(
            &config(),
            "Career advice",
            Path::new("out/clip.mp4"),
            Some(Path::new("covers/c.png")),
        );
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            rendered,
            [
                "upload",
                "--cover",
                "covers/c.png",
                "--title",
                "Career advice",
                "--tag",
                "life",
                "--tag",
                "talk",
                "--no-reprint",
                "1",
                "out/clip.mp4",
            ]
        );
    }

    #[test]
    fn cover_is_optional() {
        let args = upload_args(&config(), "t", Path::new("clip.mp4"), None);
        assert!(!args.iter().any(|a| a == "--cover"));
    }

    #[test]
    fn missing_clip_is_source_not_found() {
        let publisher = CommandPublisher::new(config());
        let err = publisher
            .publish("t", Path::new("not/here.mp4"), None)
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}
