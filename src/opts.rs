use std::path::PathBuf;

/// Options that control how a transcript is processed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Number of fresh cues sent to the model per window.
    ///
    /// Larger windows give the model more topical context per call but fewer, coarser
    /// boundary decisions. The default is the operating point that works well for
    /// multi-hour talk transcripts.
    pub window_size: usize,

    /// Number of trailing cues carried from one window into the next.
    ///
    /// Overlap exists so a boundary decision near a stride edge still sees the cues just
    /// before it, without re-sending the entire transcript.
    pub overlap: usize,

    /// Directory clips are written into, one subdirectory per transcript.
    pub output_dir: PathBuf,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            window_size: 700,
            overlap: 10,
            output_dir: PathBuf::from("output"),
        }
    }
}
