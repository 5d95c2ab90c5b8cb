//! `subclip` — turn long-form video transcripts into short publishable clips.
//!
//! This crate provides:
//! - Subtitle track reading and timecode normalization
//! - Overlapping context windows over a cue sequence, sized for model calls
//! - Tolerant parsing of model replies into structured segments
//! - Orchestration against injected model/cut/publish collaborators
//!
//! The library is designed to be used by both CLI tools and long-running services,
//! with an emphasis on clarity, lazy clip production, and minimal surprises.

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// Crate-wide error taxonomy.
pub mod error;

// Subtitle input and the core segmentation data model.
pub mod segment;
pub mod srt;
pub mod timecode;

// Windowing and reply parsing.
pub mod segment_parser;
pub mod windower;

// External collaborators: model, cutter, cover rendering, publishing.
pub mod cover;
pub mod cutter;
pub mod model;
pub mod publish;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
