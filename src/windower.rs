//! Overlapping context windows over an ordered cue sequence.
//!
//! A long transcript cannot go to the model in one call, so we stride through it in
//! windows of fresh cues. A model boundary decision near a stride edge still needs to
//! see the cues just before it, so each window after the first is prefixed with a small
//! carried-over context slice, without ever re-sending the whole transcript.

use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::srt::Cue;

/// One context-plus-fresh window of cues, sized for a single model call.
#[derive(Debug)]
pub struct Chunk<'a> {
    context: Vec<&'a Cue>,
    fresh: &'a [Cue],
}

impl<'a> Chunk<'a> {
    /// Cues carried over from the previous window (empty for the first).
    pub fn context(&self) -> &[&'a Cue] {
        &self.context
    }

    /// Cues that have not been sent to the model before.
    ///
    /// Concatenating the fresh slices of every chunk reconstructs the input sequence
    /// exactly: no gaps, no duplicates.
    pub fn fresh(&self) -> &'a [Cue] {
        self.fresh
    }

    /// All cues in order: context first, then fresh.
    pub fn cues(&self) -> impl Iterator<Item = &'a Cue> + '_ {
        self.context.iter().copied().chain(self.fresh.iter())
    }

    pub fn len(&self) -> usize {
        self.context.len() + self.fresh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the window as prompt text: `[start --> end] text`, space-joined.
    pub fn prompt_text(&self) -> String {
        let mut out = String::new();
        for cue in self.cues() {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "[{} --> {}] {}", cue.start, cue.end, cue.text);
        }
        out
    }
}

/// Iterator over overlapping chunks; see [`chunks`].
#[derive(Debug)]
pub struct Chunks<'a> {
    cues: &'a [Cue],
    window_size: usize,
    overlap: usize,
    pos: usize,
    // Bounded FIFO of cue positions carried into the next window. Updated from the tail
    // of each fresh slice, not from the combined chunk, so it never grows past `overlap`
    // and context cues are always genuinely new relative to the previous model call.
    carried: VecDeque<usize>,
}

/// Split `cues` into overlapping chunks of `window_size` fresh cues, each prefixed with
/// up to `overlap` cues retained from the previous fresh slice.
///
/// The returned iterator is finite and restartable: calling `chunks` again on the same
/// input yields the same sequence. An empty input yields no chunks; `window_size >= cues.len()`
/// yields exactly one chunk with no context.
///
/// # Panics
///
/// Panics if `window_size` is zero.
pub fn chunks(cues: &[Cue], window_size: usize, overlap: usize) -> Chunks<'_> {
    assert!(window_size > 0, "window_size must be positive");
    Chunks {
        cues,
        window_size,
        overlap,
        pos: 0,
        carried: VecDeque::with_capacity(overlap),
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        if self.pos >= self.cues.len() {
            return None;
        }

        let end = (self.pos + self.window_size).min(self.cues.len());
        let fresh = &self.cues[self.pos..end];
        let context: Vec<&Cue> = self.carried.iter().map(|&i| &self.cues[i]).collect();

        // Retain the last `overlap` fresh positions for the next window.
        let tail_start = self.pos + fresh.len().saturating_sub(self.overlap);
        for i in tail_start..end {
            if self.carried.len() == self.overlap {
                self.carried.pop_front();
            }
            self.carried.push_back(i);
        }

        self.pos = end;
        Some(Chunk { context, fresh })
    }
}
