//! Frame sources standing in for a live camera feed

use crate::frame::{packed_len, VideoFrame};
use crate::FrameError;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Producer of frames for an analysis pipeline
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<Result<VideoFrame, FrameError>>;

    /// Human readable source description
    fn describe(&self) -> String;
}

/// Uniform frames whose brightness steps up every frame and wraps at 256
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    step: u8,
    limit: Option<u32>,
    sequence: u32,
}

impl SyntheticSource {
    /// Create an unbounded synthetic source (640x480 by default in the CLI)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            step: 1,
            limit: None,
            sequence: 0,
        }
    }

    /// Brightness increment between frames
    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step;
        self
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: u32) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Brightness of the frame with the given sequence number
    pub fn level(&self, sequence: u32) -> u8 {
        (sequence.wrapping_mul(self.step as u32) % 256) as u8
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Result<VideoFrame, FrameError>> {
        if self.limit.is_some_and(|limit| self.sequence >= limit) {
            return None;
        }

        let sequence = self.sequence;
        self.sequence += 1;

        let len = match packed_len(self.width, self.height, 1) {
            Ok(len) => len,
            Err(e) => return Some(Err(e)),
        };
        let data = vec![self.level(sequence); len];
        Some(VideoFrame::gray(data, self.width, self.height).map(|f| f.with_sequence(sequence)))
    }

    fn describe(&self) -> String {
        format!("synthetic {}x{} (step {})", self.width, self.height, self.step)
    }
}

/// Frames decoded from a list of image files
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    looping: bool,
    sequence: u32,
}

impl ImageSequenceSource {
    /// Create a source that plays each file once
    pub fn new(paths: Vec<PathBuf>) -> Self {
        if paths.is_empty() {
            warn!("Image sequence source created without files");
        }
        Self {
            paths,
            position: 0,
            looping: false,
            sequence: 0,
        }
    }

    /// Restart from the first file after the last one
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<Result<VideoFrame, FrameError>> {
        if self.position >= self.paths.len() {
            if !self.looping || self.paths.is_empty() {
                return None;
            }
            self.position = 0;
        }

        let path = &self.paths[self.position];
        self.position += 1;
        debug!("Decoding frame from {}", path.display());

        let sequence = self.sequence;
        self.sequence += 1;
        Some(VideoFrame::load(path).map(|f| f.with_sequence(sequence)))
    }

    fn describe(&self) -> String {
        format!("{} image file(s)", self.paths.len())
    }
}
