//! Camera Frame Model
//!
//! Provides the frame types consumed by the luminosity analyzer:
//! - Byte planes (Y, U, V or interleaved) with stride metadata
//! - The borrowed `ImageFrame` view handed to analyzers
//! - Owned `VideoFrame` buffers and frame sources that replace a camera feed

pub mod frame;
pub mod source;

pub use frame::{ImageFrame, PixelFormat, Plane, VideoFrame, LUMA_PLANE};
pub use source::{FrameSource, ImageSequenceSource, SyntheticSource};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Plane {index} holds {actual} bytes, expected {expected}")]
    PlaneSize {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid dimensions: {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("Frame has no planes")]
    NoPlanes,

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
