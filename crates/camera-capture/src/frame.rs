//! Video frame types and processing

use crate::FrameError;
use image::GrayImage;
use std::path::Path;

/// Index of the luma (Y) plane in planar YUV and grayscale frames
pub const LUMA_PLANE: usize = 0;

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single 8-bit luma plane
    Gray8,
    /// Three planes: Y, U, V (chroma subsampled 2x2)
    Yuv420,
    /// Two planes: Y, interleaved UV
    Nv12,
}

impl PixelFormat {
    /// Number of planes a frame of this format carries
    pub fn plane_count(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Yuv420 => 3,
            PixelFormat::Nv12 => 2,
        }
    }
}

/// One channel buffer of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    /// Bytes between the starts of consecutive rows
    pub row_stride: usize,
    /// Bytes between consecutive samples in a row
    pub pixel_stride: usize,
}

impl Plane {
    /// Create a tightly packed plane
    pub fn new(data: Vec<u8>, row_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride: 1,
        }
    }

    /// Create a plane with explicit pixel stride (interleaved chroma)
    pub fn with_pixel_stride(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Raw plane bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read-only view of one camera image.
///
/// Analyzers receive frames by reference and must not retain plane data past
/// the call; anything they keep has to be copied out.
pub trait ImageFrame {
    /// Frame width in pixels
    fn width(&self) -> u32;

    /// Frame height in pixels
    fn height(&self) -> u32;

    /// Pixel layout of the planes
    fn format(&self) -> PixelFormat;

    /// Number of planes in the frame
    fn plane_count(&self) -> usize;

    /// Bytes of the plane at `index`, if present
    fn plane(&self, index: usize) -> Option<&[u8]>;
}

/// Owned video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Plane buffers, luma first
    pub planes: Vec<Plane>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Pixel layout
    pub format: PixelFormat,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a frame from prepared planes
    pub fn new(
        planes: Vec<Plane>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        if planes.is_empty() {
            return Err(FrameError::NoPlanes);
        }
        if width == 0 || height == 0 {
            return Err(FrameError::Dimensions { width, height });
        }

        Ok(Self {
            planes,
            width,
            height,
            format,
            sequence: 0,
        })
    }

    /// Create a grayscale frame from a packed luma buffer
    pub fn gray(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = packed_len(width, height, 1)?;
        check_plane(LUMA_PLANE, expected, data.len())?;
        Self::new(vec![Plane::new(data, width as usize)], width, height, PixelFormat::Gray8)
    }

    /// Create a planar YUV 4:2:0 frame
    pub fn yuv420(
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<Self, FrameError> {
        let chroma_w = width.div_ceil(2) as usize;
        let chroma_len = packed_len(width.div_ceil(2), height.div_ceil(2), 1)?;

        check_plane(0, packed_len(width, height, 1)?, y.len())?;
        check_plane(1, chroma_len, u.len())?;
        check_plane(2, chroma_len, v.len())?;

        Self::new(
            vec![
                Plane::new(y, width as usize),
                Plane::new(u, chroma_w),
                Plane::new(v, chroma_w),
            ],
            width,
            height,
            PixelFormat::Yuv420,
        )
    }

    /// Create a grayscale frame from packed RGB24 data
    pub fn from_rgb(data: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        check_plane(0, packed_len(width, height, 3)?, data.len())?;

        let mut luma = Vec::with_capacity(data.len() / 3);
        for pixel in data.chunks_exact(3) {
            // BT.601 luma: 0.299*R + 0.587*G + 0.114*B
            let y = (pixel[0] as f32 * 0.299
                   + pixel[1] as f32 * 0.587
                   + pixel[2] as f32 * 0.114) as u8;
            luma.push(y);
        }
        Self::gray(luma, width, height)
    }

    /// Wrap a decoded grayscale image
    pub fn from_luma_image(img: GrayImage) -> Result<Self, FrameError> {
        let (width, height) = img.dimensions();
        Self::gray(img.into_raw(), width, height)
    }

    /// Decode an image file (PNG, JPEG, ...) into a grayscale frame
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| FrameError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_luma_image(img.to_luma8())
    }

    /// Set the sequence number
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Luma value at (x, y)
    pub fn luma_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let plane = self.planes.get(LUMA_PLANE)?;
        let idx = y as usize * plane.row_stride + x as usize * plane.pixel_stride;
        plane.as_bytes().get(idx).copied()
    }
}

impl ImageFrame for VideoFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Plane::as_bytes)
    }
}

/// Byte length of a tightly packed plane, or `Dimensions` if it does not fit
/// in memory addressing
pub(crate) fn packed_len(
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Result<usize, FrameError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
        .filter(|&len| isize::try_from(len).is_ok())
        .ok_or(FrameError::Dimensions { width, height })
}

fn check_plane(index: usize, expected: usize, actual: usize) -> Result<(), FrameError> {
    if expected != actual {
        return Err(FrameError::PlaneSize {
            index,
            expected,
            actual,
        });
    }
    Ok(())
}
