//! Depth-to-Hue Packing
//!
//! A video codec only carries 8-bit color, so a 16-bit depth sample is
//! stored as the hue of a fully saturated, fully bright HSV pixel:
//!
//! 1. Samples beyond the far plane are set to 0.
//! 2. The remaining range `[0, far_plane]` is scaled to `[0, 360]` degrees.
//! 3. Pixels with depth 0 get saturation and value 0, i.e. black.
//! 4. HSV is converted to BGR and each channel scaled to 8 bits.
//!
//! The receiver converts back to HSV and reads the depth out of the hue,
//! see [`decode_depth`]. Precision is bounded by the 8-bit channel step,
//! about `far_plane / 1530` millimetres.
//!
//! A sample exactly at the far plane maps to 360 degrees, which wraps to the
//! same red as depth 0+. Callers needing that last millimetre should raise
//! the far plane slightly.
//!
//! # Examples
//!
//! ```rust
//! use depthcast_frame::{DepthEncoder, DepthFrame};
//!
//! let depth = DepthFrame::new(2, 1, vec![0, 1000]).unwrap();
//! let mut encoder = DepthEncoder::new(4000).unwrap();
//!
//! let colorized = encoder.encode(&depth);
//! assert_eq!(colorized.pixel(0, 0), Some([0, 0, 0]));
//! assert_eq!(colorized.pixel(1, 0), Some([0, 255, 127]));
//! ```

use tracing::trace;

use crate::error::{FrameError, Result};
use crate::frame::{ColorFrame, DepthFrame, BGR_BYTES_PER_PIXEL};
use crate::hsv::{bgr_to_hsv, channel_to_u8, hsv_to_bgr};

/// Default far plane in millimetres
pub const DEFAULT_FAR_PLANE_MM: u16 = 4000;

/// Encode a single depth sample to a BGR8 triple
#[inline]
#[must_use]
pub fn encode_sample(depth_mm: u16, far_plane_mm: u16) -> [u8; 3] {
    if depth_mm == 0 || depth_mm > far_plane_mm {
        return [0, 0, 0];
    }

    // Multiply before dividing so whole-degree hues stay exact
    let hue = f32::from(depth_mm) * 360.0 / f32::from(far_plane_mm);
    hsv_to_bgr(hue, 1.0, 1.0).map(channel_to_u8)
}

/// Decode a single BGR8 triple back to depth
#[inline]
#[must_use]
pub fn decode_sample(bgr: [u8; 3], far_plane_mm: u16) -> u16 {
    let (hue, _, value) = bgr_to_hsv(bgr.map(|c| f32::from(c) / 255.0));
    if value == 0.0 {
        return 0;
    }

    let depth = hue * f32::from(far_plane_mm) / 360.0;
    depth.round().clamp(0.0, f32::from(far_plane_mm)) as u16
}

/// Encode a whole depth frame into a new BGR8 frame
pub fn encode_depth(depth: &DepthFrame, far_plane_mm: u16) -> Result<ColorFrame> {
    let mut encoder = DepthEncoder::new(far_plane_mm)?;
    Ok(encoder.encode(depth).clone())
}

/// Decode a hue-packed BGR8 frame back to depth
pub fn decode_depth(colorized: &ColorFrame, far_plane_mm: u16) -> Result<DepthFrame> {
    if far_plane_mm == 0 {
        return Err(FrameError::InvalidFarPlane(far_plane_mm));
    }

    let data = colorized
        .data
        .chunks_exact(BGR_BYTES_PER_PIXEL)
        .map(|px| decode_sample([px[0], px[1], px[2]], far_plane_mm))
        .collect();

    DepthFrame::new(colorized.width, colorized.height, data)
}

/// Depth encoder with a reusable output frame
///
/// Successive frames of the same size are encoded into the same buffer.
#[derive(Debug)]
pub struct DepthEncoder {
    far_plane_mm: u16,
    output: ColorFrame,
}

impl DepthEncoder {
    /// Create an encoder for the given far plane
    pub fn new(far_plane_mm: u16) -> Result<Self> {
        if far_plane_mm == 0 {
            return Err(FrameError::InvalidFarPlane(far_plane_mm));
        }

        Ok(Self {
            far_plane_mm,
            output: ColorFrame::black(0, 0),
        })
    }

    /// Far plane in millimetres
    #[must_use]
    pub fn far_plane_mm(&self) -> u16 {
        self.far_plane_mm
    }

    /// Encode `depth` into the internal buffer
    ///
    /// The returned frame is valid until the next call.
    pub fn encode(&mut self, depth: &DepthFrame) -> &ColorFrame {
        let len = ColorFrame::byte_len(depth.width, depth.height);
        if self.output.data.len() != len {
            trace!("Resizing depth output buffer to {}x{}", depth.width, depth.height);
            self.output.data.resize(len, 0);
        }
        self.output.width = depth.width;
        self.output.height = depth.height;

        // missing samples render black rather than keeping the previous frame
        let samples = depth.data.iter().copied().chain(std::iter::repeat(0));
        for (dst, sample) in self
            .output
            .data
            .chunks_exact_mut(BGR_BYTES_PER_PIXEL)
            .zip(samples)
        {
            dst.copy_from_slice(&encode_sample(sample, self.far_plane_mm));
        }

        &self.output
    }
}

impl Default for DepthEncoder {
    fn default() -> Self {
        Self {
            far_plane_mm: DEFAULT_FAR_PLANE_MM,
            output: ColorFrame::black(0, 0),
        }
    }
}
