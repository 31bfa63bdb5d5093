//! Frame types
//!
//! All color data is packed 8-bit BGR (three bytes per pixel, no padding
//! between rows), which is what the capture side produces and what the
//! streaming pipeline's `appsrc` caps advertise. Depth data is one `u16`
//! sample per pixel, in millimetres.

use crate::error::{FrameError, Result};

/// Bytes per pixel of packed BGR8
pub const BGR_BYTES_PER_PIXEL: usize = 3;

/// Packed BGR8 image
///
/// The buffer always holds exactly `width * height * 3` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl ColorFrame {
    /// Wrap an existing BGR8 buffer
    ///
    /// Fails if `data` does not hold exactly `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Create an all-black frame
    #[must_use]
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Required buffer length for the given dimensions
    #[must_use]
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BGR_BYTES_PER_PIXEL
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its pixel buffer
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Row stride in bytes
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize * BGR_BYTES_PER_PIXEL
    }

    /// `(width, height)`
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// BGR triple at `(x, y)`, or `None` when out of bounds
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BGR_BYTES_PER_PIXEL;
        let px = self.data.get(idx..idx + BGR_BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2]])
    }
}

/// 16-bit depth image in millimetres
///
/// One sample per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u16>,
}

impl DepthFrame {
    /// Wrap an existing depth buffer
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth samples in millimetres
    #[must_use]
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// `(width, height)`
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sample at `(x, y)`, or `None` when out of bounds
    #[must_use]
    pub fn sample(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// A color frame and the depth frame captured with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbdFrame {
    color: ColorFrame,
    depth: DepthFrame,
}

impl RgbdFrame {
    /// Pair a color and depth frame, checking that they line up
    pub fn new(color: ColorFrame, depth: DepthFrame) -> Result<Self> {
        if color.size() != depth.size() {
            return Err(FrameError::dimension_mismatch(color.size(), depth.size()));
        }
        Ok(Self { color, depth })
    }

    /// Dimensions shared by both halves
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.color.size()
    }

    /// Color half
    #[must_use]
    pub fn color(&self) -> &ColorFrame {
        &self.color
    }

    /// Depth half
    #[must_use]
    pub fn depth(&self) -> &DepthFrame {
        &self.depth
    }

    /// Split into the color and depth frames
    #[must_use]
    pub fn into_parts(self) -> (ColorFrame, DepthFrame) {
        (self.color, self.depth)
    }
}

/// Color frame with the encoded depth frame stacked underneath
///
/// `height` is twice the height of the source frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl StackedFrame {
    /// `(width, height)` of the whole picture
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel data, color rows first
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its pixel buffer
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// What the sender pushed for one frame, for local display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame {
    /// Color half as received
    pub color: ColorFrame,

    /// Depth half after hue packing
    pub depth_colorized: ColorFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_frame_size_check() {
        assert!(ColorFrame::new(2, 2, vec![0; 12]).is_ok());

        let err = ColorFrame::new(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_color_frame_pixel_access() {
        let frame = ColorFrame::new(2, 1, vec![1, 2, 3, 4, 5, 6]).expect("frame");
        assert_eq!(frame.stride(), 6);
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_accessors() {
        let frame = ColorFrame::black(3, 2);
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.data().len(), 18);
        assert_eq!(frame.into_data().len(), 18);

        let depth = DepthFrame::new(3, 2, vec![7; 6]).expect("depth");
        let pair = RgbdFrame::new(ColorFrame::black(3, 2), depth.clone()).expect("pair");
        assert_eq!(pair.depth(), &depth);
        let (color, _) = pair.into_parts();
        assert_eq!(color.size(), (3, 2));
    }

    #[test]
    fn test_short_buffer_lookup_returns_none() {
        let color = ColorFrame {
            width: 2,
            height: 2,
            data: vec![0; 3],
        };
        assert_eq!(color.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(color.pixel(1, 1), None);

        let depth = DepthFrame {
            width: 2,
            height: 2,
            data: vec![5],
        };
        assert_eq!(depth.sample(0, 0), Some(5));
        assert_eq!(depth.sample(1, 1), None);
    }

    #[test]
    fn test_depth_frame_size_check() {
        assert!(DepthFrame::new(3, 2, vec![0; 6]).is_ok());
        assert!(DepthFrame::new(3, 2, vec![0; 5]).is_err());

        let depth = DepthFrame::new(2, 2, vec![10, 20, 30, 40]).expect("depth");
        assert_eq!(depth.sample(0, 1), Some(30));
        assert_eq!(depth.sample(0, 2), None);
    }

    #[test]
    fn test_rgbd_pairing() {
        let color = ColorFrame::black(4, 2);
        let depth = DepthFrame::new(4, 2, vec![0; 8]).expect("depth");
        assert_eq!(RgbdFrame::new(color, depth).expect("pair").size(), (4, 2));

        let color = ColorFrame::black(4, 2);
        let depth = DepthFrame::new(2, 4, vec![0; 8]).expect("depth");
        assert!(matches!(
            RgbdFrame::new(color, depth),
            Err(FrameError::DimensionMismatch { .. })
        ));
    }
}
