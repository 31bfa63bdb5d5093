//! Error types for frame preparation

use thiserror::Error;

/// Errors raised while validating, encoding or stacking frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Two frames that must share dimensions do not
    ///
    /// Color and depth frames of an RGB-D pair, and the two halves of a
    /// stacked frame, must have identical width and height.
    #[error("Frame dimensions differ: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    /// The pixel buffer length does not match the declared dimensions
    #[error("Buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// The far plane must be a positive distance
    #[error("Invalid far plane: {0} mm")]
    InvalidFarPlane(u16),
}

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    pub(crate) fn dimension_mismatch(left: (u32, u32), right: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            left_width: left.0,
            left_height: left.1,
            right_width: right.0,
            right_height: right.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::dimension_mismatch((640, 480), (320, 240));
        assert_eq!(err.to_string(), "Frame dimensions differ: 640x480 vs 320x240");

        let err = FrameError::BufferSize {
            expected: 12,
            actual: 9,
        };
        assert_eq!(err.to_string(), "Buffer size mismatch: expected 12 elements, got 9");

        assert_eq!(FrameError::InvalidFarPlane(0).to_string(), "Invalid far plane: 0 mm");
    }
}
