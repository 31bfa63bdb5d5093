//! Vertical frame stacking
//!
//! The color frame and its hue-packed depth frame travel as one picture of
//! twice the height: color rows first, depth rows after. Both halves stay
//! pixel-aligned, so the receiver can split at `height / 2`.

use crate::error::{FrameError, Result};
use crate::frame::{ColorFrame, StackedFrame};

/// Stack `top` over `bottom`
///
/// Both frames must have the same dimensions.
///
/// # Examples
///
/// ```rust
/// use depthcast_frame::{stack_frames, ColorFrame};
///
/// let color = ColorFrame::new(1, 1, vec![1, 2, 3]).unwrap();
/// let depth = ColorFrame::new(1, 1, vec![4, 5, 6]).unwrap();
///
/// let stacked = stack_frames(&color, &depth).unwrap();
/// assert_eq!(stacked.size(), (1, 2));
/// assert_eq!(stacked.data(), &[1, 2, 3, 4, 5, 6]);
/// ```
pub fn stack_frames(top: &ColorFrame, bottom: &ColorFrame) -> Result<StackedFrame> {
    if top.size() != bottom.size() {
        return Err(FrameError::dimension_mismatch(top.size(), bottom.size()));
    }

    let expected = ColorFrame::byte_len(top.width, top.height);
    for half in [top, bottom] {
        if half.data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: half.data.len(),
            });
        }
    }

    let mut data = Vec::with_capacity(top.data.len() + bottom.data.len());
    data.extend_from_slice(&top.data);
    data.extend_from_slice(&bottom.data);

    Ok(StackedFrame {
        width: top.width,
        height: top.height.saturating_mul(2),
        data,
    })
}

/// Split a stacked frame back into its top and bottom halves
pub fn split_stacked(stacked: &StackedFrame) -> Result<(ColorFrame, ColorFrame)> {
    let half_height = stacked.height / 2;
    let half_len = ColorFrame::byte_len(stacked.width, half_height);

    if stacked.height % 2 != 0 || stacked.data.len() != half_len * 2 {
        return Err(FrameError::BufferSize {
            expected: ColorFrame::byte_len(stacked.width, stacked.height - stacked.height % 2),
            actual: stacked.data.len(),
        });
    }

    let (top, bottom) = stacked.data.split_at(half_len);
    Ok((
        ColorFrame::new(stacked.width, half_height, top.to_vec())?,
        ColorFrame::new(stacked.width, half_height, bottom.to_vec())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_layout() {
        let color = ColorFrame::new(2, 2, (0..12).collect()).expect("color");
        let depth = ColorFrame::new(2, 2, (100..112).collect()).expect("depth");

        let stacked = stack_frames(&color, &depth).expect("stack");
        assert_eq!(stacked.width, 2);
        assert_eq!(stacked.height, 4);
        assert_eq!(stacked.data.len(), 24);
        assert_eq!(&stacked.data[..12], color.data.as_slice());
        assert_eq!(&stacked.data[12..], depth.data.as_slice());
    }

    #[test]
    fn test_stack_rejects_mismatch() {
        let color = ColorFrame::black(4, 2);
        let depth = ColorFrame::black(4, 3);

        assert_eq!(
            stack_frames(&color, &depth).unwrap_err(),
            FrameError::DimensionMismatch {
                left_width: 4,
                left_height: 2,
                right_width: 4,
                right_height: 3,
            }
        );
    }

    #[test]
    fn test_stack_rejects_short_buffer() {
        let short = ColorFrame {
            width: 2,
            height: 2,
            data: Vec::new(),
        };
        let full = ColorFrame::black(2, 2);

        assert_eq!(
            stack_frames(&short, &full).unwrap_err(),
            FrameError::BufferSize {
                expected: 12,
                actual: 0,
            }
        );
        assert!(stack_frames(&full, &short).is_err());
    }

    #[test]
    fn test_split_stacked() {
        let color = ColorFrame::new(1, 2, vec![1, 1, 1, 2, 2, 2]).expect("color");
        let depth = ColorFrame::new(1, 2, vec![3, 3, 3, 4, 4, 4]).expect("depth");
        let stacked = stack_frames(&color, &depth).expect("stack");

        let (top, bottom) = split_stacked(&stacked).expect("split");
        assert_eq!(top, color);
        assert_eq!(bottom, depth);
    }

    #[test]
    fn test_split_rejects_odd_height() {
        let stacked = StackedFrame {
            width: 1,
            height: 3,
            data: vec![0; 9],
        };
        assert!(split_stacked(&stacked).is_err());
    }
}
