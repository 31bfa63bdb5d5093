//! # depthcast-frame
//!
//! RGB-D frame types and depth-to-hue color packing for video transport.
//!
//! This crate is part of the [depthcast](https://github.com/lamco-admin/depthcast)
//! workspace and prepares frames for [`depthcast-gst`](https://crates.io/crates/depthcast-gst),
//! which pushes them into a GStreamer RTMP pipeline.
//!
//! # Features
//!
//! - **Frame Types**: Packed BGR8 color frames and 16-bit depth frames
//! - **Depth Packing**: Depth stored as HSV hue so it survives 8-bit codecs
//! - **Far Plane Clipping**: Samples beyond a configurable distance render black
//! - **Stacking**: Color and encoded depth combined into one double-height picture
//! - **Decoding**: Receiver-side recovery of depth from the colorized half
//!
//! # Quick Start
//!
//! ```rust
//! use depthcast_frame::{stack_frames, ColorFrame, DepthEncoder, DepthFrame};
//!
//! let color = ColorFrame::black(640, 480);
//! let depth = DepthFrame::new(640, 480, vec![1200; 640 * 480]).unwrap();
//!
//! let mut encoder = DepthEncoder::default();
//! let colorized = encoder.encode(&depth);
//! let stacked = stack_frames(&color, colorized).unwrap();
//!
//! assert_eq!(stacked.size(), (640, 960));
//! ```
//!
//! # Frame Layout
//!
//! ```text
//! ┌────────────────────┐  row 0
//! │   color (BGR8)     │
//! │                    │
//! ├────────────────────┤  row H
//! │   depth as hue     │
//! │   (BGR8)           │
//! └────────────────────┘  row 2H
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod depth;
pub mod error;
pub mod frame;
pub mod hsv;
pub mod stack;

// =============================================================================
// RE-EXPORTS - PRIMARY API
// =============================================================================

pub use depth::{decode_depth, encode_depth, DepthEncoder, DEFAULT_FAR_PLANE_MM};
pub use error::{FrameError, Result};
pub use frame::{ColorFrame, DepthFrame, PreviewFrame, RgbdFrame, StackedFrame, BGR_BYTES_PER_PIXEL};
pub use stack::{split_stacked, stack_frames};

// =============================================================================
// CRATE-LEVEL ITEMS
// =============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size in bytes of one stacked frame for the given source dimensions
#[must_use]
pub fn stacked_frame_size(width: u32, height: u32) -> usize {
    ColorFrame::byte_len(width, height) * 2
}
