//! # depthcast
//!
//! Pack RGB-D camera frames into a single video stream and publish it over RTMP.
//!
//! This crate provides a unified interface to the depthcast libraries:
//!
//! - **[`frame`]** - Frame types, depth-to-hue packing and frame stacking
//! - **[`gst`]** - GStreamer RTMP sender with a dedicated pipeline thread
//!
//! # Features
//!
//! Both features are enabled by default. The frame code has no system
//! dependencies, so receivers that only decode can leave GStreamer out:
//!
//! ```toml
//! # Everything (default)
//! depthcast = "0.1"
//!
//! # Packing and decoding only
//! depthcast = { version = "0.1", default-features = false, features = ["frame"] }
//! ```
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `frame` | Yes | Frame types and depth packing |
//! | `gst` | Yes | GStreamer RTMP sender (implies `frame`) |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use depthcast::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SenderConfig::builder()
//!         .rtmp_url("rtmp://localhost/live/depthcast")
//!         .resolution(640, 480)
//!         .build();
//!
//!     let mut sender = RtmpSender::new(config)?;
//!     let mut channels = sender.start()?;
//!
//!     let color = ColorFrame::black(640, 480);
//!     let depth = DepthFrame::new(640, 480, vec![1500; 640 * 480])?;
//!     channels.frames.send(RgbdFrame::new(color, depth)?)?;
//!
//!     while let Ok(event) = channels.status.try_recv() {
//!         println!("{event}");
//!     }
//!
//!     sender.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                       depthcast                       │
//! ├──────────────────────────┬────────────────────────────┤
//! │     depthcast-frame      │       depthcast-gst        │
//! │                          │                            │
//! │  ColorFrame, DepthFrame  │  RtmpSender                │
//! │  DepthEncoder            │  SenderConfig, Platform    │
//! │  stack_frames            │  StatusEvent               │
//! └────────────┬─────────────┴──────────────┬─────────────┘
//!              │                            │
//!              ▼                            ▼
//!     double-height BGR picture    appsrc ▶ H.264 ▶ FLV ▶ RTMP
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// RE-EXPORTS
// =============================================================================

/// RGB-D frame types and depth packing.
///
/// - Packed BGR8 color and 16-bit depth frames
/// - Depth encoded as HSV hue, clipped at a far plane
/// - Color over depth stacking, and the inverse split
///
/// See [`depthcast_frame`] documentation for details.
#[cfg(feature = "frame")]
#[cfg_attr(docsrs, doc(cfg(feature = "frame")))]
pub use depthcast_frame as frame;

/// GStreamer RTMP sender.
///
/// See [`depthcast_gst`] documentation for details.
#[cfg(feature = "gst")]
#[cfg_attr(docsrs, doc(cfg(feature = "gst")))]
pub use depthcast_gst as gst;

// =============================================================================
// PRELUDE - Common types for convenience
// =============================================================================

/// Prelude module with commonly used types.
///
/// ```rust
/// use depthcast::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "frame")]
    pub use depthcast_frame::{
        stack_frames, ColorFrame, DepthEncoder, DepthFrame, FrameError, PreviewFrame, RgbdFrame,
    };

    #[cfg(feature = "gst")]
    pub use depthcast_gst::{
        FrameSender, Platform, RtmpSender, SenderConfig, SenderError, SenderState, StatusEvent,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    #[cfg(feature = "frame")]
    fn test_frame_reexport() {
        assert_eq!(frame::DepthEncoder::default().far_plane_mm(), frame::DEFAULT_FAR_PLANE_MM);
    }

    #[test]
    #[cfg(feature = "gst")]
    fn test_gst_reexport() {
        let config = gst::SenderConfig::default();
        assert_eq!(config.stream_height(), config.height * 2);
    }
}
