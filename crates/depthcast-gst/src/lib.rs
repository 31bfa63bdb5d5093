//! # depthcast-gst
//!
//! Stream paired color/depth frames to an RTMP server through a GStreamer
//! pipeline.
//!
//! This crate is part of the [depthcast](https://github.com/lamco-admin/depthcast)
//! workspace and uses [`depthcast-frame`](https://crates.io/crates/depthcast-frame)
//! to pack each depth frame into color before it is encoded.
//!
//! # Features
//!
//! - **Platform Profiles**: Hardware H.264 on Raspberry Pi, macOS and Windows,
//!   software x264 elsewhere
//! - **Dedicated Worker**: All GStreamer objects live on one thread
//! - **Bounded Intake**: Frames are dropped, not queued without limit, when
//!   the encoder falls behind
//! - **Status Relay**: Bus errors, warnings, EOS, info and state changes
//!   reach the supervisor as typed events
//! - **Preview Output**: The frames actually sent, for local display
//!
//! # Requirements
//!
//! - **GStreamer 1.x** runtime and development libraries
//! - Plugins for the chosen profile (`rtmp`, `flv`, the H.264 encoder and,
//!   with audio enabled, an AAC encoder)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use depthcast_gst::{Platform, RtmpSender, SenderConfig};
//!
//! let config = SenderConfig::builder()
//!     .rtmp_url("rtmp://live.example.com/app/stream-key")
//!     .resolution(640, 480)
//!     .platform(Platform::Software)
//!     .build();
//!
//! let mut sender = RtmpSender::new(config)?;
//! let channels = sender.start()?;
//!
//! // feed RgbdFrames from the camera thread
//! channels.frames.send(frame)?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application                                            │
//! │                                                         │
//! │  camera ──▶ FrameSender          StatusReceiver ──▶ UI  │
//! │                  │                     ▲                │
//! └──────────────────┼─────────────────────┼────────────────┘
//!                    │ bounded queue       │ status events
//! ┌──────────────────▼─────────────────────┼────────────────┐
//! │  Worker thread (std::thread)           │                │
//! │                                        │                │
//! │  DepthEncoder ─▶ stack ─▶ appsrc    bus┘                │
//! │                             │                           │
//! │                 videoconvert ─▶ h264 ─▶ flvmux ─▶ rtmp  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Status Events
//!
//! Each [`StatusEvent`] has a text form (`ERROR: ...`, `WARNING: ...`,
//! `INFO: ...`, `STREAM_STATE_CHANGED: ...`) for supervisors that consume
//! plain lines. An `ERROR` stops the sender.

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod sender;
pub mod status;

mod worker;

// =============================================================================
// RE-EXPORTS - PRIMARY API
// =============================================================================

// Sender (primary entry point)
pub use sender::{
    FrameSender, PreviewReceiver, RtmpSender, SenderChannels, SenderState, SenderStats,
    StatusReceiver,
};

// Configuration
pub use config::{SenderConfig, SenderConfigBuilder, DEFAULT_SOURCE_NAME};
pub use platform::{Platform, FLASH_VERSION};

// Errors
pub use error::{Result, SenderError};

// Pipeline
pub use pipeline::{launch_description, video_caps, PipelineBuilder};
pub use status::{state_nick, StatusEvent, RELAYED_MESSAGE_TYPES};

// Frame types, so callers need only this crate
pub use depthcast_frame::{ColorFrame, DepthFrame, PreviewFrame, RgbdFrame};

// =============================================================================
// CRATE-LEVEL ITEMS
// =============================================================================

use gstreamer as gst;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize GStreamer
///
/// The sender initialises GStreamer on its worker thread, so calling this is
/// optional. It is useful to fail early, before any frames are produced.
pub fn init() -> Result<()> {
    gst::init().map_err(SenderError::Init)
}

/// Check whether an element factory is installed
///
/// Returns `false` if GStreamer cannot be initialised.
#[must_use]
pub fn has_element(factory: &str) -> bool {
    gst::init().is_ok() && gst::ElementFactory::find(factory).is_some()
}

/// Element factories a profile needs that are not installed
///
/// An empty list means the profile's pipeline should parse.
#[must_use]
pub fn missing_elements(platform: Platform, include_audio: bool) -> Vec<&'static str> {
    let mut required = vec![
        "appsrc",
        "videoconvert",
        platform.video_encoder(),
        "h264parse",
        "flvmux",
        "rtmpsink",
    ];
    if include_audio {
        required.extend(audio_elements(platform));
    }

    required.into_iter().filter(|f| !has_element(f)).collect()
}

fn audio_elements(platform: Platform) -> [&'static str; 3] {
    match platform {
        Platform::RaspberryPi => ["alsasrc", "voaacenc", "aacparse"],
        Platform::MacOs => ["osxaudiosrc", "faac", "aacparse"],
        Platform::Windows => ["wasapisrc", "mfaacenc", "aacparse"],
        Platform::Software => ["autoaudiosrc", "voaacenc", "aacparse"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_missing_elements_reports_unknown_factories() {
        if init().is_err() {
            return;
        }

        assert!(!has_element("no-such-element-xyz"));
        // every listed element is one the profile actually uses
        let description = PipelineBuilder::from_config(
            &SenderConfig::builder().platform(Platform::Software).build(),
        )
        .build();
        for element in missing_elements(Platform::Software, true) {
            assert!(description.contains(element), "{element} not in pipeline");
        }
    }
}
