//! Error types for the RTMP sender
//!
//! Pipeline bus errors are not Rust errors: they reach the supervisor as
//! [`StatusEvent`](crate::StatusEvent)s. This module covers failures on the
//! Rust side, i.e. building the pipeline, feeding it and managing the
//! worker thread.

use depthcast_frame::FrameError;
use gstreamer as gst;
use thiserror::Error;

/// Errors that can occur while setting up or driving the sender
///
/// # Examples
///
/// ```rust,ignore
/// use depthcast_gst::{RtmpSender, SenderConfig, SenderError};
///
/// let mut sender = RtmpSender::new(SenderConfig::default())?;
/// match sender.start() {
///     Ok(channels) => { /* feed frames */ }
///     Err(SenderError::PipelineParse(e)) => {
///         eprintln!("Missing GStreamer plugin? {}", e);
///     }
///     Err(e) => eprintln!("Sender failed: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SenderError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// GStreamer could not be initialised
    #[error("GStreamer initialisation failed: {0}")]
    Init(#[source] gst::glib::Error),

    /// The launch description could not be parsed
    ///
    /// Usually a missing plugin, e.g. `omxh264enc` off a Raspberry Pi.
    #[error("Failed to parse pipeline: {0}")]
    PipelineParse(#[source] gst::glib::Error),

    /// The launch description produced a single element, not a pipeline
    #[error("Launch description did not produce a pipeline")]
    NotAPipeline,

    /// A named element is missing from the pipeline
    #[error("Element not found in pipeline: {0}")]
    ElementNotFound(String),

    /// A pipeline state transition was refused
    #[error("Pipeline state change failed: {0}")]
    StateChange(#[from] gst::StateChangeError),

    /// A frame could not be prepared
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Operation not allowed in the current sender state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The frame queue is full; the frame was dropped
    #[error("Frame queue full")]
    QueueFull,

    /// The worker thread is gone
    #[error("Sender worker disconnected")]
    Disconnected,

    /// The worker thread could not be spawned
    #[error("Failed to spawn worker thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// The worker thread panicked
    #[error("Sender worker thread panicked")]
    ThreadPanicked,
}

/// Result type for sender operations
pub type Result<T> = std::result::Result<T, SenderError>;

impl SenderError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub(crate) fn element_not_found(name: impl Into<String>) -> Self {
        Self::ElementNotFound(name.into())
    }

    /// Whether retrying with the same configuration could succeed
    ///
    /// Queue pressure is transient; everything else needs a config change
    /// or a restart.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::QueueFull)
    }
}
