//! Sender Configuration
//!
//! Provides configuration options for the RTMP sender with a builder pattern
//! for ergonomic construction.
//!
//! # Examples
//!
//! ```rust
//! use depthcast_gst::{Platform, SenderConfig};
//!
//! // Using builder pattern
//! let config = SenderConfig::builder()
//!     .rtmp_url("rtmp://live.example.com/app/stream-key")
//!     .resolution(640, 480)
//!     .platform(Platform::Software)
//!     .include_audio(false)
//!     .build();
//!
//! assert!(config.validate().is_ok());
//!
//! // Using struct literal with defaults
//! let config = SenderConfig {
//!     framerate: 15,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use depthcast_frame::DEFAULT_FAR_PLANE_MM;

use crate::platform::Platform;

/// Name given to the `appsrc` element the sender pushes into
pub const DEFAULT_SOURCE_NAME: &str = "mysource";

/// Configuration for the RTMP sender
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// RTMP publish URL, `rtmp://` or `rtmps://`
    pub rtmp_url: String,

    /// Width of each source frame in pixels (default: 640)
    pub width: u32,

    /// Height of each source frame in pixels (default: 480)
    ///
    /// The streamed picture is twice this height.
    pub height: u32,

    /// Frame rate advertised in the source caps (default: 30)
    pub framerate: u32,

    /// Encoding profile (default: detected from the build target)
    pub platform: Platform,

    /// Capture and mux an audio track (default: true)
    pub include_audio: bool,

    /// Depth beyond which samples render black, in millimetres (default: 4000)
    pub far_plane_mm: u16,

    /// Frames the producer may queue ahead of the worker (default: 8)
    pub frame_queue_size: usize,

    /// Preview frames held for the consumer before dropping (default: 2)
    ///
    /// Zero disables preview output.
    pub preview_queue_size: usize,

    /// Pause after each pushed frame (default: 5ms)
    pub frame_pacing: Duration,

    /// Maximum wait for a frame before servicing the bus (default: 50ms)
    pub poll_interval: Duration,

    /// Name of the `appsrc` element (default: "mysource")
    pub source_name: String,

    /// Launch description used instead of the platform profile (default: None)
    ///
    /// Must contain an `appsrc` named [`SenderConfig::source_name`].
    pub custom_pipeline: Option<String>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            rtmp_url: "rtmp://localhost/live/depthcast".to_string(),
            width: 640,
            height: 480,
            framerate: 30,
            platform: Platform::detect(),
            include_audio: true,
            far_plane_mm: DEFAULT_FAR_PLANE_MM,
            frame_queue_size: 8,
            preview_queue_size: 2,
            frame_pacing: Duration::from_millis(5),
            poll_interval: Duration::from_millis(50),
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            custom_pipeline: None,
        }
    }
}

impl SenderConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> SenderConfigBuilder {
        SenderConfigBuilder::default()
    }

    /// Height of the stacked picture sent to the encoder
    #[must_use]
    pub fn stream_height(&self) -> u32 {
        self.height.saturating_mul(2)
    }

    /// Validate configuration and return any issues
    ///
    /// Returns `Ok(())` if configuration is valid, or a list of issues.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if !(self.rtmp_url.starts_with("rtmp://") || self.rtmp_url.starts_with("rtmps://")) {
            issues.push("rtmp_url must start with rtmp:// or rtmps://".to_string());
        }

        if self.rtmp_url.contains('"') {
            issues.push("rtmp_url must not contain double quotes".to_string());
        }

        if self.width == 0 || self.height == 0 {
            issues.push("width and height must be at least 1".to_string());
        }

        if i32::try_from(self.stream_height()).is_err() || i32::try_from(self.width).is_err() {
            issues.push("frame dimensions exceed caps range".to_string());
        }

        if self.framerate == 0 {
            issues.push("framerate must be at least 1".to_string());
        }

        if self.far_plane_mm == 0 {
            issues.push("far_plane_mm must be at least 1".to_string());
        }

        if self.frame_queue_size == 0 {
            issues.push("frame_queue_size must be at least 1".to_string());
        }

        if self.poll_interval.is_zero() {
            issues.push("poll_interval must be non-zero".to_string());
        }

        if self.source_name.is_empty() {
            issues.push("source_name cannot be empty".to_string());
        }

        if let Some(ref custom) = self.custom_pipeline {
            if !custom.contains(&format!("name={}", self.source_name)) {
                issues.push(format!(
                    "custom_pipeline must contain an appsrc named '{}'",
                    self.source_name
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Builder for [`SenderConfig`]
///
/// Provides a fluent interface for constructing configuration.
#[derive(Debug, Clone, Default)]
pub struct SenderConfigBuilder {
    rtmp_url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    framerate: Option<u32>,
    platform: Option<Platform>,
    include_audio: Option<bool>,
    far_plane_mm: Option<u16>,
    frame_queue_size: Option<usize>,
    preview_queue_size: Option<usize>,
    frame_pacing: Option<Duration>,
    poll_interval: Option<Duration>,
    source_name: Option<String>,
    custom_pipeline: Option<String>,
}

impl SenderConfigBuilder {
    /// Set the RTMP publish URL
    #[must_use]
    pub fn rtmp_url(mut self, url: impl Into<String>) -> Self {
        self.rtmp_url = Some(url.into());
        self
    }

    /// Set source frame width and height
    #[must_use]
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set advertised frame rate
    #[must_use]
    pub fn framerate(mut self, fps: u32) -> Self {
        self.framerate = Some(fps);
        self
    }

    /// Set encoding platform profile
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set whether to mux an audio track
    #[must_use]
    pub fn include_audio(mut self, enable: bool) -> Self {
        self.include_audio = Some(enable);
        self
    }

    /// Set depth far plane in millimetres
    #[must_use]
    pub fn far_plane_mm(mut self, mm: u16) -> Self {
        self.far_plane_mm = Some(mm);
        self
    }

    /// Set frame queue size
    #[must_use]
    pub fn frame_queue_size(mut self, size: usize) -> Self {
        self.frame_queue_size = Some(size);
        self
    }

    /// Set preview queue size
    #[must_use]
    pub fn preview_queue_size(mut self, size: usize) -> Self {
        self.preview_queue_size = Some(size);
        self
    }

    /// Set pause after each pushed frame
    #[must_use]
    pub fn frame_pacing(mut self, pacing: Duration) -> Self {
        self.frame_pacing = Some(pacing);
        self
    }

    /// Set idle poll interval
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set `appsrc` element name
    #[must_use]
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Use a custom launch description
    #[must_use]
    pub fn custom_pipeline(mut self, description: impl Into<String>) -> Self {
        self.custom_pipeline = Some(description.into());
        self
    }

    /// Build the configuration
    ///
    /// Returns a [`SenderConfig`] with builder values overriding defaults.
    #[must_use]
    pub fn build(self) -> SenderConfig {
        let defaults = SenderConfig::default();

        SenderConfig {
            rtmp_url: self.rtmp_url.unwrap_or(defaults.rtmp_url),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            framerate: self.framerate.unwrap_or(defaults.framerate),
            platform: self.platform.unwrap_or(defaults.platform),
            include_audio: self.include_audio.unwrap_or(defaults.include_audio),
            far_plane_mm: self.far_plane_mm.unwrap_or(defaults.far_plane_mm),
            frame_queue_size: self.frame_queue_size.unwrap_or(defaults.frame_queue_size),
            preview_queue_size: self
                .preview_queue_size
                .unwrap_or(defaults.preview_queue_size),
            frame_pacing: self.frame_pacing.unwrap_or(defaults.frame_pacing),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            source_name: self.source_name.unwrap_or(defaults.source_name),
            custom_pipeline: self.custom_pipeline.or(defaults.custom_pipeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SenderConfig::default();

        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.stream_height(), 960);
        assert_eq!(config.framerate, 30);
        assert_eq!(config.far_plane_mm, 4000);
        assert!(config.include_audio);
        assert_eq!(config.source_name, "mysource");
        assert_eq!(config.frame_pacing, Duration::from_millis(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SenderConfig::builder()
            .rtmp_url("rtmps://ingest.example.com/app/key")
            .resolution(1280, 720)
            .framerate(15)
            .platform(Platform::MacOs)
            .include_audio(false)
            .far_plane_mm(6000)
            .build();

        assert_eq!(config.rtmp_url, "rtmps://ingest.example.com/app/key");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.framerate, 15);
        assert_eq!(config.platform, Platform::MacOs);
        assert!(!config.include_audio);
        assert_eq!(config.far_plane_mm, 6000);
        // untouched fields keep their defaults
        assert_eq!(config.frame_queue_size, 8);
    }

    #[test]
    fn test_config_validation() {
        let invalid = SenderConfig {
            rtmp_url: "http://example.com/live".to_string(),
            width: 0,
            frame_queue_size: 0,
            ..Default::default()
        };
        let issues = invalid.validate().unwrap_err();
        assert_eq!(issues.len(), 3);

        let quoted = SenderConfig::builder()
            .rtmp_url("rtmp://example.com/\"live\"")
            .build();
        assert!(quoted.validate().is_err());

        let zero_far = SenderConfig {
            far_plane_mm: 0,
            ..Default::default()
        };
        assert!(zero_far.validate().is_err());
    }

    #[test]
    fn test_custom_pipeline_needs_source() {
        let config = SenderConfig::builder()
            .custom_pipeline("appsrc name=other ! fakesink")
            .build();
        assert!(config.validate().is_err());

        let config = SenderConfig::builder()
            .custom_pipeline("appsrc name=mysource ! fakesink")
            .build();
        assert!(config.validate().is_ok());
    }
}
