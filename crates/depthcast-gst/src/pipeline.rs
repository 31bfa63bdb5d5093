//! Launch Description Assembly
//!
//! Produces the `gst-launch` style text handed to `gst::parse::launch`:
//!
//! ```text
//! flvmux name=mux ... ! rtmpsink location="..."
//! appsrc name=mysource ... caps="video/x-raw,format=BGR,..." ! <video chain> ! mux.
//! <audio chain> ! mux.
//! ```
//!
//! The muxer and sink come first so both branches can link to `mux.` by
//! name. The audio branch is left out when audio is disabled.

use crate::config::SenderConfig;
use crate::platform::Platform;

/// Raw video caps for the stacked BGR picture
///
/// `height` is the stacked height, i.e. twice the source frame height.
#[must_use]
pub fn video_caps(width: u32, height: u32, framerate: u32) -> String {
    format!(
        "video/x-raw,format=BGR,width={width},height={height},\
         framerate=(fraction){framerate}/1,pixel-aspect-ratio=(fraction)1/1"
    )
}

/// Builder for the sender's launch description
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    platform: Platform,
    rtmp_url: String,
    width: u32,
    stream_height: u32,
    framerate: u32,
    include_audio: bool,
    source_name: String,
}

impl PipelineBuilder {
    /// Start from a sender configuration
    #[must_use]
    pub fn from_config(config: &SenderConfig) -> Self {
        Self {
            platform: config.platform,
            rtmp_url: config.rtmp_url.clone(),
            width: config.width,
            stream_height: config.stream_height(),
            framerate: config.framerate,
            include_audio: config.include_audio,
            source_name: config.source_name.clone(),
        }
    }

    /// Override the platform profile
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Include or omit the audio branch
    #[must_use]
    pub fn include_audio(mut self, enable: bool) -> Self {
        self.include_audio = enable;
        self
    }

    /// The `appsrc` element with its caps
    #[must_use]
    pub fn source(&self) -> String {
        format!(
            "appsrc name={} format=TIME do-timestamp=TRUE is-live=TRUE caps=\"{}\"",
            self.source_name,
            video_caps(self.width, self.stream_height, self.framerate)
        )
    }

    /// Assemble the full launch description
    #[must_use]
    pub fn build(&self) -> String {
        let mut description = format!(
            "{} ! {} {} ! {} ! mux.",
            self.platform.muxer(),
            self.platform.sink(&self.rtmp_url),
            self.source(),
            self.platform.video_chain(),
        );

        if self.include_audio {
            description.push(' ');
            description.push_str(self.platform.audio_chain());
            description.push_str(" ! mux.");
        }

        description
    }
}

/// Launch description for a configuration
///
/// A custom pipeline in the configuration is returned unchanged.
#[must_use]
pub fn launch_description(config: &SenderConfig) -> String {
    match config.custom_pipeline {
        Some(ref custom) => custom.clone(),
        None => PipelineBuilder::from_config(config).build(),
    }
}
