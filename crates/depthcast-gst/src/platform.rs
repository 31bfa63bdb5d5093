//! Platform Pipeline Profiles
//!
//! Each target has its own hardware H.264 encoder and audio capture source.
//! A profile names the GStreamer elements for one target; [`crate::pipeline`]
//! assembles them into a launch description.
//!
//! | Platform      | Video encoder | Audio source   |
//! |---------------|---------------|----------------|
//! | `RaspberryPi` | `omxh264enc`  | `alsasrc`      |
//! | `MacOs`       | `vtenc_h264`  | `osxaudiosrc`  |
//! | `Windows`     | `mfh264enc`   | `wasapisrc`    |
//! | `Software`    | `x264enc`     | `autoaudiosrc` |

use std::fmt;
use std::str::FromStr;

use crate::error::SenderError;

/// Flash version string some RTMP servers require from live publishers
pub const FLASH_VERSION: &str = "FME/3.0%20(compatible;%20FMSc%201.0)";

/// Target platform for the encoding pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Raspberry Pi with the OpenMAX hardware encoder
    RaspberryPi,

    /// macOS with VideoToolbox
    MacOs,

    /// Windows with Media Foundation
    Windows,

    /// Any host, software x264 encoding
    Software,
}

impl Platform {
    /// Detect the platform from the compilation target
    ///
    /// Linux is assumed to be a Raspberry Pi. Use [`Platform::Software`]
    /// explicitly on desktop Linux.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Self::RaspberryPi
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Software
        }
    }

    /// Name of the H.264 encoder element
    #[must_use]
    pub fn video_encoder(self) -> &'static str {
        match self {
            Self::RaspberryPi => "omxh264enc",
            Self::MacOs => "vtenc_h264",
            Self::Windows => "mfh264enc",
            Self::Software => "x264enc",
        }
    }

    /// Elements from raw video to the muxer's input queue
    #[must_use]
    pub fn video_chain(self) -> String {
        match self {
            Self::RaspberryPi => format!(
                "videoconvert ! {} ! h264parse ! video/x-h264 ! \
                 queue max-size-buffers=0 max-size-bytes=0 max-size-time=180000000 \
                 min-threshold-buffers=1 leaky=upstream",
                self.video_encoder()
            ),
            Self::MacOs => format!(
                "videoconvert ! {} ! video/x-h264 ! h264parse ! video/x-h264 ! queue max-size-buffers=4",
                self.video_encoder()
            ),
            Self::Windows => format!(
                "videoconvert ! {} ! h264parse ! video/x-h264 ! queue max-size-buffers=4",
                self.video_encoder()
            ),
            Self::Software => format!(
                "videoconvert ! {} tune=zerolatency speed-preset=veryfast key-int-max=60 ! \
                 h264parse ! video/x-h264 ! queue max-size-buffers=4",
                self.video_encoder()
            ),
        }
    }

    /// Elements from audio capture to the muxer's input queue
    #[must_use]
    pub fn audio_chain(self) -> &'static str {
        match self {
            Self::RaspberryPi => {
                "alsasrc ! audio/x-raw,format=S16LE,rate=44100,channels=1 ! voaacenc bitrate=44100 ! \
                 aacparse ! audio/mpeg,mpegversion=4 ! \
                 queue max-size-buffers=0 max-size-bytes=0 max-size-time=4000000000 min-threshold-buffers=1"
            }
            Self::MacOs => {
                "osxaudiosrc do-timestamp=true ! audioconvert ! audioresample ! audio/x-raw,rate=48000 ! \
                 faac bitrate=48000 ! audio/mpeg ! aacparse ! audio/mpeg,mpegversion=4 ! queue max-size-buffers=4"
            }
            Self::Windows => {
                "wasapisrc ! audioconvert ! audioresample ! audio/x-raw,rate=48000 ! mfaacenc ! \
                 aacparse ! audio/mpeg,mpegversion=4 ! queue max-size-buffers=4"
            }
            Self::Software => {
                "autoaudiosrc ! audioconvert ! audioresample ! audio/x-raw,rate=48000 ! voaacenc ! \
                 aacparse ! audio/mpeg,mpegversion=4 ! queue max-size-buffers=4"
            }
        }
    }

    /// FLV muxer element, named `mux`
    #[must_use]
    pub fn muxer(self) -> &'static str {
        match self {
            Self::RaspberryPi => "flvmux name=mux streamable=true latency=3000000000",
            Self::MacOs => "flvmux name=mux",
            Self::Windows | Self::Software => "flvmux name=mux streamable=true",
        }
    }

    /// RTMP sink element publishing to `url`
    #[must_use]
    pub fn sink(self, url: &str) -> String {
        match self {
            Self::RaspberryPi => {
                format!("rtmpsink location=\"{url} live=1 flashver={FLASH_VERSION}\"")
            }
            Self::MacOs => format!("rtmpsink location=\"{url}\" sync=true"),
            Self::Windows | Self::Software => format!("rtmpsink location=\"{url} live=1\""),
        }
    }

    /// Short identifier, as accepted by [`FromStr`]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RaspberryPi => "rpi",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Software => "software",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rpi" | "raspberrypi" | "linux" => Ok(Self::RaspberryPi),
            "macos" | "darwin" | "osx" => Ok(Self::MacOs),
            "windows" | "win" => Ok(Self::Windows),
            "software" | "x264" => Ok(Self::Software),
            other => Err(SenderError::invalid_config(format!("unknown platform '{other}'"))),
        }
    }
}
