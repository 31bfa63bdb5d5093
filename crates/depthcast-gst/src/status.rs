//! Pipeline Status Events
//!
//! Bus messages the supervisor cares about, translated into a small typed
//! enum. Each event also has a one-line text form which existing
//! supervisors parse by prefix:
//!
//! | Event          | Text                                            |
//! |----------------|-------------------------------------------------|
//! | `EndOfStream`  | `WARNING: End of Stream`                        |
//! | `Info`         | `INFO: <source>, <details>`                     |
//! | `StateChanged` | `STREAM_STATE_CHANGED: <source>, <old>, <new>`  |
//! | `Warning`      | `WARNING: <message>, <debug>`                   |
//! | `Error`        | `ERROR: <message>, <debug>`                     |
//!
//! The `, <debug>` suffix is omitted when the element gave no debug detail.

use std::fmt;

use gstreamer as gst;
use gstreamer::prelude::GstObjectExt;

/// Bus message types relayed to the supervisor
pub const RELAYED_MESSAGE_TYPES: [gst::MessageType; 5] = [
    gst::MessageType::Error,
    gst::MessageType::Warning,
    gst::MessageType::Eos,
    gst::MessageType::Info,
    gst::MessageType::StateChanged,
];

/// Status reported by the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The pipeline reached end of stream
    EndOfStream,

    /// Informational message from an element
    Info { source: String, details: String },

    /// An element changed state
    StateChanged {
        source: String,
        old: gst::State,
        current: gst::State,
    },

    /// Non-fatal problem reported by an element
    Warning {
        message: String,
        debug: Option<String>,
    },

    /// Fatal problem; the sender stops after reporting it
    Error {
        message: String,
        debug: Option<String>,
    },
}

impl StatusEvent {
    /// Translate a bus message
    ///
    /// Returns `None` for message types outside [`RELAYED_MESSAGE_TYPES`].
    pub fn from_message(message: &gst::MessageRef) -> Option<Self> {
        use gst::MessageView;

        let source = || {
            message
                .src()
                .map_or_else(|| "unknown".to_string(), |src| src.name().to_string())
        };

        match message.view() {
            MessageView::Eos(_) => Some(Self::EndOfStream),
            MessageView::Info(info) => Some(Self::Info {
                source: source(),
                details: message
                    .structure()
                    .map_or_else(|| info.error().to_string(), ToString::to_string),
            }),
            MessageView::StateChanged(change) => Some(Self::StateChanged {
                source: source(),
                old: change.old(),
                current: change.current(),
            }),
            MessageView::Warning(warning) => Some(Self::Warning {
                message: warning.error().to_string(),
                debug: warning.debug().map(|d| d.to_string()),
            }),
            MessageView::Error(error) => Some(Self::Error {
                message: error.error().to_string(),
                debug: error.debug().map(|d| d.to_string()),
            }),
            _ => None,
        }
    }

    /// Event reported when the pipeline cannot be paused on shutdown
    #[must_use]
    pub fn pause_failed() -> Self {
        Self::Error {
            message: "Error pausing gstreamer".to_string(),
            debug: None,
        }
    }

    /// Whether this event stops the sender
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Text prefix of the event's line form
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EndOfStream | Self::Warning { .. } => "WARNING",
            Self::Info { .. } => "INFO",
            Self::StateChanged { .. } => "STREAM_STATE_CHANGED",
            Self::Error { .. } => "ERROR",
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "WARNING: End of Stream"),
            Self::Info { source, details } => write!(f, "INFO: {source}, {details}"),
            Self::StateChanged {
                source,
                old,
                current,
            } => write!(
                f,
                "STREAM_STATE_CHANGED: {}, {}, {}",
                source,
                state_nick(*old),
                state_nick(*current)
            ),
            Self::Warning { message, debug } | Self::Error { message, debug } => match debug {
                Some(debug) => write!(f, "{}: {}, {}", self.kind(), message, debug),
                None => write!(f, "{}: {}", self.kind(), message),
            },
        }
    }
}

/// GStreamer's short name for a state
#[must_use]
pub fn state_nick(state: gst::State) -> &'static str {
    match state {
        gst::State::VoidPending => "void-pending",
        gst::State::Null => "null",
        gst::State::Ready => "ready",
        gst::State::Paused => "paused",
        gst::State::Playing => "playing",
        _ => "unknown",
    }
}
