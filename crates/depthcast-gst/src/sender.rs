//! RTMP Sender Manager
//!
//! Provides a single entry point for streaming RGB-D frames that hides the
//! worker thread behind a few channel ends.
//!
//! # Architecture
//!
//! The manager coordinates:
//! - Thread management (all GStreamer objects live on one worker thread)
//! - Pipeline lifecycle (build, PLAYING, PAUSED on shutdown, NULL on release)
//! - Frame intake with a bounded queue
//! - Status and preview delivery via channels
//!
//! # Examples
//!
//! ```rust,ignore
//! use depthcast_gst::{RtmpSender, SenderConfig};
//!
//! let config = SenderConfig::builder()
//!     .rtmp_url("rtmp://live.example.com/app/key")
//!     .resolution(640, 480)
//!     .build();
//!
//! let mut sender = RtmpSender::new(config)?;
//! let mut channels = sender.start()?;
//!
//! // Producer side
//! channels.frames.send(rgbd_frame)?;
//!
//! // Supervisor side
//! while let Some(event) = channels.status.blocking_recv() {
//!     println!("{}", event);
//! }
//!
//! sender.shutdown()?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;

use depthcast_frame::{FrameError, PreviewFrame, RgbdFrame};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SenderConfig;
use crate::error::{Result, SenderError};
use crate::status::StatusEvent;
use crate::worker::{SenderWorker, WorkerChannels};

/// Receiver for status events
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Receiver for preview frames
pub type PreviewReceiver = mpsc::Receiver<PreviewFrame>;

/// Sender lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Created, never started
    Idle,
    /// Building the pipeline
    Starting,
    /// Pipeline playing, accepting frames
    Streaming,
    /// Shutdown requested
    Stopping,
    /// Worker exited normally
    Stopped,
    /// Worker exited after a pipeline error, or failed to start
    Failed,
}

/// Counters for one sender
#[derive(Debug, Clone, Default)]
pub struct SenderStats {
    /// Frames pushed into the pipeline
    pub frames_pushed: u64,

    /// Frames rejected by a full queue or a bad size
    pub frames_dropped: u64,

    /// Buffers the `appsrc` refused
    pub push_errors: u64,

    /// Preview frames delivered
    pub previews_sent: u64,

    /// Preview frames skipped because the consumer was behind
    pub previews_dropped: u64,

    /// Bus messages relayed as status events
    pub bus_events: u64,

    /// Frame rate measured over the last frame
    pub last_fps: f64,
}

/// State shared between the manager, frame senders and the worker
#[derive(Debug)]
pub(crate) struct SenderShared {
    pub(crate) state: RwLock<SenderState>,
    pub(crate) stats: Mutex<SenderStats>,
    pub(crate) shutdown: AtomicBool,
}

impl SenderShared {
    fn new() -> Self {
        Self {
            state: RwLock::new(SenderState::Idle),
            stats: Mutex::new(SenderStats::default()),
            shutdown: AtomicBool::new(false),
        }
    }
}

/// Producer handle for queuing frames
///
/// Cheap to clone. Once every clone is dropped the worker stops.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: std_mpsc::SyncSender<RgbdFrame>,
    shared: Arc<SenderShared>,
    size: (u32, u32),
}

impl FrameSender {
    /// Queue a frame without blocking
    ///
    /// Fails with [`SenderError::QueueFull`] when the worker is behind and
    /// [`SenderError::Frame`] when the frame size does not match the
    /// configured resolution. Both count as dropped frames.
    pub fn send(&self, frame: RgbdFrame) -> Result<()> {
        if frame.size() != self.size {
            self.shared.stats.lock().frames_dropped += 1;
            return Err(FrameError::DimensionMismatch {
                left_width: frame.size().0,
                left_height: frame.size().1,
                right_width: self.size.0,
                right_height: self.size.1,
            }
            .into());
        }

        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(SenderError::Disconnected);
        }

        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(std_mpsc::TrySendError::Full(_)) => {
                self.shared.stats.lock().frames_dropped += 1;
                Err(SenderError::QueueFull)
            }
            Err(std_mpsc::TrySendError::Disconnected(_)) => Err(SenderError::Disconnected),
        }
    }
}

/// Channel ends returned by [`RtmpSender::start`]
#[derive(Debug)]
pub struct SenderChannels {
    /// Frame input for the producer
    pub frames: FrameSender,

    /// Status events for the supervisor
    pub status: StatusReceiver,

    /// Preview frames, `None` when preview is disabled
    pub preview: Option<PreviewReceiver>,
}

/// RGB-D to RTMP sender
///
/// This is the primary entry point. It owns the worker thread for the
/// current run and can be restarted after it stops.
pub struct RtmpSender {
    config: SenderConfig,
    shared: Arc<SenderShared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl RtmpSender {
    /// Create a sender with the given configuration
    pub fn new(config: SenderConfig) -> Result<Self> {
        if let Err(issues) = config.validate() {
            return Err(SenderError::invalid_config(issues.join(", ")));
        }

        info!("Creating RtmpSender with config: {:?}", config);

        Ok(Self {
            config,
            shared: Arc::new(SenderShared::new()),
            worker: None,
        })
    }

    /// Build the pipeline, start the worker and hand out channel ends
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The sender is already running
    /// - GStreamer cannot be initialised or the description does not parse
    /// - The pipeline refuses to go to PLAYING
    pub fn start(&mut self) -> Result<SenderChannels> {
        match self.state() {
            SenderState::Idle | SenderState::Stopped | SenderState::Failed => {}
            state => {
                return Err(SenderError::invalid_state(format!(
                    "cannot start while {state:?}"
                )))
            }
        }

        // reap a worker that stopped on its own
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        *self.shared.state.write() = SenderState::Starting;
        self.shared.shutdown.store(false, Ordering::Release);
        *self.shared.stats.lock() = SenderStats::default();

        let (frame_tx, frame_rx) = std_mpsc::sync_channel(self.config.frame_queue_size);
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (preview_tx, preview_rx) = if self.config.preview_queue_size > 0 {
            let (tx, rx) = mpsc::channel(self.config.preview_queue_size);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let channels = WorkerChannels {
            frames: frame_rx,
            status: status_tx,
            preview: preview_tx,
        };

        match SenderWorker::spawn(self.config.clone(), Arc::clone(&self.shared), channels) {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                warn!("Sender failed to start: {}", e);
                *self.shared.state.write() = SenderState::Failed;
                return Err(e);
            }
        }

        Ok(SenderChannels {
            frames: FrameSender {
                tx: frame_tx,
                shared: Arc::clone(&self.shared),
                size: (self.config.width, self.config.height),
            },
            status: status_rx,
            preview: preview_rx,
        })
    }

    /// Stop the worker and wait for it to exit
    ///
    /// The pipeline is paused before the worker releases it. Calling this
    /// on a sender that is not running is a no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        info!("Shutting down RtmpSender");
        {
            let mut state = self.shared.state.write();
            if *state == SenderState::Streaming {
                *state = SenderState::Stopping;
            }
        }
        self.shared.shutdown.store(true, Ordering::Release);

        if handle.join().is_err() {
            *self.shared.state.write() = SenderState::Failed;
            return Err(SenderError::ThreadPanicked);
        }

        info!("RtmpSender shutdown complete");
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SenderState {
        *self.shared.state.read()
    }

    /// Whether the worker is streaming
    pub fn is_streaming(&self) -> bool {
        self.state() == SenderState::Streaming
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> SenderStats {
        self.shared.stats.lock().clone()
    }

    /// Get configuration
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }
}

impl Drop for RtmpSender {
    fn drop(&mut self) {
        debug!("Dropping RtmpSender");
        if let Err(e) = self.shutdown() {
            warn!("Error stopping sender during drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use depthcast_frame::{ColorFrame, DepthFrame};
    use gstreamer as gst;

    use super::*;

    fn frame(width: u32, height: u32) -> RgbdFrame {
        let depth = DepthFrame::new(width, height, vec![1000; (width * height) as usize]).expect("depth");
        RgbdFrame::new(ColorFrame::black(width, height), depth).expect("frame")
    }

    /// A pipeline that needs only core and app plugins
    fn fakesink_config() -> Option<SenderConfig> {
        gst::init().ok()?;
        for factory in ["appsrc", "fakesink"] {
            gst::ElementFactory::find(factory)?;
        }

        Some(
            SenderConfig::builder()
                .resolution(4, 2)
                .include_audio(false)
                .preview_queue_size(1)
                .frame_pacing(Duration::ZERO)
                .poll_interval(Duration::from_millis(10))
                .custom_pipeline(
                    "appsrc name=mysource format=TIME do-timestamp=TRUE is-live=TRUE \
                     caps=\"video/x-raw,format=BGR,width=4,height=4,framerate=(fraction)30/1\" \
                     ! fakesink sync=false",
                )
                .build(),
        )
    }

    fn wait_for(sender: &RtmpSender, condition: impl Fn(&SenderStats) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition(&sender.stats()) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_sender_creation() {
        let sender = RtmpSender::new(SenderConfig::default()).expect("sender");
        assert_eq!(sender.state(), SenderState::Idle);
        assert!(!sender.is_streaming());
        assert_eq!(sender.stats().frames_pushed, 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = SenderConfig {
            rtmp_url: "udp://nowhere".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RtmpSender::new(config),
            Err(SenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_shutdown_without_start() {
        let mut sender = RtmpSender::new(SenderConfig::default()).expect("sender");
        assert!(sender.shutdown().is_ok());
        assert_eq!(sender.state(), SenderState::Idle);
    }

    #[test]
    fn test_frame_sender_rejects_full_queue_and_bad_size() {
        let (tx, _rx) = std_mpsc::sync_channel(1);
        let shared = Arc::new(SenderShared::new());
        let frames = FrameSender {
            tx,
            shared: Arc::clone(&shared),
            size: (4, 2),
        };

        assert!(frames.send(frame(4, 2)).is_ok());
        assert!(matches!(frames.send(frame(4, 2)), Err(SenderError::QueueFull)));
        assert!(matches!(frames.send(frame(2, 2)), Err(SenderError::Frame(_))));
        assert_eq!(shared.stats.lock().frames_dropped, 2);
    }

    #[test]
    fn test_frame_sender_disconnected() {
        let (tx, rx) = std_mpsc::sync_channel(1);
        drop(rx);
        let frames = FrameSender {
            tx,
            shared: Arc::new(SenderShared::new()),
            size: (4, 2),
        };
        assert!(matches!(frames.send(frame(4, 2)), Err(SenderError::Disconnected)));
    }

    #[test]
    fn test_unparseable_pipeline_fails_start() {
        if gst::init().is_err() {
            return;
        }

        let config = SenderConfig::builder()
            .custom_pipeline("appsrc name=mysource ! no-such-element-xyz")
            .build();
        let mut sender = RtmpSender::new(config).expect("sender");

        assert!(sender.start().is_err());
        assert_eq!(sender.state(), SenderState::Failed);
    }

    #[test]
    fn test_stream_to_fakesink() {
        let Some(config) = fakesink_config() else {
            return;
        };
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut sender = RtmpSender::new(config).expect("sender");
        let mut channels = sender.start().expect("start");
        assert!(sender.is_streaming());

        channels.frames.send(frame(4, 2)).expect("send");
        assert!(wait_for(&sender, |stats| stats.frames_pushed == 1 && stats.previews_sent == 1));

        sender.shutdown().expect("shutdown");
        assert_eq!(sender.state(), SenderState::Stopped);

        // The pipeline reported at least one state change on its way to PLAYING
        let mut saw_state_change = false;
        while let Ok(event) = channels.status.try_recv() {
            if matches!(event, StatusEvent::StateChanged { .. }) {
                saw_state_change = true;
            }
        }
        assert!(saw_state_change);

        let preview = channels
            .preview
            .as_mut()
            .and_then(|rx| rx.try_recv().ok())
            .expect("preview frame");
        assert_eq!(preview.depth_colorized.pixel(0, 0), Some([0, 255, 127]));

        // frames after shutdown are refused
        assert!(channels.frames.send(frame(4, 2)).is_err());
    }

    #[test]
    fn test_preview_counts_match_pushed_frames() {
        let Some(config) = fakesink_config() else {
            return;
        };

        let mut sender = RtmpSender::new(config).expect("sender");
        let channels = sender.start().expect("start");

        // preview queue holds one frame and is never read
        for _ in 0..3 {
            channels.frames.send(frame(4, 2)).expect("send");
        }
        assert!(wait_for(&sender, |stats| stats.previews_sent + stats.previews_dropped == 3));

        let stats = sender.stats();
        assert_eq!(stats.frames_pushed, 3);
        assert_eq!(stats.previews_sent, 1);
        assert_eq!(stats.previews_dropped, 2);
        sender.shutdown().expect("shutdown");
    }

    #[test]
    fn test_pipeline_error_fails_sender() {
        if gst::init().is_err() {
            return;
        }
        if ["appsrc", "capsfilter", "fakesink"]
            .iter()
            .any(|factory| gst::ElementFactory::find(factory).is_none())
        {
            return;
        }

        // BGR caps cannot negotiate with an I420-only filter
        let config = SenderConfig::builder()
            .resolution(4, 2)
            .include_audio(false)
            .preview_queue_size(0)
            .poll_interval(Duration::from_millis(10))
            .custom_pipeline(
                "appsrc name=mysource format=TIME is-live=TRUE \
                 caps=\"video/x-raw,format=BGR,width=4,height=4,framerate=(fraction)30/1\" \
                 ! capsfilter caps=\"video/x-raw,format=I420\" ! fakesink",
            )
            .build();

        let mut sender = RtmpSender::new(config).expect("sender");
        let mut channels = match sender.start() {
            Ok(channels) => channels,
            Err(_) => {
                assert_eq!(sender.state(), SenderState::Failed);
                return;
            }
        };
        let _ = channels.frames.send(frame(4, 2));

        let deadline = Instant::now() + Duration::from_secs(5);
        while sender.state() != SenderState::Failed && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(sender.state(), SenderState::Failed);

        let mut errors = Vec::new();
        while let Ok(event) = channels.status.try_recv() {
            if event.is_fatal() {
                errors.push(event.to_string());
            }
        }
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|line| line.starts_with("ERROR: ")));

        assert!(matches!(
            channels.frames.send(frame(4, 2)),
            Err(SenderError::Disconnected)
        ));
        assert!(sender.stats().bus_events > 0);

        sender.shutdown().expect("shutdown");
        assert_eq!(sender.state(), SenderState::Failed);
    }

    #[test]
    fn test_restart_after_stop() {
        let Some(config) = fakesink_config() else {
            return;
        };

        let mut sender = RtmpSender::new(config).expect("sender");
        let first = sender.start().expect("first start");
        assert!(matches!(
            sender.start(),
            Err(SenderError::InvalidState(_))
        ));
        sender.shutdown().expect("shutdown");
        drop(first);

        let _second = sender.start().expect("second start");
        assert!(sender.is_streaming());
        sender.shutdown().expect("shutdown");
    }

    #[test]
    fn test_dropping_frame_senders_stops_worker() {
        let Some(config) = fakesink_config() else {
            return;
        };

        let mut sender = RtmpSender::new(config).expect("sender");
        let channels = sender.start().expect("start");
        drop(channels.frames);

        let deadline = Instant::now() + Duration::from_secs(5);
        while sender.state() == SenderState::Streaming && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(sender.state(), SenderState::Stopped);
    }
}
