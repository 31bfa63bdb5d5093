//! Dedicated pipeline thread
//!
//! Owns every GStreamer object for one sender run. The manager talks to it
//! through channels only:
//!
//! ```text
//!  FrameSender ──sync_channel──▶ ┌──────────────────────┐
//!                                │  SenderWorker        │
//!                                │  encode + stack      │──▶ appsrc
//!                                │  drain bus           │
//!  StatusReceiver ◀──unbounded── │                      │
//!  PreviewReceiver ◀──bounded─── └──────────────────────┘
//! ```

use std::sync::atomic::Ordering;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use depthcast_frame::{stack_frames, DepthEncoder, PreviewFrame, RgbdFrame};
use gstreamer as gst;
use gstreamer::prelude::{Cast, ElementExt, ElementExtManual, GstBinExt, ObjectExt};
use gstreamer_app as gst_app;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::SenderConfig;
use crate::error::{Result, SenderError};
use crate::pipeline::launch_description;
use crate::sender::{SenderShared, SenderState};
use crate::status::{StatusEvent, RELAYED_MESSAGE_TYPES};

/// Sets the pipeline to NULL when the worker lets go of it
struct PipelineGuard(gst::Pipeline);

impl Drop for PipelineGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.set_state(gst::State::Null) {
            warn!("Failed to set pipeline to NULL: {}", e);
        }
    }
}

/// Channel ends held by the worker
pub(crate) struct WorkerChannels {
    pub(crate) frames: std_mpsc::Receiver<RgbdFrame>,
    pub(crate) status: mpsc::UnboundedSender<StatusEvent>,
    pub(crate) preview: Option<mpsc::Sender<PreviewFrame>>,
}

/// Parse the launch description and locate the source element
fn build_pipeline(config: &SenderConfig) -> Result<(PipelineGuard, gst_app::AppSrc, gst::Bus)> {
    gst::init().map_err(SenderError::Init)?;

    let description = launch_description(config);
    info!("Launching pipeline: {}", description);

    let pipeline = gst::parse::launch(&description)
        .map_err(SenderError::PipelineParse)?
        .downcast::<gst::Pipeline>()
        .map_err(|_| SenderError::NotAPipeline)?;
    let pipeline = PipelineGuard(pipeline);

    let appsrc = pipeline
        .0
        .by_name(&config.source_name)
        .ok_or_else(|| SenderError::element_not_found(config.source_name.clone()))?
        .downcast::<gst_app::AppSrc>()
        .map_err(|_| SenderError::element_not_found(format!("{} (not an appsrc)", config.source_name)))?;
    appsrc.set_property("emit-signals", true);

    let bus = pipeline
        .0
        .bus()
        .ok_or_else(|| SenderError::element_not_found("pipeline bus"))?;

    pipeline.0.set_state(gst::State::Playing)?;

    Ok((pipeline, appsrc, bus))
}

/// Worker state for one run
pub(crate) struct SenderWorker {
    config: SenderConfig,
    shared: Arc<SenderShared>,
    channels: WorkerChannels,
    encoder: DepthEncoder,
    pipeline: PipelineGuard,
    appsrc: gst_app::AppSrc,
    bus: gst::Bus,
    failed: bool,
}

impl SenderWorker {
    /// Spawn the worker thread
    ///
    /// Blocks until the pipeline is PLAYING or has failed to start; a
    /// startup failure is returned here and the thread exits.
    pub(crate) fn spawn(
        config: SenderConfig,
        shared: Arc<SenderShared>,
        channels: WorkerChannels,
    ) -> Result<thread::JoinHandle<()>> {
        let (startup_tx, startup_rx) = std_mpsc::sync_channel::<Result<()>>(1);

        let handle = thread::Builder::new()
            .name("depthcast-gst".to_string())
            .spawn(move || {
                let encoder = match DepthEncoder::new(config.far_plane_mm) {
                    Ok(encoder) => encoder,
                    Err(e) => {
                        let _ = startup_tx.send(Err(e.into()));
                        return;
                    }
                };

                let (pipeline, appsrc, bus) = match build_pipeline(&config) {
                    Ok(parts) => parts,
                    Err(e) => {
                        let _ = startup_tx.send(Err(e));
                        return;
                    }
                };

                let worker = SenderWorker {
                    config,
                    shared,
                    channels,
                    encoder,
                    pipeline,
                    appsrc,
                    bus,
                    failed: false,
                };

                *worker.shared.state.write() = SenderState::Streaming;
                if startup_tx.send(Ok(())).is_err() {
                    return;
                }
                worker.run();
            })?;

        match startup_rx.recv() {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(SenderError::ThreadPanicked)
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Main loop
    fn run(mut self) {
        info!(
            "Sender streaming {}x{} to {}",
            self.config.width,
            self.config.stream_height(),
            self.config.rtmp_url
        );

        while !self.shutdown_requested() {
            match self.channels.frames.recv_timeout(self.config.poll_interval) {
                Ok(frame) => {
                    self.process_frame(frame);
                    if !self.config.frame_pacing.is_zero() {
                        thread::sleep(self.config.frame_pacing);
                    }
                }
                Err(std_mpsc::RecvTimeoutError::Timeout) => self.drain_bus(),
                Err(std_mpsc::RecvTimeoutError::Disconnected) => {
                    info!("All frame senders dropped, stopping");
                    break;
                }
            }
        }

        self.pause();

        let final_state = if self.failed {
            SenderState::Failed
        } else {
            SenderState::Stopped
        };
        *self.shared.state.write() = final_state;
        info!("Sender worker exiting ({:?})", final_state);
    }

    /// Encode, push and report one frame
    fn process_frame(&mut self, frame: RgbdFrame) {
        let start = Instant::now();
        let wants_preview = self.preview_has_room();
        let (color, depth) = frame.into_parts();

        let encoded = self.encoder.encode(&depth);
        let stacked = match stack_frames(&color, encoded) {
            Ok(stacked) => stacked,
            Err(e) => {
                warn!("Dropping frame: {}", e);
                self.shared.stats.lock().frames_dropped += 1;
                return;
            }
        };
        let preview = wants_preview.then(|| PreviewFrame {
            color,
            depth_colorized: encoded.clone(),
        });

        let buffer = gst::Buffer::from_mut_slice(stacked.into_data());
        let pushed = match self.appsrc.push_buffer(buffer) {
            Ok(_) => {
                self.shared.stats.lock().frames_pushed += 1;
                true
            }
            Err(flow) => {
                warn!("appsrc refused buffer: {:?}", flow);
                self.shared.stats.lock().push_errors += 1;
                false
            }
        };

        self.drain_bus();

        if pushed && self.channels.preview.is_some() && !self.shutdown_requested() {
            match preview {
                Some(preview) => self.send_preview(preview),
                None => self.shared.stats.lock().previews_dropped += 1,
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let fps = 1.0 / elapsed;
            self.shared.stats.lock().last_fps = fps;
            debug!("gstreamer frame: {:.1} fps", fps);
        }
    }

    /// Whether the preview consumer has room for another frame
    fn preview_has_room(&self) -> bool {
        self.channels
            .preview
            .as_ref()
            .is_some_and(|preview| preview.capacity() > 0)
    }

    fn send_preview(&mut self, frame: PreviewFrame) {
        let Some(ref preview) = self.channels.preview else {
            return;
        };

        match preview.try_send(frame) {
            Ok(()) => self.shared.stats.lock().previews_sent += 1,
            Err(mpsc::error::TrySendError::Full(_)) => self.shared.stats.lock().previews_dropped += 1,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Preview receiver dropped, disabling preview");
                self.channels.preview = None;
            }
        }
    }

    /// Relay every pending bus message
    fn drain_bus(&mut self) {
        while let Some(message) = self.bus.pop_filtered(&RELAYED_MESSAGE_TYPES) {
            let Some(event) = StatusEvent::from_message(&message) else {
                continue;
            };

            match event {
                StatusEvent::Error { .. } => error!("{}", event),
                StatusEvent::Warning { .. } | StatusEvent::EndOfStream => warn!("{}", event),
                _ => debug!("{}", event),
            }

            if event.is_fatal() {
                self.failed = true;
                self.shared.shutdown.store(true, Ordering::Release);
            }

            self.shared.stats.lock().bus_events += 1;
            // The supervisor may have stopped listening
            let _ = self.channels.status.send(event);
        }
    }

    /// Pause the pipeline on the way out
    fn pause(&mut self) {
        if self.pipeline.0.current_state() == gst::State::Paused {
            return;
        }

        if let Err(e) = self.pipeline.0.set_state(gst::State::Paused) {
            error!("Error pausing gstreamer: {}", e);
            let _ = self.channels.status.send(StatusEvent::pause_failed());
        }
    }
}
