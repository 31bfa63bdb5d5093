//! Synthetic RGB-D Streaming Example
//!
//! Streams a moving color gradient with a sweeping depth ramp to an RTMP
//! server and prints every status event the pipeline reports.
//!
//! # Prerequisites
//!
//! - GStreamer with the plugins for the chosen profile
//! - An RTMP server, e.g. `docker run -p 1935:1935 tiangolo/nginx-rtmp`
//!
//! # Running
//!
//! ```bash
//! cargo run --example synthetic -- rtmp://localhost/live/test software
//! ```

use std::time::{Duration, Instant};

use depthcast_gst::{
    missing_elements, ColorFrame, DepthFrame, Platform, RgbdFrame, RtmpSender, SenderConfig,
    SenderError,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const RUN_TIME: Duration = Duration::from_secs(20);

fn synthetic_frame(tick: u32) -> Result<RgbdFrame, SenderError> {
    let mut color = Vec::with_capacity(ColorFrame::byte_len(WIDTH, HEIGHT));
    let mut depth = Vec::with_capacity((WIDTH * HEIGHT) as usize);

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            color.extend_from_slice(&[
                ((x + tick) % 256) as u8,
                ((y + tick) % 256) as u8,
                128,
            ]);
            // ramp from 0 to 4500 mm across the width, shifting each tick
            depth.push((((x + tick * 4) % WIDTH) * 4500 / WIDTH) as u16);
        }
    }

    Ok(RgbdFrame::new(
        ColorFrame::new(WIDTH, HEIGHT, color)?,
        DepthFrame::new(WIDTH, HEIGHT, depth)?,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "rtmp://localhost/live/depthcast".to_string());
    let platform = match args.next() {
        Some(name) => name.parse::<Platform>()?,
        None => Platform::detect(),
    };

    println!("depthcast synthetic stream");
    println!("==========================");
    println!("  URL:      {}", url);
    println!("  Platform: {}", platform);

    let missing = missing_elements(platform, true);
    if !missing.is_empty() {
        println!("  Missing GStreamer elements: {}", missing.join(", "));
        println!("  The pipeline will fail to start.");
    }

    let config = SenderConfig::builder()
        .rtmp_url(url)
        .resolution(WIDTH, HEIGHT)
        .platform(platform)
        .build();

    let mut sender = RtmpSender::new(config)?;
    let mut channels = sender.start()?;

    let started = Instant::now();
    let mut tick = 0;
    while started.elapsed() < RUN_TIME && sender.is_streaming() {
        match channels.frames.send(synthetic_frame(tick)?) {
            Ok(()) | Err(SenderError::QueueFull) => {}
            Err(e) => return Err(e.into()),
        }

        while let Ok(event) = channels.status.try_recv() {
            println!("{}", event);
        }
        if let Some(ref mut preview) = channels.preview {
            // drain so the worker keeps offering fresh previews
            while preview.try_recv().is_ok() {}
        }

        tick += 1;
        std::thread::sleep(Duration::from_millis(33));
    }

    sender.shutdown()?;

    let stats = sender.stats();
    println!("\nStatistics:");
    println!("  Frames pushed:  {}", stats.frames_pushed);
    println!("  Frames dropped: {}", stats.frames_dropped);
    println!("  Bus events:     {}", stats.bus_events);
    println!("  Last frame fps: {:.1}", stats.last_fps);

    Ok(())
}
