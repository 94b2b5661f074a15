// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for recorder operations
//!
//! This module provides command-line functionality for:
//! - Listing capture modes
//! - Negotiating a capture mode for a request
//! - Recording test sources through the recording engine

use crate::RecordArgs;
use camera_recorder::backends::camera::types::{ColorSpace, DeviceCaptureMode, Resolution};
use camera_recorder::backends::camera::{CaptureDevice, GstCaptureDevice, StaticDevice};
use camera_recorder::config::RecorderConfig;
use camera_recorder::constants::audio;
use camera_recorder::media::encoders::log_available_encoders;
use camera_recorder::media::formats::catalog;
use camera_recorder::media::formats::codec::gst_raw_format;
use camera_recorder::media::formats::negotiation::select_mode;
use camera_recorder::pipelines::video::{
    RecordingEngine, Sample, StreamKind, WriterSettings, resolve,
};
use chrono::Local;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Default folder name for saving recordings
const DEFAULT_SAVE_FOLDER: &str = "Camera";

/// List capture modes of every video source, or of a device profile
pub fn list_modes(profile: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize GStreamer
    gst::init()?;

    if let Some(path) = profile {
        let device = StaticDevice::load_profile(&path)?;
        print_device(&device);
        return Ok(());
    }

    let devices = GstCaptureDevice::enumerate().unwrap_or_default();
    if devices.is_empty() {
        println!("No video sources found.");
    }
    for (index, device) in devices.iter().enumerate() {
        print!("[{}] ", index);
        print_device(device);
    }

    log_available_encoders();
    Ok(())
}

fn print_device(device: &dyn CaptureDevice) {
    catalog::log_available_modes(device);

    let mut modes = catalog::list_modes(device);
    println!("{}", device.name());

    if modes.is_empty() {
        println!("      No capture modes");
        println!();
        return;
    }

    // Highest resolution first
    modes.sort_by(|a, b| b.pixel_count().cmp(&a.pixel_count()));
    for mode in &modes {
        println!("      {}", mode);
    }

    let spaces: Vec<String> = catalog::supported_color_spaces(device)
        .iter()
        .map(|cs| cs.to_string())
        .collect();
    println!("      Color spaces: {}", spaces.join(", "));
    println!();
}

/// Print the capture mode a request resolves to
pub fn negotiate_mode(
    width: u32,
    height: u32,
    fps: u32,
    color_space: ColorSpace,
    profile: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    gst::init()?;

    let device = open_device(profile.as_deref(), true)?;
    let resolution = Resolution::new(width, height);
    println!("Device: {}", device.name());
    println!("Request: {} @ {}fps, {}", resolution, fps, color_space);

    let negotiated = select_mode(device.as_ref(), resolution, fps, color_space)?;
    println!("Mode: {}", negotiated.mode);
    println!("Color space: {}", negotiated.color_space);
    if !negotiated.frame_rate_satisfied {
        println!(
            "Frame rate: {}fps not available, mode tops out at {:.2}fps",
            fps,
            negotiated.mode.max_framerate()
        );
    }

    Ok(())
}

/// Load a profile, or pick a device
///
/// Without a profile, the first system video source is used when
/// `prefer_system` is set; otherwise (or if there is none) the test pattern
/// device stands in.
fn open_device(
    profile: Option<&Path>,
    prefer_system: bool,
) -> Result<Box<dyn CaptureDevice>, Box<dyn std::error::Error>> {
    if let Some(path) = profile {
        return Ok(Box::new(StaticDevice::load_profile(path)?));
    }

    if prefer_system
        && let Some(device) = GstCaptureDevice::enumerate()
            .unwrap_or_default()
            .into_iter()
            .next()
    {
        return Ok(Box::new(device));
    }

    Ok(Box::new(StaticDevice::test_pattern()))
}

/// Record test sources through the engine
pub fn record(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    gst::init()?;

    let config = RecorderConfig::load();
    let mut options = config.recording_options();
    if let Some(codec) = args.codec {
        options.codec = codec;
    }
    if let Some(container) = args.container {
        options.container = container;
    }
    if args.color_space.is_some() {
        options.color_space = args.color_space;
    }
    options.target_frame_rate = args.fps;
    if args.no_audio {
        options.enable_audio = false;
    }
    let quality = args.quality.unwrap_or(config.quality);

    let device = open_device(args.profile.as_deref(), false)?;
    let preview = largest_mode(&catalog::list_modes(device.as_ref()))
        .ok_or("Device has no capture modes")?;

    // Determine output path
    let output_path = match args.output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => {
            // Color space substitutions can change the container
            let container = resolve(&options, quality, preview, device.as_ref())?.container;
            let dir = default_video_dir();
            std::fs::create_dir_all(&dir)?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            dir.join(format!("recording_{}.{}", timestamp, container.extension()))
        }
    };

    let engine = Arc::new(RecordingEngine::with_gstreamer(&config));
    engine.configure_and_start(&output_path, device.as_ref(), &options, quality, preview)?;
    let settings = engine
        .active_settings()
        .ok_or("Recording session missing after start")?;

    println!("Output: {}", output_path.display());
    println!(
        "Recording: {} {} in {}, {} @ {}fps, {}",
        settings.resolution,
        settings.codec,
        settings.container,
        settings.color_space,
        settings.frame_rate,
        if settings.enable_audio { "with audio" } else { "no audio" }
    );
    for substitution in &settings.substitutions {
        println!("Adjusted: {:?}", substitution);
    }

    let capture = build_capture_pipeline(&settings, &engine)?;
    capture.set_state(gst::State::Playing).map_err(|e| {
        let _ = capture.set_state(gst::State::Null);
        format!("Failed to start capture: {:?}", e)
    })?;

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    println!();
    println!("Recording... (press Ctrl+C to stop early)");

    let start = Instant::now();
    let target_duration = Duration::from_secs(args.duration);
    let bus = capture.bus().ok_or("Capture pipeline has no bus")?;
    let mut capture_error = None;

    while start.elapsed() < target_duration {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }

        if let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error])
            && let gst::MessageView::Error(err) = msg.view()
        {
            capture_error = Some(format!("Capture error: {}", err.error()));
            break;
        }

        // Print progress
        let elapsed = start.elapsed().as_secs();
        let stats = engine.stats();
        print!(
            "\rRecording: {:02}:{:02}  frames {}  audio {}  dropped {}",
            elapsed / 60,
            elapsed % 60,
            stats.video.accepted,
            stats.audio.accepted,
            stats.video.dropped + stats.audio.dropped
        );
        std::io::Write::flush(&mut std::io::stdout())?;

        std::thread::sleep(Duration::from_millis(100));
    }
    println!();

    let _ = capture.set_state(gst::State::Null);

    let rt = tokio::runtime::Runtime::new()?;
    let recorded = rt.block_on(engine.stop())?;

    if let Some(e) = capture_error {
        return Err(e.into());
    }

    if recorded {
        println!("Video saved: {}", output_path.display());
    } else {
        println!("Nothing was recorded");
    }
    Ok(())
}

fn largest_mode(modes: &[DeviceCaptureMode]) -> Option<Resolution> {
    modes
        .iter()
        .max_by_key(|m| m.pixel_count())
        .map(|m| m.resolution())
}

/// Build live test sources feeding appsinks that push into the engine
///
/// ```text
/// videotestsrc → videoconvert → videoscale → capsfilter → appsink ─▶ push_video
/// audiotestsrc → audioconvert → audioresample → capsfilter → appsink ─▶ push_audio
/// ```
fn build_capture_pipeline(
    settings: &WriterSettings,
    engine: &Arc<RecordingEngine>,
) -> Result<gst::Pipeline, String> {
    let pipeline = gst::Pipeline::new();

    let video_src = gst::ElementFactory::make("videotestsrc")
        .property("is-live", true)
        .build()
        .map_err(|e| format!("Failed to create videotestsrc: {}", e))?;
    video_src.set_property_from_str("pattern", "smpte");

    let video_convert = make_element("videoconvert")?;
    let video_scale = make_element("videoscale")?;

    let video_caps = gst::Caps::builder("video/x-raw")
        .field("format", gst_raw_format(&settings.mode.pixel_format))
        .field("width", settings.resolution.width as i32)
        .field("height", settings.resolution.height as i32)
        .field("framerate", gst::Fraction::new(settings.frame_rate as i32, 1))
        .build();
    let video_filter = gst::ElementFactory::make("capsfilter")
        .property("caps", &video_caps)
        .build()
        .map_err(|e| format!("Failed to create capsfilter: {}", e))?;

    let video_sink = stream_sink(StreamKind::Video, Arc::clone(engine));

    pipeline
        .add_many([
            &video_src,
            &video_convert,
            &video_scale,
            &video_filter,
            video_sink.upcast_ref(),
        ])
        .map_err(|e| format!("Failed to add video elements: {}", e))?;
    gst::Element::link_many([
        &video_src,
        &video_convert,
        &video_scale,
        &video_filter,
        video_sink.upcast_ref(),
    ])
    .map_err(|e| format!("Failed to link video elements: {}", e))?;

    if settings.enable_audio {
        let audio_src = gst::ElementFactory::make("audiotestsrc")
            .property("is-live", true)
            .property("volume", 0.2f64)
            .build()
            .map_err(|e| format!("Failed to create audiotestsrc: {}", e))?;
        let audio_convert = make_element("audioconvert")?;
        let audio_resample = make_element("audioresample")?;

        let audio_caps = gst::Caps::builder("audio/x-raw")
            .field("format", audio::FORMAT)
            .field("rate", audio::SAMPLE_RATE as i32)
            .field("channels", audio::CHANNELS as i32)
            .field("layout", "interleaved")
            .build();
        let audio_filter = gst::ElementFactory::make("capsfilter")
            .property("caps", &audio_caps)
            .build()
            .map_err(|e| format!("Failed to create capsfilter: {}", e))?;

        let audio_sink = stream_sink(StreamKind::Audio, Arc::clone(engine));

        pipeline
            .add_many([
                &audio_src,
                &audio_convert,
                &audio_resample,
                &audio_filter,
                audio_sink.upcast_ref(),
            ])
            .map_err(|e| format!("Failed to add audio elements: {}", e))?;
        gst::Element::link_many([
            &audio_src,
            &audio_convert,
            &audio_resample,
            &audio_filter,
            audio_sink.upcast_ref(),
        ])
        .map_err(|e| format!("Failed to link audio elements: {}", e))?;
    }

    Ok(pipeline)
}

fn make_element(name: &str) -> Result<gst::Element, String> {
    gst::ElementFactory::make(name)
        .build()
        .map_err(|e| format!("Failed to create {}: {}", name, e))
}

/// Appsink that hands every buffer to the engine
fn stream_sink(kind: StreamKind, engine: Arc<RecordingEngine>) -> gst_app::AppSink {
    let sink = gst_app::AppSink::builder()
        .name(format!("{}-sink", kind))
        .sync(false)
        .max_buffers(4)
        .drop(true)
        .build();

    sink.set_callbacks(
        gst_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
                let Some(pts) = buffer.pts() else {
                    return Ok(gst::FlowSuccess::Ok);
                };
                let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;

                let mut frame = Sample::new(map.as_slice(), Duration::from_nanos(pts.nseconds()));
                if let Some(duration) = buffer.duration() {
                    frame = frame.with_duration(Duration::from_nanos(duration.nseconds()));
                }

                match kind {
                    StreamKind::Video => engine.push_video(frame),
                    StreamKind::Audio => engine.push_audio(frame),
                };
                Ok(gst::FlowSuccess::Ok)
            })
            .build(),
    );

    sink
}

/// Get default video directory
fn default_video_dir() -> PathBuf {
    dirs::video_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
