// SPDX-License-Identifier: MPL-2.0

//! Audio/video writer
//!
//! [`MediaWriter`] is the seam between the recording engine and whatever
//! interleaves samples into a container. The GStreamer implementation builds:
//!
//! ```text
//! appsrc (video/x-raw) → videoconvert → encoder → [parser] ─┐
//!                                                          ├→ muxer → filesink
//! appsrc (audio/x-raw) → audioconvert → audioresample → aac ┘
//! ```

use super::encoder_selection::{EncoderConfig, select_encoders};
use super::sample::{Sample, StreamKind};
use super::settings::WriterSettings;
use crate::constants::{audio, timing};
use crate::media::encoders::AudioQuality;
use crate::media::formats::codec::gst_raw_format;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Output writer for one recording session
///
/// Called from the real-time delivery paths, so `is_ready_for_more` and
/// `append` must not block.
pub trait MediaWriter: Send + Sync {
    /// Anchor the session: `at` becomes time zero in the output
    fn start_session(&self, at: Duration);

    /// Whether the track can take another sample without queueing
    fn is_ready_for_more(&self, kind: StreamKind) -> bool;

    /// Write a sample at a corrected timestamp (same clock as the anchor)
    fn append(&self, kind: StreamKind, sample: &Sample, timestamp: Duration) -> Result<(), String>;

    /// Close both inputs and finish the container
    fn finalize(self: Box<Self>) -> Result<(), String>;
}

/// Opens writers for the recording engine
pub trait WriterFactory: Send + Sync {
    fn open(&self, path: &Path, settings: &WriterSettings) -> Result<Box<dyn MediaWriter>, String>;
}

/// Factory for GStreamer writers
#[derive(Debug, Clone)]
pub struct GstWriterFactory {
    pub audio_quality: AudioQuality,
    /// Bytes an input may queue before reporting not ready
    pub max_queued_bytes: u64,
}

impl Default for GstWriterFactory {
    fn default() -> Self {
        Self {
            audio_quality: AudioQuality::default(),
            max_queued_bytes: crate::constants::writer::MAX_QUEUED_BYTES,
        }
    }
}

impl WriterFactory for GstWriterFactory {
    fn open(&self, path: &Path, settings: &WriterSettings) -> Result<Box<dyn MediaWriter>, String> {
        let writer = GstWriter::new(path, settings, self.audio_quality, self.max_queued_bytes)?;
        Ok(Box::new(writer))
    }
}

/// GStreamer appsrc-driven writer
pub struct GstWriter {
    pipeline: gst::Pipeline,
    video_src: gst_app::AppSrc,
    audio_src: Option<gst_app::AppSrc>,
    anchor: OnceLock<Duration>,
    max_queued_bytes: u64,
    output_path: PathBuf,
}

impl GstWriter {
    /// Build and start the writer pipeline
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `settings` - Resolved writer settings
    /// * `audio_quality` - AAC quality for the audio track
    /// * `max_queued_bytes` - Readiness threshold per input
    ///
    /// # Returns
    /// * `Ok(GstWriter)` - Pipeline in the playing state
    /// * `Err(String)` - Element creation, linking or startup failed
    pub fn new(
        path: &Path,
        settings: &WriterSettings,
        audio_quality: AudioQuality,
        max_queued_bytes: u64,
    ) -> Result<Self, String> {
        info!(
            output = %path.display(),
            codec = %settings.codec,
            container = %settings.container,
            resolution = %settings.resolution,
            fps = settings.frame_rate,
            audio = settings.enable_audio,
            "Creating writer pipeline"
        );

        gst::init().map_err(|e| format!("Failed to initialize GStreamer: {}", e))?;

        let encoders = select_encoders(&EncoderConfig::from_settings(settings, audio_quality))?;

        let pipeline = gst::Pipeline::new();

        let video_src = gst_app::AppSrc::builder()
            .name("video_src")
            .caps(&video_caps(settings)?)
            .format(gst::Format::Time)
            .is_live(true)
            .block(false)
            .max_bytes(max_queued_bytes)
            .build();

        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(|e| format!("Failed to create videoconvert: {}", e))?;

        let muxer = gst::ElementFactory::make(settings.container.muxer_name())
            .build()
            .map_err(|e| format!("Failed to create {}: {}", settings.container.muxer_name(), e))?;

        // Non-streamable output so duration and indexes are written
        if muxer.has_property("streamable") {
            muxer.set_property("streamable", false);
        }

        let filesink = gst::ElementFactory::make("filesink")
            .property("location", path.to_string_lossy().to_string())
            .property("async", false)
            .build()
            .map_err(|e| format!("Failed to create filesink: {}", e))?;

        let video_encoder = encoders.video.encoder;
        let video_parser = encoders.video.parser;

        let mut video_chain: Vec<&gst::Element> =
            vec![video_src.upcast_ref(), &videoconvert, &video_encoder];
        if let Some(ref parser) = video_parser {
            video_chain.push(parser);
        }

        pipeline
            .add_many(video_chain.iter().copied())
            .map_err(|e| format!("Failed to add video elements: {}", e))?;
        pipeline
            .add_many([&muxer, &filesink])
            .map_err(|e| format!("Failed to add muxer: {}", e))?;

        video_chain.push(&muxer);
        gst::Element::link_many(video_chain.iter().copied())
            .map_err(|_| "Failed to link video chain to muxer".to_string())?;
        muxer
            .link(&filesink)
            .map_err(|_| "Failed to link muxer to filesink".to_string())?;

        let audio_src = match encoders.audio {
            Some(selected) => {
                let src =
                    Self::add_audio_branch(&pipeline, &muxer, selected.encoder, max_queued_bytes)?;
                debug!(encoder = selected.element_name, "Audio branch linked");
                Some(src)
            }
            None => None,
        };

        if let Err(e) = pipeline.set_state(gst::State::Playing) {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(format!("Failed to start writer: {}", e));
        }

        // Check for immediate errors
        let bus = pipeline.bus().ok_or("No bus available")?;
        let start_check =
            gst::ClockTime::from_nseconds(timing::WRITER_START_CHECK.as_nanos() as u64);
        if let Some(msg) = bus.timed_pop_filtered(start_check, &[gst::MessageType::Error]) {
            if let gst::MessageView::Error(err) = msg.view() {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer error during writer start"
                );
                let _ = pipeline.set_state(gst::State::Null);
                return Err(format!("Writer start error: {}", err.error()));
            }
        }

        Ok(Self {
            pipeline,
            video_src,
            audio_src,
            anchor: OnceLock::new(),
            max_queued_bytes,
            output_path: path.to_path_buf(),
        })
    }

    fn add_audio_branch(
        pipeline: &gst::Pipeline,
        muxer: &gst::Element,
        encoder: gst::Element,
        max_queued_bytes: u64,
    ) -> Result<gst_app::AppSrc, String> {
        let caps = gst::Caps::builder("audio/x-raw")
            .field("format", audio::FORMAT)
            .field("layout", "interleaved")
            .field("rate", audio::SAMPLE_RATE as i32)
            .field("channels", audio::CHANNELS as i32)
            .build();

        let src = gst_app::AppSrc::builder()
            .name("audio_src")
            .caps(&caps)
            .format(gst::Format::Time)
            .is_live(true)
            .block(false)
            .max_bytes(max_queued_bytes)
            .build();

        let convert = gst::ElementFactory::make("audioconvert")
            .build()
            .map_err(|e| format!("Failed to create audioconvert: {}", e))?;
        let resample = gst::ElementFactory::make("audioresample")
            .build()
            .map_err(|e| format!("Failed to create audioresample: {}", e))?;

        pipeline
            .add_many([src.upcast_ref(), &convert, &resample, &encoder])
            .map_err(|e| format!("Failed to add audio elements: {}", e))?;
        gst::Element::link_many([src.upcast_ref(), &convert, &resample, &encoder, muxer])
            .map_err(|_| "Failed to link audio chain to muxer".to_string())?;

        Ok(src)
    }

    fn source(&self, kind: StreamKind) -> Option<&gst_app::AppSrc> {
        match kind {
            StreamKind::Video => Some(&self.video_src),
            StreamKind::Audio => self.audio_src.as_ref(),
        }
    }
}

/// Raw video caps for the negotiated mode
fn video_caps(settings: &WriterSettings) -> Result<gst::Caps, String> {
    let format_name = gst_raw_format(&settings.mode.pixel_format);
    let format = gst_video::VideoFormat::from_string(format_name);
    let colorimetry: gst_video::VideoColorimetry = settings
        .color_space
        .colorimetry()
        .parse()
        .map_err(|e| format!("Invalid colorimetry: {}", e))?;

    gst_video::VideoInfo::builder(format, settings.resolution.width, settings.resolution.height)
        .fps(gst::Fraction::new(settings.frame_rate as i32, 1))
        .colorimetry(&colorimetry)
        .build()
        .and_then(|info| info.to_caps())
        .map_err(|e| format!("Failed to build video caps: {}", e))
}

impl MediaWriter for GstWriter {
    fn start_session(&self, at: Duration) {
        if self.anchor.set(at).is_ok() {
            debug!(anchor = ?at, "Writer session anchored");
        }
    }

    fn is_ready_for_more(&self, kind: StreamKind) -> bool {
        self.source(kind)
            .is_some_and(|src| src.current_level_bytes() < self.max_queued_bytes)
    }

    fn append(&self, kind: StreamKind, sample: &Sample, timestamp: Duration) -> Result<(), String> {
        let src = self
            .source(kind)
            .ok_or_else(|| format!("No {} track", kind))?;
        let anchor = self.anchor.get().copied().unwrap_or(timestamp);
        let pts = timestamp.saturating_sub(anchor);

        let mut buffer = gst::Buffer::from_slice(sample.payload.clone());
        if let Some(buffer_ref) = buffer.get_mut() {
            buffer_ref.set_pts(gst::ClockTime::from_nseconds(pts.as_nanos() as u64));
            if let Some(duration) = sample.duration {
                buffer_ref.set_duration(gst::ClockTime::from_nseconds(duration.as_nanos() as u64));
            }
        }

        src.push_buffer(buffer)
            .map(|_| ())
            .map_err(|e| format!("Failed to push {} buffer: {:?}", kind, e))
    }

    fn finalize(self: Box<Self>) -> Result<(), String> {
        info!(path = %self.output_path.display(), "Finalizing recording");

        for src in std::iter::once(&self.video_src).chain(self.audio_src.as_ref()) {
            if let Err(e) = src.end_of_stream() {
                warn!(source = %src.name(), "Failed to send EOS: {:?}", e);
            }
        }

        let Some(bus) = self.pipeline.bus() else {
            let _ = self.pipeline.set_state(gst::State::Null);
            return Err("No bus available".to_string());
        };

        let timeout = gst::ClockTime::from_nseconds(timing::FINALIZE_TIMEOUT.as_nanos() as u64);
        let done = [gst::MessageType::Eos, gst::MessageType::Error];
        let result = match bus.timed_pop_filtered(timeout, &done) {
            Some(msg) => match msg.view() {
                gst::MessageView::Eos(..) => Ok(()),
                gst::MessageView::Error(err) => {
                    error!(
                        error = %err.error(),
                        debug = ?err.debug(),
                        source = ?err.src().map(|s| s.name()),
                        "GStreamer error during finalize"
                    );
                    Err(format!("Pipeline error: {}", err.error()))
                }
                _ => Ok(()),
            },
            None => Err("Timed out waiting for the muxer to finish".to_string()),
        };

        // Always set pipeline to NULL before dropping to avoid GStreamer warnings
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| format!("Failed to stop writer: {}", e))?;

        if result.is_ok() {
            info!(path = %self.output_path.display(), "Recording saved");
        }
        result
    }
}

impl Drop for GstWriter {
    fn drop(&mut self) {
        // Ensure pipeline is properly stopped to avoid GStreamer warnings
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
