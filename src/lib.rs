// SPDX-License-Identifier: MPL-2.0

//! Camera Recorder - real-time audio/video recording core
//!
//! # Architecture
//!
//! - [`backends`]: Capture devices and their capture modes
//! - [`media`]: Codecs, containers, format negotiation and encoder selection
//! - [`pipelines`]: Settings resolution, timing correction and the recording engine
//! - [`config`]: Persisted recorder defaults
//!
//! # Example
//!
//! ```ignore
//! let engine = Arc::new(RecordingEngine::with_gstreamer(&config));
//! engine.configure_and_start(&path, &device, &options, QualityTier::Fhd, preview)?;
//! // producer threads call engine.push_video / engine.push_audio
//! let recorded = engine.stop().await?;
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;

// Re-export commonly used types
pub use backends::camera::types::{ColorSpace, DeviceCaptureMode, Resolution};
pub use backends::camera::{CaptureDevice, StaticDevice};
pub use config::RecorderConfig;
pub use constants::{BitratePreset, QualityTier};
pub use errors::{NegotiationError, RecordingError, RecordingResult};
pub use media::{ContainerType, RecordingCodec};
pub use pipelines::video::{RecorderState, RecordingEngine, RecordingOptions, Sample, StreamKind};
