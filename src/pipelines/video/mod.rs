// SPDX-License-Identifier: MPL-2.0

//! Recording pipeline
//!
//! This module turns recording options into a running session:
//! - Resolves options against the device into [`WriterSettings`]
//! - Corrects per-stream timestamps across disconnections
//! - Feeds samples to a [`MediaWriter`] (GStreamer by default)
//! - Drives the session lifecycle through [`RecordingEngine`]

pub mod encoder_selection;
pub mod muxer;
pub mod recorder;
pub mod sample;
pub mod settings;
pub mod timing;

// Re-export commonly used types
pub use encoder_selection::EncoderConfig;
pub use muxer::{GstWriterFactory, MediaWriter, WriterFactory};
pub use recorder::{
    DeliveryOutcome, DropReason, RecorderState, RecordingEngine, RecordingStats, StreamStats,
};
pub use sample::{Sample, StreamKind};
pub use settings::{RecordingOptions, Substitution, WriterSettings, resolve};
pub use timing::{StreamTimingCorrector, TimingDecision};

// Re-export encoder types for convenience
pub use crate::media::encoders::AudioQuality;
