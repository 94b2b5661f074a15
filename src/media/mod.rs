// SPDX-License-Identifier: MPL-2.0

//! Media utilities for capture negotiation and encoding
//!
//! # Formats
//!
//! The [`formats`] module holds the recording codec and container tables, the
//! capability catalog over a capture device and the capture mode negotiator.
//!
//! # Encoders
//!
//! The [`encoders`] module handles video and audio encoder selection for the
//! writer pipeline:
//! - **Video**: H.264/H.265 with hardware acceleration, Motion JPEG, ProRes
//! - **Audio**: AAC with configurable quality

pub mod encoders;
pub mod formats;

pub use formats::{ContainerType, RecordingCodec};
