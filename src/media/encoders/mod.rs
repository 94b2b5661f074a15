// SPDX-License-Identifier: MPL-2.0

//! Media encoder selection and configuration
//!
//! This module provides centralized encoder selection for video and audio with:
//! - Hardware encoder priority per recording codec
//! - Software fallbacks for maximum compatibility
//! - Automatic encoder detection

pub mod audio;
pub mod detection;
pub mod video;

pub use audio::AudioQuality;
pub use detection::log_available_encoders;
