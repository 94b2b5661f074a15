// SPDX-License-Identifier: MPL-2.0

//! Encoder selection for the writer pipeline
//!
//! This module provides a simple interface to select video and audio encoders
//! for resolved recording settings.

use super::settings::WriterSettings;
use crate::media::encoders::{
    audio::{AudioQuality, SelectedAudioEncoder, select_audio_encoder},
    video::{SelectedVideoEncoder, select_video_encoder},
};
use crate::media::formats::codec::RecordingCodec;

/// Configuration for encoder selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub codec: RecordingCodec,
    /// Video bitrate in kbps
    pub bitrate_kbps: u32,
    pub audio_quality: AudioQuality,
    pub enable_audio: bool,
}

impl EncoderConfig {
    pub fn from_settings(settings: &WriterSettings, audio_quality: AudioQuality) -> Self {
        Self {
            codec: settings.codec,
            bitrate_kbps: settings.bitrate_kbps,
            audio_quality,
            enable_audio: settings.enable_audio,
        }
    }
}

/// Selected encoders for recording
pub struct SelectedEncoders {
    pub video: SelectedVideoEncoder,
    /// Audio encoder (`None` if disabled or unavailable)
    pub audio: Option<SelectedAudioEncoder>,
}

/// Select best available encoders based on configuration
///
/// A missing video encoder is an error; a missing audio encoder only drops
/// the audio track.
///
/// # Returns
/// * `Ok(SelectedEncoders)` - Selected encoders
/// * `Err(String)` - Error message if encoder selection fails
pub fn select_encoders(config: &EncoderConfig) -> Result<SelectedEncoders, String> {
    let video = select_video_encoder(config.codec, config.bitrate_kbps)?;

    let audio = if config.enable_audio {
        match select_audio_encoder(config.audio_quality) {
            Ok(encoder) => Some(encoder),
            Err(e) => {
                tracing::warn!(
                    "Failed to select audio encoder: {}. Recording without audio.",
                    e
                );
                None
            }
        }
    } else {
        None
    };

    Ok(SelectedEncoders { video, audio })
}
