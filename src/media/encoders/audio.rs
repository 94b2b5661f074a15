// SPDX-License-Identifier: MPL-2.0

//! Audio encoder selection with quality configuration
//!
//! Every supported container (MP4, QuickTime, 3GPP) carries AAC, so only AAC
//! encoders are considered.

use gstreamer as gst;
use gstreamer::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// AAC encoders in priority order
pub const AAC_ENCODERS: &[&str] = &["avenc_aac", "fdkaacenc", "voaacenc", "faac"];

/// Audio quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioQuality {
    /// Low quality (64 kbps)
    Low,
    /// Medium quality (96 kbps)
    Medium,
    /// High quality (128 kbps)
    #[default]
    High,
    /// Maximum quality (192 kbps)
    Maximum,
}

impl AudioQuality {
    /// Get bitrate in bits per second
    pub fn bitrate_bps(&self) -> i32 {
        match self {
            AudioQuality::Low => 64_000,
            AudioQuality::Medium => 96_000,
            AudioQuality::High => 128_000,
            AudioQuality::Maximum => 192_000,
        }
    }
}

/// Selected audio encoder
pub struct SelectedAudioEncoder {
    /// The encoder element
    pub encoder: gst::Element,
    pub element_name: &'static str,
}

/// Select the best available AAC encoder
///
/// # Returns
/// * `Ok(SelectedAudioEncoder)` - Selected encoder with configuration
/// * `Err(String)` - Error message if no encoder available
pub fn select_audio_encoder(quality: AudioQuality) -> Result<SelectedAudioEncoder, String> {
    gst::init().map_err(|e| format!("Failed to initialize GStreamer: {}", e))?;

    for encoder_name in AAC_ENCODERS {
        if let Ok(encoder) = gst::ElementFactory::make(encoder_name).build() {
            info!(encoder = %encoder_name, "Selected audio encoder");
            configure_aac_encoder(&encoder, encoder_name, quality);
            return Ok(SelectedAudioEncoder {
                encoder,
                element_name: encoder_name,
            });
        }
    }

    Err(concat!(
        "No AAC encoder available. Please install gstreamer1-libav (avenc_aac) ",
        "or gstreamer1-plugins-bad (fdkaacenc, voaacenc)"
    )
    .to_string())
}

/// Configure AAC encoder
fn configure_aac_encoder(encoder: &gst::Element, encoder_name: &str, quality: AudioQuality) {
    let bitrate = quality.bitrate_bps();

    match encoder_name {
        "avenc_aac" | "fdkaacenc" | "voaacenc" | "faac" => {
            // All four take bits per second
            encoder.set_property("bitrate", bitrate);
            debug!("Configured {}: bitrate={} bps", encoder_name, bitrate);
        }

        _ => {
            debug!("Unknown AAC encoder type, using default configuration");
        }
    }
}
