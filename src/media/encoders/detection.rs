// SPDX-License-Identifier: MPL-2.0

//! GStreamer encoder detection
//!
//! Reports which encoders the local GStreamer installation provides for each
//! recording codec.

use super::audio::AAC_ENCODERS;
use super::video::enumerate_video_encoders;
use crate::media::formats::codec::RecordingCodec;
use gstreamer as gst;
use tracing::{debug, info};

/// Check if a specific GStreamer element is available
pub fn is_element_available(element_name: &str) -> bool {
    gst::init().ok();
    gst::ElementFactory::find(element_name).is_some()
}

/// Installed encoder element names per recording codec
pub fn detect_video_encoders() -> Vec<(RecordingCodec, Vec<&'static str>)> {
    RecordingCodec::ALL
        .into_iter()
        .map(|codec| {
            let names: Vec<&'static str> = enumerate_video_encoders(codec)
                .into_iter()
                .map(|info| info.element_name)
                .collect();
            debug!(%codec, available = ?names, "Video encoders");
            (codec, names)
        })
        .collect()
}

/// Installed AAC encoder element names
pub fn detect_audio_encoders() -> Vec<&'static str> {
    let available: Vec<&'static str> = AAC_ENCODERS
        .iter()
        .copied()
        .filter(|name| is_element_available(name))
        .collect();

    info!("Detected {} audio encoders", available.len());
    available
}

/// Log all available encoders (for debugging)
pub fn log_available_encoders() {
    info!("=== GStreamer Encoder Detection ===");

    for (codec, encoders) in detect_video_encoders() {
        info!(%codec, encoders = ?encoders, "Video encoders");
    }

    info!(encoders = ?detect_audio_encoders(), "Audio encoders");
}
