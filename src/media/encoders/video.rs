// SPDX-License-Identifier: MPL-2.0

//! Video encoder selection with hardware acceleration priority
//!
//! Each recording codec maps to an ordered list of GStreamer encoders,
//! hardware first. The first one that can be instantiated wins.

use crate::media::formats::codec::RecordingCodec;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Information about an available encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInfo {
    /// GStreamer element name
    pub element_name: &'static str,
    /// Display name for logs and the CLI
    pub display_name: &'static str,
    /// Whether this is hardware accelerated
    pub is_hardware: bool,
}

const fn hw(element_name: &'static str, display_name: &'static str) -> EncoderInfo {
    EncoderInfo {
        element_name,
        display_name,
        is_hardware: true,
    }
}

const fn sw(element_name: &'static str, display_name: &'static str) -> EncoderInfo {
    EncoderInfo {
        element_name,
        display_name,
        is_hardware: false,
    }
}

const H264_ENCODERS: &[EncoderInfo] = &[
    hw("vah264enc", "VA-API H.264 (HW)"),
    hw("vaapih264enc", "VA-API H.264 (HW)"),
    hw("nvh264enc", "NVIDIA H.264 (HW)"),
    hw("qsvh264enc", "Intel QSV H.264 (HW)"),
    hw("amfh264enc", "AMD AMF H.264 (HW)"),
    hw("v4l2h264enc", "V4L2 H.264 (HW)"),
    sw("x264enc", "x264 H.264 (SW)"),
    sw("openh264enc", "OpenH264 H.264 (SW)"),
];

const HEVC_ENCODERS: &[EncoderInfo] = &[
    hw("vah265enc", "VA-API H.265 (HW)"),
    hw("vaapih265enc", "VA-API H.265 (HW)"),
    hw("nvh265enc", "NVIDIA H.265 (HW)"),
    hw("qsvh265enc", "Intel QSV H.265 (HW)"),
    hw("amfh265enc", "AMD AMF H.265 (HW)"),
    hw("v4l2h265enc", "V4L2 H.265 (HW)"),
    sw("x265enc", "x265 H.265 (SW)"),
];

const JPEG_ENCODERS: &[EncoderInfo] = &[
    hw("vajpegenc", "VA-API JPEG (HW)"),
    sw("jpegenc", "libjpeg (SW)"),
];

const PRORES_ENCODERS: &[EncoderInfo] = &[
    sw("avenc_prores_ks", "FFmpeg ProRes (SW)"),
    sw("avenc_prores_aw", "FFmpeg ProRes (SW)"),
];

/// Encoders able to produce the codec, in priority order
pub fn candidates(codec: RecordingCodec) -> &'static [EncoderInfo] {
    match codec {
        RecordingCodec::H264 => H264_ENCODERS,
        RecordingCodec::Hevc | RecordingCodec::HevcWithAlpha => HEVC_ENCODERS,
        RecordingCodec::Jpeg => JPEG_ENCODERS,
        _ => PRORES_ENCODERS,
    }
}

/// Parser placed between encoder and muxer, if the codec needs one
pub fn parser_name(codec: RecordingCodec) -> Option<&'static str> {
    match codec {
        RecordingCodec::H264 => Some("h264parse"),
        RecordingCodec::Hevc | RecordingCodec::HevcWithAlpha => Some("h265parse"),
        _ => None,
    }
}

/// Selected video encoder
pub struct SelectedVideoEncoder {
    /// The encoder element
    pub encoder: gst::Element,
    /// Optional parser element
    pub parser: Option<gst::Element>,
    pub info: EncoderInfo,
}

/// Enumerate installed encoders for a codec, in priority order
pub fn enumerate_video_encoders(codec: RecordingCodec) -> Vec<EncoderInfo> {
    if gst::init().is_err() {
        return Vec::new();
    }

    candidates(codec)
        .iter()
        .filter(|info| gst::ElementFactory::find(info.element_name).is_some())
        .cloned()
        .collect()
}

/// Select the best available encoder for the codec
///
/// # Arguments
/// * `codec` - Codec to produce
/// * `bitrate_kbps` - Target bitrate for rate-controlled encoders
///
/// # Returns
/// * `Ok(SelectedVideoEncoder)` - Selected encoder with configuration
/// * `Err(String)` - Error message if no encoder available
pub fn select_video_encoder(
    codec: RecordingCodec,
    bitrate_kbps: u32,
) -> Result<SelectedVideoEncoder, String> {
    gst::init().map_err(|e| format!("Failed to initialize GStreamer: {}", e))?;

    if codec == RecordingCodec::HevcWithAlpha {
        warn!("No alpha-capable HEVC encoder wired up, encoding without alpha");
    }

    for info in candidates(codec) {
        let Ok(encoder) = gst::ElementFactory::make(info.element_name).build() else {
            continue;
        };

        info!(
            encoder = info.element_name,
            %codec,
            hardware = info.is_hardware,
            "Selected video encoder"
        );

        configure_video_encoder(&encoder, info.element_name, codec, bitrate_kbps);

        let parser = match parser_name(codec) {
            Some(name) => match gst::ElementFactory::make(name).build() {
                Ok(p) => {
                    debug!("Created parser: {}", name);
                    Some(p)
                }
                Err(e) => {
                    warn!("Failed to create parser {}: {}", name, e);
                    None
                }
            },
            None => None,
        };

        return Ok(SelectedVideoEncoder {
            encoder,
            parser,
            info: info.clone(),
        });
    }

    Err(format!(
        "No {} encoder available. Tried: {}",
        codec,
        candidates(codec)
            .iter()
            .map(|i| i.element_name)
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

/// Configure encoder based on type and target bitrate
fn configure_video_encoder(
    encoder: &gst::Element,
    encoder_name: &str,
    codec: RecordingCodec,
    bitrate: u32,
) {
    match encoder_name {
        "x264enc" => {
            encoder.set_property_from_str("speed-preset", "veryfast");
            encoder.set_property_from_str("tune", "zerolatency");
            encoder.set_property("bitrate", bitrate);
            debug!("Configured x264enc: bitrate={} kbps", bitrate);
        }

        "x265enc" => {
            encoder.set_property_from_str("speed-preset", "veryfast");
            encoder.set_property("bitrate", bitrate);
            debug!("Configured x265enc: bitrate={} kbps", bitrate);
        }

        "vaapih264enc" | "vaapih265enc" | "vah264enc" | "vah265enc" => {
            encoder.set_property_from_str("rate-control", "cbr");
            encoder.set_property("bitrate", bitrate);
            debug!("Configured VA-API encoder: bitrate={} kbps", bitrate);
        }

        "nvh264enc" | "nvh265enc" => {
            encoder.set_property("bitrate", bitrate);
            encoder.set_property_from_str("rc-mode", "vbr");
            debug!("Configured NVIDIA encoder: bitrate={} kbps", bitrate);
        }

        "amfh264enc" | "amfh265enc" => {
            encoder.set_property("bitrate", bitrate);
            encoder.set_property_from_str("rate-control", "cbr");
            debug!("Configured AMD AMF encoder: bitrate={} kbps", bitrate);
        }

        "qsvh264enc" | "qsvh265enc" => {
            encoder.set_property("bitrate", bitrate);
            debug!("Configured Intel QSV encoder: bitrate={} kbps", bitrate);
        }

        "openh264enc" => {
            encoder.set_property_from_str("rate-control", "bitrate");
            encoder.set_property("bitrate", bitrate * 1000); // Bits per second
            encoder.set_property_from_str("usage-type", "camera");
            debug!("Configured openh264enc: bitrate={} bps", bitrate * 1000);
        }

        "avenc_prores_ks" => {
            if let Some(profile) = codec.prores_profile()
                && encoder.has_property("profile")
            {
                encoder.set_property_from_str("profile", profile);
                debug!("Configured avenc_prores_ks: profile={}", profile);
            }
        }

        "jpegenc" => {
            encoder.set_property("quality", 90i32);
        }

        _ => {
            debug!(encoder = encoder_name, "Using default encoder configuration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_prefer_hardware() {
        for codec in [RecordingCodec::H264, RecordingCodec::Hevc] {
            let list = candidates(codec);
            let first_sw = list.iter().position(|i| !i.is_hardware).unwrap();
            assert!(list[first_sw..].iter().all(|i| !i.is_hardware));
        }
    }

    #[test]
    fn test_prores_family_shares_encoders() {
        assert_eq!(
            candidates(RecordingCodec::ProRes422Proxy),
            candidates(RecordingCodec::ProRes4444)
        );
        assert_eq!(parser_name(RecordingCodec::ProRes422Hq), None);
        assert_eq!(parser_name(RecordingCodec::HevcWithAlpha), Some("h265parse"));
    }
}
