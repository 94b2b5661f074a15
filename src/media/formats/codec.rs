// SPDX-License-Identifier: GPL-3.0-only

//! Recording codecs, containers and pixel format names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Video codec written into the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordingCodec {
    /// H.264/AVC
    #[default]
    H264,
    /// H.265/HEVC
    Hevc,
    /// H.265/HEVC carrying an alpha plane
    HevcWithAlpha,
    /// Motion JPEG
    Jpeg,
    ProRes422Proxy,
    ProRes422Lt,
    ProRes422,
    ProRes422Hq,
    ProRes4444,
}

impl RecordingCodec {
    pub const ALL: [RecordingCodec; 9] = [
        RecordingCodec::H264,
        RecordingCodec::Hevc,
        RecordingCodec::HevcWithAlpha,
        RecordingCodec::Jpeg,
        RecordingCodec::ProRes422Proxy,
        RecordingCodec::ProRes422Lt,
        RecordingCodec::ProRes422,
        RecordingCodec::ProRes422Hq,
        RecordingCodec::ProRes4444,
    ];

    /// Any member of the ProRes family
    pub fn is_professional(&self) -> bool {
        self.prores_profile().is_some()
    }

    pub fn is_hevc(&self) -> bool {
        matches!(self, Self::Hevc | Self::HevcWithAlpha)
    }

    /// Profile name understood by `avenc_prores_ks`
    pub fn prores_profile(&self) -> Option<&'static str> {
        match self {
            Self::ProRes422Proxy => Some("proxy"),
            Self::ProRes422Lt => Some("lt"),
            Self::ProRes422 => Some("standard"),
            Self::ProRes422Hq => Some("hq"),
            Self::ProRes4444 => Some("4444"),
            _ => None,
        }
    }

    /// Short name used in logs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Hevc => "hevc",
            Self::HevcWithAlpha => "hevc-alpha",
            Self::Jpeg => "jpeg",
            Self::ProRes422Proxy => "prores-proxy",
            Self::ProRes422Lt => "prores-lt",
            Self::ProRes422 => "prores",
            Self::ProRes422Hq => "prores-hq",
            Self::ProRes4444 => "prores-4444",
        }
    }
}

impl fmt::Display for RecordingCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordingCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "h265" | "h.265" => return Ok(Self::Hevc),
            "h.264" | "avc" => return Ok(Self::H264),
            "mjpeg" | "mjpg" => return Ok(Self::Jpeg),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown codec: {}", s))
    }
}

/// Output container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerType {
    /// QuickTime `.mov`
    QuickTimeMovie,
    /// MPEG-4 `.mp4`
    #[default]
    Mpeg4,
    /// Apple flavored MPEG-4 `.m4v`
    AppleM4v,
    /// 3GPP `.3gp`
    Type3gpp,
    /// 3GPP2 `.3g2`
    Type3gpp2,
}

impl ContainerType {
    pub const ALL: [ContainerType; 5] = [
        ContainerType::QuickTimeMovie,
        ContainerType::Mpeg4,
        ContainerType::AppleM4v,
        ContainerType::Type3gpp,
        ContainerType::Type3gpp2,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::QuickTimeMovie => "mov",
            Self::Mpeg4 => "mp4",
            Self::AppleM4v => "m4v",
            Self::Type3gpp => "3gp",
            Self::Type3gpp2 => "3g2",
        }
    }

    /// GStreamer muxer element for this container
    pub fn muxer_name(&self) -> &'static str {
        match self {
            Self::QuickTimeMovie => "qtmux",
            Self::Mpeg4 | Self::AppleM4v => "mp4mux",
            Self::Type3gpp | Self::Type3gpp2 => "3gppmux",
        }
    }

    /// Whether the container can carry the codec
    ///
    /// H.264 and HEVC go anywhere; alpha HEVC, Motion JPEG and ProRes need
    /// QuickTime.
    pub fn accepts(&self, codec: RecordingCodec) -> bool {
        match codec {
            RecordingCodec::H264 | RecordingCodec::Hevc => true,
            _ => *self == Self::QuickTimeMovie,
        }
    }

    /// Guess the container from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lower = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.extension() == lower)
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ContainerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quicktime" | "qt" => Ok(Self::QuickTimeMovie),
            "mpeg4" => Ok(Self::Mpeg4),
            other => Self::from_extension(other).ok_or_else(|| format!("Unknown container: {}", s)),
        }
    }
}

/// Map a device FourCC to the GStreamer raw format the writer accepts
///
/// Compressed capture formats (MJPG, H264) arrive decoded by the capture
/// layer, so they map to NV12 like anything unrecognized.
pub fn gst_raw_format(fourcc: &str) -> &'static str {
    match fourcc.to_uppercase().as_str() {
        "YUYV" | "YUY2" => "YUY2",
        "UYVY" => "UYVY",
        "YVYU" => "YVYU",
        "NV21" => "NV21",
        "YV12" => "YV12",
        "I420" | "IYUV" => "I420",
        "RGB" | "RGB3" | "RGB24" => "RGB",
        "RGBA" | "RGB4" | "RGB32" => "RGBA",
        "RGBX" => "RGBx",
        "BGR" | "BGR3" | "BGR24" => "BGR",
        "BGRA" | "BGR4" | "BGR32" => "BGRA",
        "BGRX" => "BGRx",
        "GREY" | "GRAY8" | "Y8" | "Y800" => "GRAY8",
        _ => "NV12",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_acceptance() {
        for container in ContainerType::ALL {
            assert!(container.accepts(RecordingCodec::H264));
            assert!(container.accepts(RecordingCodec::Hevc));
        }
        assert!(ContainerType::QuickTimeMovie.accepts(RecordingCodec::ProRes422Hq));
        assert!(!ContainerType::Mpeg4.accepts(RecordingCodec::ProRes422Hq));
        assert!(!ContainerType::AppleM4v.accepts(RecordingCodec::Jpeg));
        assert!(!ContainerType::Type3gpp.accepts(RecordingCodec::HevcWithAlpha));
    }

    #[test]
    fn test_prores_family() {
        assert!(RecordingCodec::ProRes4444.is_professional());
        assert_eq!(RecordingCodec::ProRes422Lt.prores_profile(), Some("lt"));
        assert!(!RecordingCodec::Hevc.is_professional());
        assert!(RecordingCodec::HevcWithAlpha.is_hevc());
    }

    #[test]
    fn test_codec_parsing() {
        assert_eq!("H265".parse::<RecordingCodec>(), Ok(RecordingCodec::Hevc));
        assert_eq!("prores-hq".parse::<RecordingCodec>(), Ok(RecordingCodec::ProRes422Hq));
        assert_eq!("mjpg".parse::<RecordingCodec>(), Ok(RecordingCodec::Jpeg));
        assert!("vp9".parse::<RecordingCodec>().is_err());
        assert_eq!("mov".parse::<ContainerType>(), Ok(ContainerType::QuickTimeMovie));
        assert_eq!(ContainerType::from_extension("3G2"), Some(ContainerType::Type3gpp2));
    }

    #[test]
    fn test_raw_format_mapping() {
        assert_eq!(gst_raw_format("yuyv"), "YUY2");
        assert_eq!(gst_raw_format("BGRX"), "BGRx");
        assert_eq!(gst_raw_format("MJPG"), "NV12");
        assert_eq!(gst_raw_format("NV12"), "NV12");
    }
}
