// SPDX-License-Identifier: GPL-3.0-only

//! Recorder-wide constants and quality presets

use crate::backends::camera::types::Resolution;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Frame rate asked of the negotiator when the caller sets none
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Recording quality tier
///
/// Each tier names a nominal pixel size. The size actually recorded never
/// exceeds what the live preview delivers, see [`QualityTier::clamp_to_preview`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum QualityTier {
    /// 352x288 (CIF)
    Lowest,
    /// 640x480
    Sd,
    /// 1280x720
    Hd,
    /// 1920x1080
    #[default]
    Fhd,
    /// 3840x2160
    Uhd,
    /// Whatever the preview delivers
    Highest,
}

impl QualityTier {
    pub const ALL: [QualityTier; 6] = [
        QualityTier::Lowest,
        QualityTier::Sd,
        QualityTier::Hd,
        QualityTier::Fhd,
        QualityTier::Uhd,
        QualityTier::Highest,
    ];

    /// Nominal size; `None` for [`QualityTier::Highest`]
    pub fn nominal_size(&self) -> Option<Resolution> {
        match self {
            QualityTier::Lowest => Some(Resolution::new(352, 288)),
            QualityTier::Sd => Some(Resolution::new(640, 480)),
            QualityTier::Hd => Some(Resolution::new(1280, 720)),
            QualityTier::Fhd => Some(Resolution::new(1920, 1080)),
            QualityTier::Uhd => Some(Resolution::new(3840, 2160)),
            QualityTier::Highest => None,
        }
    }

    /// Effective recording size for a preview of the given size
    ///
    /// Edges are compared long-to-long and short-to-short. A tier that does
    /// not fit yields the preview size; the result always has the preview's
    /// orientation.
    pub fn clamp_to_preview(&self, preview: Resolution) -> Resolution {
        match self.nominal_size() {
            Some(nominal) if nominal.fits_within(preview) => nominal.oriented_like(preview),
            _ => preview,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QualityTier::Lowest => "Lowest",
            QualityTier::Sd => "SD",
            QualityTier::Hd => "720p",
            QualityTier::Fhd => "1080p",
            QualityTier::Uhd => "4K",
            QualityTier::Highest => "Highest",
        }
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowest" | "low" | "cif" => Ok(QualityTier::Lowest),
            "sd" | "480p" => Ok(QualityTier::Sd),
            "hd" | "720p" => Ok(QualityTier::Hd),
            "fhd" | "1080p" => Ok(QualityTier::Fhd),
            "uhd" | "4k" | "2160p" => Ok(QualityTier::Uhd),
            "highest" | "max" | "preview" => Ok(QualityTier::Highest),
            other => Err(format!("Unknown quality tier: {}", other)),
        }
    }
}

/// Video encoder bitrate presets
///
/// These presets define the target bitrate for video encoding based on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitratePreset {
    /// Low bitrate - smaller files, reduced quality
    Low,
    /// Medium bitrate - balanced quality and file size (default)
    #[default]
    Medium,
    /// High bitrate - larger files, better quality
    High,
}

impl BitratePreset {
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Get bitrate in kbps for a frame size
    ///
    /// Tiers go by the long edge so portrait sizes land in the same tier as
    /// their landscape counterpart:
    /// - up to CIF: Low=0.5, Medium=1, High=2 Mbps
    /// - SD (640x480): Low=1, Medium=2, High=4 Mbps
    /// - HD (1280x720): Low=2.5, Medium=5, High=10 Mbps
    /// - Full HD (1920x1080): Low=4, Medium=8, High=16 Mbps
    /// - 2K (2560x1440): Low=8, Medium=16, High=32 Mbps
    /// - 4K (3840x2160): Low=15, Medium=30, High=50 Mbps
    pub fn bitrate_kbps(&self, resolution: Resolution) -> u32 {
        match (ResolutionTier::of(resolution), self) {
            (ResolutionTier::Cif, BitratePreset::Low) => 500,
            (ResolutionTier::Cif, BitratePreset::Medium) => 1_000,
            (ResolutionTier::Cif, BitratePreset::High) => 2_000,
            (ResolutionTier::Sd, BitratePreset::Low) => 1_000,
            (ResolutionTier::Sd, BitratePreset::Medium) => 2_000,
            (ResolutionTier::Sd, BitratePreset::High) => 4_000,
            (ResolutionTier::Hd, BitratePreset::Low) => 2_500,
            (ResolutionTier::Hd, BitratePreset::Medium) => 5_000,
            (ResolutionTier::Hd, BitratePreset::High) => 10_000,
            (ResolutionTier::FullHd, BitratePreset::Low) => 4_000,
            (ResolutionTier::FullHd, BitratePreset::Medium) => 8_000,
            (ResolutionTier::FullHd, BitratePreset::High) => 16_000,
            (ResolutionTier::TwoK, BitratePreset::Low) => 8_000,
            (ResolutionTier::TwoK, BitratePreset::Medium) => 16_000,
            (ResolutionTier::TwoK, BitratePreset::High) => 32_000,
            (ResolutionTier::FourK, BitratePreset::Low) => 15_000,
            (ResolutionTier::FourK, BitratePreset::Medium) => 30_000,
            (ResolutionTier::FourK, BitratePreset::High) => 50_000,
        }
    }
}

impl FromStr for BitratePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(BitratePreset::Low),
            "medium" => Ok(BitratePreset::Medium),
            "high" => Ok(BitratePreset::High),
            other => Err(format!("Unknown bitrate preset: {}", other)),
        }
    }
}

/// Resolution tiers for bitrate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionTier {
    Cif,
    Sd,
    Hd,
    FullHd,
    TwoK,
    FourK,
}

impl ResolutionTier {
    pub fn of(resolution: Resolution) -> Self {
        match resolution.long_edge() {
            w if w >= 3840 => ResolutionTier::FourK,
            w if w >= 2560 => ResolutionTier::TwoK,
            w if w >= 1920 => ResolutionTier::FullHd,
            w if w >= 1280 => ResolutionTier::Hd,
            w if w >= 640 => ResolutionTier::Sd,
            _ => ResolutionTier::Cif,
        }
    }
}

/// Audio format handed to the writer by the capture layer
pub mod audio {
    /// Sample rate in Hz
    pub const SAMPLE_RATE: u32 = 48_000;

    /// Interleaved channel count
    pub const CHANNELS: u32 = 2;

    /// GStreamer raw audio format (signed 16-bit little endian, interleaved)
    pub const FORMAT: &str = "S16LE";
}

/// Writer tuning
pub mod writer {
    /// Bytes an input may queue before it reports not ready
    pub const MAX_QUEUED_BYTES: u64 = 64 * 1024 * 1024;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// How long the writer pipeline gets to report a startup error
    pub const WRITER_START_CHECK: Duration = Duration::from_millis(200);

    /// Upper bound on waiting for the muxer to finish the file
    pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sample counter modulo for periodic logging
    pub const SAMPLE_LOG_INTERVAL: u64 = 300;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_clamped_to_small_preview() {
        let preview = Resolution::new(1280, 720);
        assert_eq!(QualityTier::Uhd.clamp_to_preview(preview), preview);
        assert_eq!(QualityTier::Sd.clamp_to_preview(preview), Resolution::new(640, 480));
        assert_eq!(QualityTier::Highest.clamp_to_preview(preview), preview);
    }

    #[test]
    fn test_tier_follows_preview_orientation() {
        let portrait = Resolution::new(1080, 1920);
        assert_eq!(QualityTier::Hd.clamp_to_preview(portrait), Resolution::new(720, 1280));
        assert_eq!(QualityTier::Fhd.clamp_to_preview(portrait), portrait);
    }

    #[test]
    fn test_tier_uses_preview_when_one_edge_overflows() {
        // 640x480 is 4:3; a 720x400 preview is wider but shorter
        let preview = Resolution::new(720, 400);
        assert_eq!(QualityTier::Sd.clamp_to_preview(preview), preview);
    }

    #[test]
    fn test_resolution_tiers() {
        assert_eq!(ResolutionTier::of(Resolution::new(352, 288)), ResolutionTier::Cif);
        assert_eq!(ResolutionTier::of(Resolution::new(1080, 1920)), ResolutionTier::FullHd);
        assert_eq!(ResolutionTier::of(Resolution::new(3840, 2160)), ResolutionTier::FourK);
    }
}
