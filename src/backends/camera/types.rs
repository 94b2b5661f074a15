// SPDX-License-Identifier: GPL-3.0-only
// Shared types for capture device abstraction

//! Shared types for capture devices

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Color encoding applied to captured pixels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    /// sRGB / BT.709
    #[default]
    Standard,
    /// Wide gamut SDR (P3 / BT.2020 primaries)
    WideGamut,
    /// HLG BT.2020
    HighDynamicRange,
    /// Log-encoded capture intended for grading
    ProfessionalLog,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 4] = [
        ColorSpace::Standard,
        ColorSpace::WideGamut,
        ColorSpace::HighDynamicRange,
        ColorSpace::ProfessionalLog,
    ];

    /// Color spaces to try, in order, when this one is not available
    ///
    /// The requested value itself is not part of the chain.
    pub fn fallback_chain(&self) -> &'static [ColorSpace] {
        match self {
            ColorSpace::ProfessionalLog => &[
                ColorSpace::HighDynamicRange,
                ColorSpace::WideGamut,
                ColorSpace::Standard,
            ],
            ColorSpace::HighDynamicRange => &[ColorSpace::WideGamut, ColorSpace::Standard],
            ColorSpace::WideGamut => &[ColorSpace::Standard],
            ColorSpace::Standard => &[],
        }
    }

    /// GStreamer colorimetry string used when tagging raw video caps
    pub fn colorimetry(&self) -> &'static str {
        match self {
            ColorSpace::Standard => "bt709",
            ColorSpace::WideGamut => "bt2020",
            ColorSpace::HighDynamicRange => "bt2100-hlg",
            // Log curves have no GStreamer transfer; tag the primaries only
            ColorSpace::ProfessionalLog => "bt2020",
        }
    }

    /// Map a GStreamer colorimetry string reported by a device
    ///
    /// Log capture cannot be detected from caps and is never returned.
    pub fn from_colorimetry(colorimetry: &str) -> Option<Self> {
        match colorimetry {
            "bt709" | "sRGB" | "bt601" | "smpte240m" => Some(ColorSpace::Standard),
            "bt2020" | "bt2020-10" => Some(ColorSpace::WideGamut),
            "bt2100-hlg" | "bt2100-pq" => Some(ColorSpace::HighDynamicRange),
            _ => None,
        }
    }

    /// Short name used in logs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSpace::Standard => "standard",
            ColorSpace::WideGamut => "wide-gamut",
            ColorSpace::HighDynamicRange => "hdr",
            ColorSpace::ProfessionalLog => "log",
        }
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "srgb" | "bt709" => Ok(ColorSpace::Standard),
            "wide-gamut" | "p3" | "wide" => Ok(ColorSpace::WideGamut),
            "hdr" | "hlg" | "high-dynamic-range" => Ok(ColorSpace::HighDynamicRange),
            "log" | "professional-log" => Ok(ColorSpace::ProfessionalLog),
            other => Err(format!("Unknown color space: {}", other)),
        }
    }
}

/// Framerate as a fraction (numerator/denominator)
/// Stores exact framerate to handle NTSC rates like 59.94fps (60000/1001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Create a framerate from an integer (e.g., 30 becomes 30/1)
    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the framerate as a floating point value
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    /// Duration of one frame at this rate
    pub fn frame_duration(&self) -> Duration {
        if self.num == 0 {
            return Duration::MAX;
        }
        Duration::from_nanos(self.denom as u64 * 1_000_000_000 / self.num as u64)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.as_f64())
        } else {
            write!(f, "{}", self.num)
        }
    }
}

/// Pixel dimensions of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// True if this size fits inside `other` regardless of orientation
    pub fn fits_within(&self, other: Resolution) -> bool {
        self.long_edge() <= other.long_edge() && self.short_edge() <= other.short_edge()
    }

    /// Rotate to match the orientation of `other`
    pub fn oriented_like(&self, other: Resolution) -> Resolution {
        if self.is_portrait() == other.is_portrait() {
            *self
        } else {
            Resolution::new(self.height, self.width)
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Expected WIDTHxHEIGHT, got {}", s))?;
        let width = w.trim().parse().map_err(|_| format!("Invalid width: {}", w))?;
        let height = h.trim().parse().map_err(|_| format!("Invalid height: {}", h))?;
        Ok(Resolution::new(width, height))
    }
}

/// One operating mode advertised by a capture device
///
/// A read-only snapshot: catalogs and negotiators query it but never write
/// back to the device through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCaptureMode {
    pub width: u32,
    pub height: u32,
    /// Shortest frame interval (highest framerate)
    pub min_frame_duration: Duration,
    /// Longest frame interval (lowest framerate)
    pub max_frame_duration: Duration,
    /// Color spaces in the order the device reports them
    pub supported_color_spaces: Vec<ColorSpace>,
    /// Pixel layout FourCC (e.g., "NV12", "YUYV", "MJPG")
    pub pixel_format: String,
}

impl DeviceCaptureMode {
    /// Create a mode from its framerate range
    pub fn new(
        resolution: Resolution,
        min_framerate: Framerate,
        max_framerate: Framerate,
        color_spaces: &[ColorSpace],
        pixel_format: &str,
    ) -> Self {
        let mut supported_color_spaces = Vec::with_capacity(color_spaces.len());
        for cs in color_spaces {
            if !supported_color_spaces.contains(cs) {
                supported_color_spaces.push(*cs);
            }
        }

        Self {
            width: resolution.width,
            height: resolution.height,
            min_frame_duration: max_framerate.frame_duration(),
            max_frame_duration: min_framerate.frame_duration(),
            supported_color_spaces,
            pixel_format: pixel_format.to_string(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.resolution().pixel_count()
    }

    /// Highest framerate this mode can deliver
    pub fn max_framerate(&self) -> f64 {
        duration_to_fps(self.min_frame_duration)
    }

    /// Lowest framerate this mode can deliver
    pub fn min_framerate(&self) -> f64 {
        duration_to_fps(self.max_frame_duration)
    }

    pub fn supports_color_space(&self, color_space: ColorSpace) -> bool {
        self.supported_color_spaces.contains(&color_space)
    }

    /// Check if the mode reaches `fps`
    ///
    /// Tolerates NTSC rates, so a 29.97fps mode satisfies a 30fps request.
    pub fn supports_framerate(&self, fps: u32) -> bool {
        self.max_framerate() + 0.05 >= fps as f64 * (1000.0 / 1001.0)
    }
}

fn duration_to_fps(duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    1.0 / duration.as_secs_f64()
}

impl std::fmt::Display for DeviceCaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let spaces: Vec<&str> = self
            .supported_color_spaces
            .iter()
            .map(|cs| cs.as_str())
            .collect();
        write!(
            f,
            "{}x{} @ {:.0}-{:.0}fps {} [{}]",
            self.width,
            self.height,
            self.min_framerate(),
            self.max_framerate(),
            self.pixel_format,
            spaces.join(", ")
        )
    }
}

/// Configuration applied to a device before recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub mode: DeviceCaptureMode,
    pub color_space: ColorSpace,
    /// Fixed framerate; `None` keeps the device default
    pub frame_rate: Option<u32>,
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Capture device not found
    DeviceNotFound(String),
    /// Another client holds the configuration lock
    Busy,
    /// Format not supported by the device
    FormatNotSupported(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::Busy => write!(f, "Device is locked by another client"),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_chains() {
        assert_eq!(
            ColorSpace::ProfessionalLog.fallback_chain(),
            &[
                ColorSpace::HighDynamicRange,
                ColorSpace::WideGamut,
                ColorSpace::Standard
            ]
        );
        assert_eq!(
            ColorSpace::HighDynamicRange.fallback_chain(),
            &[ColorSpace::WideGamut, ColorSpace::Standard]
        );
        assert_eq!(ColorSpace::WideGamut.fallback_chain(), &[ColorSpace::Standard]);
        assert!(ColorSpace::Standard.fallback_chain().is_empty());
    }

    #[test]
    fn test_mode_framerate_range() {
        let mode = DeviceCaptureMode::new(
            Resolution::new(1920, 1080),
            Framerate::from_int(1),
            Framerate::from_int(60),
            &[ColorSpace::Standard],
            "NV12",
        );
        assert!((mode.max_framerate() - 60.0).abs() < 0.01);
        assert!((mode.min_framerate() - 1.0).abs() < 0.01);
        assert!(mode.supports_framerate(60));
        assert!(!mode.supports_framerate(120));
    }

    #[test]
    fn test_ntsc_rate_satisfies_integer_request() {
        let mode = DeviceCaptureMode::new(
            Resolution::new(1280, 720),
            Framerate::from_int(15),
            Framerate::new(30000, 1001),
            &[ColorSpace::Standard],
            "YUYV",
        );
        assert!(mode.supports_framerate(30));
        assert!(!mode.supports_framerate(31));
    }

    #[test]
    fn test_mode_deduplicates_color_spaces() {
        let mode = DeviceCaptureMode::new(
            Resolution::new(640, 480),
            Framerate::from_int(30),
            Framerate::from_int(30),
            &[ColorSpace::Standard, ColorSpace::Standard, ColorSpace::WideGamut],
            "NV12",
        );
        assert_eq!(
            mode.supported_color_spaces,
            vec![ColorSpace::Standard, ColorSpace::WideGamut]
        );
    }

    #[test]
    fn test_resolution_orientation() {
        let fhd = Resolution::new(1920, 1080);
        let portrait_preview = Resolution::new(1080, 1920);
        assert!(fhd.fits_within(portrait_preview));
        assert_eq!(fhd.oriented_like(portrait_preview), portrait_preview);
        assert_eq!("1280x720".parse::<Resolution>(), Ok(Resolution::new(1280, 720)));
        assert!("1280".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_color_space_parsing() {
        assert_eq!("HDR".parse::<ColorSpace>(), Ok(ColorSpace::HighDynamicRange));
        assert_eq!("log".parse::<ColorSpace>(), Ok(ColorSpace::ProfessionalLog));
        assert_eq!(ColorSpace::from_colorimetry("bt2100-pq"), Some(ColorSpace::HighDynamicRange));
        assert_eq!(ColorSpace::from_colorimetry("unknown"), None);
    }
}
