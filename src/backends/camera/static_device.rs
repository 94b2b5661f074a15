// SPDX-License-Identifier: GPL-3.0-only

//! Table-backed capture device
//!
//! Holds a mode table that can be loaded from a JSON device profile. Used for
//! devices whose capabilities are known up front, for the built-in test
//! pattern source, and in tests.

use super::CaptureDevice;
use super::types::{
    BackendError, BackendResult, ColorSpace, DeviceCaptureMode, DeviceConfiguration, Framerate,
    Resolution,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// One mode entry in a device profile file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_min_fps")]
    pub min_fps: u32,
    pub max_fps: u32,
    #[serde(default = "default_color_spaces")]
    pub color_spaces: Vec<ColorSpace>,
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,
}

fn default_min_fps() -> u32 {
    1
}

fn default_color_spaces() -> Vec<ColorSpace> {
    vec![ColorSpace::Standard]
}

fn default_pixel_format() -> String {
    "NV12".to_string()
}

impl From<&ModeProfile> for DeviceCaptureMode {
    fn from(profile: &ModeProfile) -> Self {
        DeviceCaptureMode::new(
            Resolution::new(profile.width, profile.height),
            Framerate::from_int(profile.min_fps),
            Framerate::from_int(profile.max_fps),
            &profile.color_spaces,
            &profile.pixel_format,
        )
    }
}

/// JSON device profile
///
/// ```json
/// { "name": "Rear camera",
///   "modes": [ { "width": 1920, "height": 1080, "max_fps": 60,
///                "color_spaces": ["standard", "wide-gamut"] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub modes: Vec<ModeProfile>,
}

/// Capture device backed by an in-memory mode table
#[derive(Debug)]
pub struct StaticDevice {
    name: String,
    modes: RwLock<Vec<DeviceCaptureMode>>,
    active: Mutex<Option<DeviceConfiguration>>,
    locked_elsewhere: AtomicBool,
}

impl StaticDevice {
    /// Create a device from a list of modes
    pub fn new(name: impl Into<String>, modes: Vec<DeviceCaptureMode>) -> Self {
        Self {
            name: name.into(),
            modes: RwLock::new(modes),
            active: Mutex::new(None),
            locked_elsewhere: AtomicBool::new(false),
        }
    }

    /// Create a device from a parsed profile
    pub fn from_profile(profile: &DeviceProfile) -> Self {
        let modes = profile.modes.iter().map(DeviceCaptureMode::from).collect();
        Self::new(profile.name.clone(), modes)
    }

    /// Load a device profile from a JSON file
    pub fn load_profile(path: &Path) -> BackendResult<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| BackendError::DeviceNotFound(format!("{}: {}", path.display(), e)))?;
        let profile: DeviceProfile = serde_json::from_str(&data)
            .map_err(|e| BackendError::Other(format!("Invalid device profile: {}", e)))?;

        info!(
            path = %path.display(),
            name = %profile.name,
            modes = profile.modes.len(),
            "Loaded device profile"
        );
        Ok(Self::from_profile(&profile))
    }

    /// Synthetic device matching what `videotestsrc` can produce
    pub fn test_pattern() -> Self {
        let spaces = [
            ColorSpace::Standard,
            ColorSpace::WideGamut,
            ColorSpace::HighDynamicRange,
        ];
        let modes = [(640, 480), (1280, 720), (1920, 1080), (3840, 2160)]
            .into_iter()
            .map(|(w, h)| {
                DeviceCaptureMode::new(
                    Resolution::new(w, h),
                    Framerate::from_int(1),
                    Framerate::from_int(60),
                    &spaces,
                    "NV12",
                )
            })
            .collect();
        Self::new("Test Pattern", modes)
    }

    /// Replace the mode table, as a device does after reconfiguration
    pub fn replace_modes(&self, modes: Vec<DeviceCaptureMode>) {
        let mut guard = self.modes.write().unwrap_or_else(|e| e.into_inner());
        *guard = modes;
    }

    /// Simulate another client holding the configuration lock
    pub fn set_locked_elsewhere(&self, locked: bool) {
        self.locked_elsewhere.store(locked, Ordering::SeqCst);
    }
}

impl CaptureDevice for StaticDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture_modes(&self) -> Vec<DeviceCaptureMode> {
        self.modes.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn apply_configuration(&self, config: &DeviceConfiguration) -> BackendResult<()> {
        if self.locked_elsewhere.load(Ordering::SeqCst) {
            return Err(BackendError::Busy);
        }

        let Ok(mut active) = self.active.try_lock() else {
            return Err(BackendError::Busy);
        };

        if !self.capture_modes().contains(&config.mode) {
            return Err(BackendError::FormatNotSupported(format!(
                "{} is not offered by {}",
                config.mode, self.name
            )));
        }

        if !config.mode.supports_color_space(config.color_space) {
            return Err(BackendError::FormatNotSupported(format!(
                "{} not available in {}",
                config.color_space, config.mode
            )));
        }

        if let Some(fps) = config.frame_rate
            && !config.mode.supports_framerate(fps)
        {
            return Err(BackendError::FormatNotSupported(format!(
                "{}fps exceeds {}",
                fps, config.mode
            )));
        }

        debug!(
            device = %self.name,
            mode = %config.mode,
            color_space = %config.color_space,
            fps = ?config.frame_rate,
            "Applied configuration"
        );
        *active = Some(config.clone());
        Ok(())
    }

    fn active_configuration(&self) -> Option<DeviceConfiguration> {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hd_mode() -> DeviceCaptureMode {
        DeviceCaptureMode::new(
            Resolution::new(1280, 720),
            Framerate::from_int(1),
            Framerate::from_int(30),
            &[ColorSpace::Standard],
            "NV12",
        )
    }

    #[test]
    fn test_profile_parsing_applies_defaults() {
        let json = r#"{
            "name": "Rear",
            "modes": [{ "width": 1920, "height": 1080, "max_fps": 60 }]
        }"#;
        let profile: DeviceProfile = serde_json::from_str(json).unwrap();
        let device = StaticDevice::from_profile(&profile);

        let modes = device.capture_modes();
        assert_eq!(modes.len(), 1);
        assert_eq!(modes[0].supported_color_spaces, vec![ColorSpace::Standard]);
        assert_eq!(modes[0].pixel_format, "NV12");
        assert!((modes[0].min_framerate() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_apply_configuration_rejects_unknown_mode() {
        let device = StaticDevice::new("cam", vec![hd_mode()]);
        let mut mode = hd_mode();
        mode.width = 1920;

        let result = device.apply_configuration(&DeviceConfiguration {
            mode,
            color_space: ColorSpace::Standard,
            frame_rate: None,
        });
        assert!(matches!(result, Err(BackendError::FormatNotSupported(_))));
        assert!(device.active_configuration().is_none());
    }

    #[test]
    fn test_locked_device_reports_busy() {
        let device = StaticDevice::new("cam", vec![hd_mode()]);
        device.set_locked_elsewhere(true);

        let result = device.apply_configuration(&DeviceConfiguration {
            mode: hd_mode(),
            color_space: ColorSpace::Standard,
            frame_rate: Some(30),
        });
        assert_eq!(result, Err(BackendError::Busy));
    }

    #[test]
    fn test_apply_configuration_records_active() {
        let device = StaticDevice::new("cam", vec![hd_mode()]);
        let config = DeviceConfiguration {
            mode: hd_mode(),
            color_space: ColorSpace::Standard,
            frame_rate: Some(24),
        };
        device.apply_configuration(&config).unwrap();
        assert_eq!(device.active_configuration(), Some(config));
    }
}
