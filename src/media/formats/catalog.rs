// SPDX-License-Identifier: GPL-3.0-only

//! Capability catalog
//!
//! Read-only view of what a capture device can do. Every query goes back to
//! the device, so answers reflect the device's current state rather than a
//! list captured at startup.

use crate::backends::camera::CaptureDevice;
use crate::backends::camera::types::{ColorSpace, DeviceCaptureMode};
use tracing::info;

/// All modes the device currently offers, in device order
pub fn list_modes(device: &dyn CaptureDevice) -> Vec<DeviceCaptureMode> {
    device.capture_modes()
}

/// Whether any current mode offers the color space
pub fn supports_color_space(device: &dyn CaptureDevice, color_space: ColorSpace) -> bool {
    device
        .capture_modes()
        .iter()
        .any(|mode| mode.supports_color_space(color_space))
}

/// Union of color spaces across all current modes, in first-seen order
pub fn supported_color_spaces(device: &dyn CaptureDevice) -> Vec<ColorSpace> {
    let mut spaces = Vec::new();
    for mode in device.capture_modes() {
        for cs in mode.supported_color_spaces {
            if !spaces.contains(&cs) {
                spaces.push(cs);
            }
        }
    }
    spaces
}

/// Log every mode of the device at info level
pub fn log_available_modes(device: &dyn CaptureDevice) {
    let modes = device.capture_modes();
    info!(device = %device.name(), count = modes.len(), "Available capture modes");
    for (index, mode) in modes.iter().enumerate() {
        info!(
            index,
            width = mode.width,
            height = mode.height,
            min_fps = mode.min_framerate(),
            max_fps = mode.max_framerate(),
            pixel_format = %mode.pixel_format,
            color_spaces = ?mode.supported_color_spaces,
            "Capture mode"
        );
    }
}
