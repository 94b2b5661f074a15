// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer device monitor backend
//!
//! Discovers video sources through `gst::DeviceMonitor` and reads their
//! operating modes from the caps the device currently advertises.

use super::CaptureDevice;
use super::types::{
    BackendError, BackendResult, ColorSpace, DeviceCaptureMode, DeviceConfiguration, Framerate,
    Resolution,
};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// A video source discovered by the GStreamer device monitor
pub struct GstCaptureDevice {
    device: gst::Device,
    name: String,
    active: Mutex<Option<DeviceConfiguration>>,
}

impl std::fmt::Debug for GstCaptureDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GstCaptureDevice")
            .field("name", &self.name)
            .finish()
    }
}

impl GstCaptureDevice {
    /// Enumerate video sources
    ///
    /// # Returns
    /// * `Ok(Vec<GstCaptureDevice>)` - Devices found (may be empty)
    /// * `Err(BackendError)` - GStreamer or the monitor is unavailable
    pub fn enumerate() -> BackendResult<Vec<GstCaptureDevice>> {
        gst::init()
            .map_err(|e| BackendError::NotAvailable(format!("GStreamer init failed: {}", e)))?;

        let monitor = gst::DeviceMonitor::new();
        monitor.add_filter(Some("Video/Source"), None);
        monitor
            .start()
            .map_err(|e| BackendError::NotAvailable(format!("Device monitor failed: {}", e)))?;

        let devices: Vec<GstCaptureDevice> = monitor
            .devices()
            .into_iter()
            .map(|device| {
                let name = device.display_name().to_string();
                debug!(name = %name, class = %device.device_class(), "Found video source");
                GstCaptureDevice {
                    device,
                    name,
                    active: Mutex::new(None),
                }
            })
            .collect();

        monitor.stop();
        info!(count = devices.len(), "Enumerated video sources");
        Ok(devices)
    }
}

impl CaptureDevice for GstCaptureDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture_modes(&self) -> Vec<DeviceCaptureMode> {
        match self.device.caps() {
            Some(caps) => modes_from_caps(&caps),
            None => {
                warn!(device = %self.name, "Device reports no caps");
                Vec::new()
            }
        }
    }

    fn apply_configuration(&self, config: &DeviceConfiguration) -> BackendResult<()> {
        let Ok(mut active) = self.active.try_lock() else {
            return Err(BackendError::Busy);
        };

        let offered = self
            .capture_modes()
            .iter()
            .any(|m| {
                m.resolution() == config.mode.resolution()
                    && m.supports_color_space(config.color_space)
            });
        if !offered {
            return Err(BackendError::FormatNotSupported(format!(
                "{} ({}) is not offered by {}",
                config.mode.resolution(),
                config.color_space,
                self.name
            )));
        }

        info!(
            device = %self.name,
            mode = %config.mode,
            color_space = %config.color_space,
            fps = ?config.frame_rate,
            "Configured device"
        );
        *active = Some(config.clone());
        Ok(())
    }

    fn active_configuration(&self) -> Option<DeviceConfiguration> {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Parse caps structures into capture modes
///
/// Structures with width/height ranges are skipped; only fixed sizes become
/// modes.
fn modes_from_caps(caps: &gst::CapsRef) -> Vec<DeviceCaptureMode> {
    let mut modes = Vec::new();

    for structure in caps.iter() {
        let (Ok(width), Ok(height)) = (
            structure.get::<i32>("width"),
            structure.get::<i32>("height"),
        ) else {
            continue;
        };
        if width <= 0 || height <= 0 {
            continue;
        }

        let pixel_format = match structure.name().as_str() {
            "video/x-raw" => structure
                .get::<&str>("format")
                .map(|f| f.to_string())
                .unwrap_or_else(|_| "RAW".to_string()),
            "image/jpeg" => "MJPG".to_string(),
            "video/x-h264" => "H264".to_string(),
            other => {
                debug!(media_type = other, "Skipping unsupported media type");
                continue;
            }
        };

        let rates = framerates(structure);
        let (Some(min), Some(max)) = (
            rates.iter().min_by(|a, b| a.as_f64().total_cmp(&b.as_f64())),
            rates.iter().max_by(|a, b| a.as_f64().total_cmp(&b.as_f64())),
        ) else {
            continue;
        };

        modes.push(DeviceCaptureMode::new(
            Resolution::new(width as u32, height as u32),
            *min,
            *max,
            &color_spaces(structure),
            &pixel_format,
        ));
    }

    modes
}

fn to_framerate(fraction: gst::Fraction) -> Option<Framerate> {
    let (num, denom) = (fraction.numer(), fraction.denom());
    if num <= 0 || denom <= 0 {
        return None;
    }
    Some(Framerate::new(num as u32, denom as u32))
}

/// Framerates from a fixed value, a list, or a range (its bounds)
fn framerates(structure: &gst::StructureRef) -> Vec<Framerate> {
    if let Ok(fraction) = structure.get::<gst::Fraction>("framerate") {
        return to_framerate(fraction).into_iter().collect();
    }

    if let Ok(list) = structure.get::<gst::List>("framerate") {
        return list
            .iter()
            .filter_map(|v| v.get::<gst::Fraction>().ok())
            .filter_map(to_framerate)
            .collect();
    }

    if let Ok(range) = structure.get::<gst::FractionRange>("framerate") {
        return [range.min(), range.max()]
            .into_iter()
            .filter_map(to_framerate)
            .collect();
    }

    Vec::new()
}

/// Color spaces from the colorimetry field; untagged caps count as standard
fn color_spaces(structure: &gst::StructureRef) -> Vec<ColorSpace> {
    let mut spaces = Vec::new();

    if let Ok(colorimetry) = structure.get::<&str>("colorimetry") {
        spaces.extend(ColorSpace::from_colorimetry(colorimetry));
    } else if let Ok(list) = structure.get::<gst::List>("colorimetry") {
        spaces.extend(
            list.iter()
                .filter_map(|v| v.get::<&str>().ok())
                .filter_map(ColorSpace::from_colorimetry),
        );
    }

    if spaces.is_empty() {
        spaces.push(ColorSpace::Standard);
    }
    spaces
}
