// SPDX-License-Identifier: GPL-3.0-only

//! Capture mode and color space negotiation
//!
//! Picks the device mode that best matches a requested resolution, frame
//! rate and color space. The resolution is authoritative: it comes from a
//! quality tier that was already clamped to what the preview can show, so no
//! scaling is attempted here.
//!
//! Search order:
//! 1. requested color space at the requested frame rate
//! 2. each color space of the fallback chain at the requested frame rate
//! 3. requested color space without a frame rate constraint
//! 4. standard color space without a frame rate constraint
//!
//! Within a step the largest mode wins, earlier modes win ties.

use super::catalog::list_modes;
use crate::backends::camera::CaptureDevice;
use crate::backends::camera::types::{
    BackendResult, ColorSpace, DeviceCaptureMode, DeviceConfiguration, Resolution,
};
use crate::errors::NegotiationError;
use tracing::{debug, info, warn};

/// A mode chosen by negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedMode {
    pub mode: DeviceCaptureMode,
    /// Color space actually applied, may differ from the requested one
    pub color_space: ColorSpace,
    /// False when the mode was accepted below the requested frame rate
    pub frame_rate_satisfied: bool,
}

/// Select the best mode the device currently offers
pub fn select_mode(
    device: &dyn CaptureDevice,
    resolution: Resolution,
    fps: u32,
    color_space: ColorSpace,
) -> Result<NegotiatedMode, NegotiationError> {
    let modes = list_modes(device);
    select_from_modes(&modes, resolution, fps, color_space)
}

/// Select the best mode from an explicit mode list
pub fn select_from_modes(
    modes: &[DeviceCaptureMode],
    resolution: Resolution,
    fps: u32,
    color_space: ColorSpace,
) -> Result<NegotiatedMode, NegotiationError> {
    let sized: Vec<&DeviceCaptureMode> = modes
        .iter()
        .filter(|m| m.resolution() == resolution)
        .collect();

    debug!(
        %resolution,
        fps,
        %color_space,
        candidates = sized.len(),
        "Negotiating capture mode"
    );

    let with_fps = std::iter::once(color_space).chain(color_space.fallback_chain().iter().copied());
    for candidate_space in with_fps {
        if let Some(mode) = best(&sized, candidate_space, Some(fps)) {
            if candidate_space != color_space {
                info!(
                    requested = %color_space,
                    applied = %candidate_space,
                    "Color space fell back"
                );
            }
            return Ok(NegotiatedMode {
                mode: mode.clone(),
                color_space: candidate_space,
                frame_rate_satisfied: true,
            });
        }
    }

    for candidate_space in [color_space, ColorSpace::Standard] {
        if let Some(mode) = best(&sized, candidate_space, None) {
            warn!(
                requested_fps = fps,
                max_fps = mode.max_framerate(),
                requested = %color_space,
                applied = %candidate_space,
                "Accepting mode below requested frame rate"
            );
            return Ok(NegotiatedMode {
                mode: mode.clone(),
                color_space: candidate_space,
                frame_rate_satisfied: false,
            });
        }
    }

    warn!(%resolution, fps, %color_space, "No compatible capture mode");
    Err(NegotiationError::NoCompatibleCaptureMode {
        resolution,
        fps,
        color_space,
    })
}

/// Largest mode supporting the color space (and frame rate when given)
fn best<'a>(
    modes: &[&'a DeviceCaptureMode],
    color_space: ColorSpace,
    fps: Option<u32>,
) -> Option<&'a DeviceCaptureMode> {
    modes
        .iter()
        .copied()
        .filter(|m| m.supports_color_space(color_space))
        .filter(|m| fps.is_none_or(|fps| m.supports_framerate(fps)))
        .fold(None, |best: Option<&DeviceCaptureMode>, m| match best {
            Some(b) if b.pixel_count() >= m.pixel_count() => Some(b),
            _ => Some(m),
        })
}

/// Negotiate and return only the mode
///
/// Usable for diagnostics and preview configuration outside of recording.
pub fn negotiate(
    device: &dyn CaptureDevice,
    resolution: Resolution,
    fps: u32,
    color_space: ColorSpace,
) -> Result<DeviceCaptureMode, NegotiationError> {
    select_mode(device, resolution, fps, color_space).map(|n| n.mode)
}

/// Apply a negotiated mode to the device
///
/// A frame rate override above what the mode can deliver is clamped to the
/// mode's maximum.
pub fn configure_device(
    device: &dyn CaptureDevice,
    negotiated: &NegotiatedMode,
    frame_rate: Option<u32>,
) -> BackendResult<()> {
    let frame_rate = frame_rate.map(|fps| {
        if negotiated.mode.supports_framerate(fps) {
            fps
        } else {
            let clamped = negotiated.mode.max_framerate().round().max(1.0) as u32;
            warn!(requested = fps, clamped, "Frame rate override exceeds mode, clamping");
            clamped
        }
    });

    device.apply_configuration(&DeviceConfiguration {
        mode: negotiated.mode.clone(),
        color_space: negotiated.color_space,
        frame_rate,
    })
}
