// SPDX-License-Identifier: GPL-3.0-only

//! Recording settings resolution
//!
//! Turns the user-facing [`RecordingOptions`] into the concrete
//! [`WriterSettings`] the writer is opened with. Incompatible requests are
//! corrected rather than rejected; every correction is logged and recorded
//! as a [`Substitution`].

use crate::backends::camera::CaptureDevice;
use crate::backends::camera::types::{ColorSpace, DeviceCaptureMode, Resolution};
use crate::constants::{BitratePreset, DEFAULT_FRAME_RATE, QualityTier};
use crate::errors::RecordingError;
use crate::media::formats::codec::{ContainerType, RecordingCodec};
use crate::media::formats::negotiation::{NegotiatedMode, select_mode};
use tracing::{info, warn};

/// User-facing recording options
///
/// The engine keeps its own copy once recording starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingOptions {
    pub codec: RecordingCodec,
    pub container: ContainerType,
    /// `None` records standard color
    pub color_space: Option<ColorSpace>,
    /// Fixed capture frame rate; `None` keeps the device default
    pub target_frame_rate: Option<u32>,
    pub enable_audio: bool,
    pub bitrate: BitratePreset,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            codec: RecordingCodec::default(),
            container: ContainerType::default(),
            color_space: None,
            target_frame_rate: None,
            enable_audio: true,
            bitrate: BitratePreset::default(),
        }
    }
}

/// A correction applied while resolving settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// The codec/container pair is not in the table; fell back to H.264 in MP4
    UnsupportedCombination {
        codec: RecordingCodec,
        container: ContainerType,
    },
    /// The requested color space needs a different codec family
    CodecForColorSpace {
        color_space: ColorSpace,
        from: RecordingCodec,
        to: RecordingCodec,
    },
    /// The substituted codec needs a different container
    ContainerForCodec {
        codec: RecordingCodec,
        from: ContainerType,
        to: ContainerType,
    },
    /// The device could not deliver the requested color space
    ColorSpaceDowngraded {
        requested: ColorSpace,
        applied: ColorSpace,
    },
}

/// Concrete parameters the writer is opened with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSettings {
    pub codec: RecordingCodec,
    pub container: ContainerType,
    pub resolution: Resolution,
    /// Color space actually applied to the device
    pub color_space: ColorSpace,
    /// Frame rate written into the video caps
    pub frame_rate: u32,
    /// Frame rate forced on the device, if the caller asked for one
    pub frame_rate_override: Option<u32>,
    /// Negotiated device mode
    pub mode: DeviceCaptureMode,
    pub bitrate_kbps: u32,
    pub enable_audio: bool,
    pub substitutions: Vec<Substitution>,
}

impl WriterSettings {
    /// Negotiation result these settings were built from
    pub fn negotiated(&self) -> NegotiatedMode {
        NegotiatedMode {
            mode: self.mode.clone(),
            color_space: self.color_space,
            frame_rate_satisfied: self.mode.supports_framerate(self.frame_rate),
        }
    }
}

/// Resolve options into writer settings
///
/// # Arguments
/// * `options` - Requested codec, container, color space and frame rate
/// * `quality` - Quality tier, clamped to `preview`
/// * `preview` - Size the live preview currently delivers
/// * `device` - Device to negotiate a capture mode with
///
/// # Returns
/// * `Ok(WriterSettings)` - Settings with any substitutions applied
/// * `Err(RecordingError::NoCompatibleCaptureMode)` - No mode at the resolved size
pub fn resolve(
    options: &RecordingOptions,
    quality: QualityTier,
    preview: Resolution,
    device: &dyn CaptureDevice,
) -> Result<WriterSettings, RecordingError> {
    let mut substitutions = Vec::new();
    let mut codec = options.codec;
    let mut container = options.container;

    if !container.accepts(codec) {
        warn!(%codec, %container, "Unsupported codec/container combination, using h264 in mp4");
        substitutions.push(Substitution::UnsupportedCombination { codec, container });
        codec = RecordingCodec::H264;
        container = ContainerType::Mpeg4;
    }

    let resolution = quality.clamp_to_preview(preview);
    let requested_space = options.color_space.unwrap_or_default();

    // Keyed to the requested color space, even if negotiation later downgrades it
    let required = match requested_space {
        ColorSpace::ProfessionalLog if !codec.is_professional() => {
            Some(RecordingCodec::ProRes422Hq)
        }
        ColorSpace::HighDynamicRange if !codec.is_hevc() => Some(RecordingCodec::Hevc),
        _ => None,
    };
    if let Some(to) = required {
        info!(
            color_space = %requested_space,
            from = %codec,
            to = %to,
            "Substituting codec for color space"
        );
        substitutions.push(Substitution::CodecForColorSpace {
            color_space: requested_space,
            from: codec,
            to,
        });
        codec = to;
    }

    if !container.accepts(codec) {
        info!(%codec, from = %container, "Switching container to mov");
        substitutions.push(Substitution::ContainerForCodec {
            codec,
            from: container,
            to: ContainerType::QuickTimeMovie,
        });
        container = ContainerType::QuickTimeMovie;
    }

    let frame_rate_override = match options.target_frame_rate {
        Some(0) => {
            warn!("Ignoring zero target frame rate");
            None
        }
        other => other,
    };
    let desired_fps = frame_rate_override.unwrap_or(DEFAULT_FRAME_RATE);

    let negotiated = select_mode(device, resolution, desired_fps, requested_space)?;

    if negotiated.color_space != requested_space {
        substitutions.push(Substitution::ColorSpaceDowngraded {
            requested: requested_space,
            applied: negotiated.color_space,
        });
    }

    let frame_rate = if negotiated.frame_rate_satisfied {
        desired_fps
    } else {
        negotiated.mode.max_framerate().round().max(1.0) as u32
    };

    let settings = WriterSettings {
        codec,
        container,
        resolution,
        color_space: negotiated.color_space,
        frame_rate,
        frame_rate_override,
        bitrate_kbps: options.bitrate.bitrate_kbps(resolution),
        mode: negotiated.mode,
        enable_audio: options.enable_audio,
        substitutions,
    };

    info!(
        codec = %settings.codec,
        container = %settings.container,
        resolution = %settings.resolution,
        color_space = %settings.color_space,
        fps = settings.frame_rate,
        bitrate_kbps = settings.bitrate_kbps,
        substitutions = settings.substitutions.len(),
        "Resolved recording settings"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::StaticDevice;
    use crate::backends::camera::types::Framerate;

    fn device(spaces: &[ColorSpace]) -> StaticDevice {
        StaticDevice::new(
            "cam",
            vec![
                DeviceCaptureMode::new(
                    Resolution::new(1280, 720),
                    Framerate::from_int(1),
                    Framerate::from_int(60),
                    spaces,
                    "NV12",
                ),
                DeviceCaptureMode::new(
                    Resolution::new(1920, 1080),
                    Framerate::from_int(1),
                    Framerate::from_int(30),
                    spaces,
                    "NV12",
                ),
            ],
        )
    }

    const PREVIEW: Resolution = Resolution::new(1920, 1080);

    #[test]
    fn test_default_options_resolve() {
        let settings = resolve(
            &RecordingOptions::default(),
            QualityTier::Fhd,
            PREVIEW,
            &device(&[ColorSpace::Standard]),
        )
        .unwrap();

        assert_eq!(settings.codec, RecordingCodec::H264);
        assert_eq!(settings.container, ContainerType::Mpeg4);
        assert_eq!(settings.resolution, PREVIEW);
        assert_eq!(settings.frame_rate, DEFAULT_FRAME_RATE);
        assert!(settings.substitutions.is_empty());
    }

    #[test]
    fn test_illegal_combination_falls_back() {
        let options = RecordingOptions {
            codec: RecordingCodec::ProRes422,
            container: ContainerType::Type3gpp,
            ..Default::default()
        };
        let settings = resolve(&options, QualityTier::Hd, PREVIEW, &device(&[ColorSpace::Standard]))
            .unwrap();

        assert_eq!(settings.codec, RecordingCodec::H264);
        assert_eq!(settings.container, ContainerType::Mpeg4);
        assert_eq!(settings.resolution, Resolution::new(1280, 720));
    }

    #[test]
    fn test_hdr_requires_hevc() {
        let options = RecordingOptions {
            color_space: Some(ColorSpace::HighDynamicRange),
            ..Default::default()
        };
        let settings = resolve(
            &options,
            QualityTier::Fhd,
            PREVIEW,
            &device(&[ColorSpace::Standard, ColorSpace::HighDynamicRange]),
        )
        .unwrap();

        assert_eq!(settings.codec, RecordingCodec::Hevc);
        assert_eq!(settings.container, ContainerType::Mpeg4);
        assert_eq!(settings.color_space, ColorSpace::HighDynamicRange);
    }

    #[test]
    fn test_zero_frame_rate_ignored() {
        let options = RecordingOptions {
            target_frame_rate: Some(0),
            ..Default::default()
        };
        let standard = device(&[ColorSpace::Standard]);
        let settings = resolve(&options, QualityTier::Fhd, PREVIEW, &standard).unwrap();
        assert_eq!(settings.frame_rate_override, None);
    }

    #[test]
    fn test_frame_rate_capped_by_mode() {
        let options = RecordingOptions {
            target_frame_rate: Some(60),
            ..Default::default()
        };
        let standard = device(&[ColorSpace::Standard]);
        let settings = resolve(&options, QualityTier::Fhd, PREVIEW, &standard).unwrap();
        assert_eq!(settings.frame_rate, 30);
        assert_eq!(settings.frame_rate_override, Some(60));
    }

    #[test]
    fn test_missing_resolution_is_an_error() {
        let result = resolve(
            &RecordingOptions::default(),
            QualityTier::Sd,
            PREVIEW,
            &device(&[ColorSpace::Standard]),
        );
        assert!(matches!(result, Err(RecordingError::NoCompatibleCaptureMode(_))));
    }
}
