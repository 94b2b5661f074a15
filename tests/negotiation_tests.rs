// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for capture mode negotiation and settings resolution

use camera_recorder::backends::camera::types::{Framerate, Resolution};
use camera_recorder::backends::camera::{CaptureDevice, StaticDevice};
use camera_recorder::media::formats::catalog;
use camera_recorder::media::formats::negotiation::{negotiate, select_mode};
use camera_recorder::pipelines::video::{RecordingOptions, Substitution, resolve};
use camera_recorder::{
    ColorSpace, ContainerType, DeviceCaptureMode, NegotiationError, QualityTier, RecordingCodec,
    RecordingError,
};

const FHD: Resolution = Resolution::new(1920, 1080);

fn mode(width: u32, height: u32, max_fps: u32, spaces: &[ColorSpace]) -> DeviceCaptureMode {
    DeviceCaptureMode::new(
        Resolution::new(width, height),
        Framerate::from_int(1),
        Framerate::from_int(max_fps),
        spaces,
        "NV12",
    )
}

fn standard_and_wide_device() -> StaticDevice {
    StaticDevice::new(
        "Front camera",
        vec![
            mode(1280, 720, 60, &[ColorSpace::Standard, ColorSpace::WideGamut]),
            mode(1920, 1080, 30, &[ColorSpace::Standard, ColorSpace::WideGamut]),
        ],
    )
}

#[test]
fn test_log_falls_back_to_wide_gamut() {
    let device = standard_and_wide_device();
    let negotiated = select_mode(&device, FHD, 30, ColorSpace::ProfessionalLog).unwrap();

    assert_eq!(negotiated.color_space, ColorSpace::WideGamut);
    assert_eq!(negotiated.mode.resolution(), FHD);
    assert!(negotiated.frame_rate_satisfied);
}

#[test]
fn test_hdr_falls_back_to_standard() {
    let device = StaticDevice::new("Webcam", vec![mode(1920, 1080, 30, &[ColorSpace::Standard])]);
    let negotiated = select_mode(&device, FHD, 30, ColorSpace::HighDynamicRange).unwrap();

    assert_eq!(negotiated.color_space, ColorSpace::Standard);
}

#[test]
fn test_negotiation_is_idempotent() {
    let device = standard_and_wide_device();
    let first = negotiate(&device, FHD, 30, ColorSpace::WideGamut).unwrap();
    let second = negotiate(&device, FHD, 30, ColorSpace::WideGamut).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_frame_rate_relaxed_when_no_mode_is_fast_enough() {
    let device = standard_and_wide_device();
    let negotiated = select_mode(&device, FHD, 60, ColorSpace::Standard).unwrap();

    assert_eq!(negotiated.mode.resolution(), FHD);
    assert!(!negotiated.frame_rate_satisfied);
}

#[test]
fn test_ntsc_rate_satisfies_integer_request() {
    let ntsc = DeviceCaptureMode::new(
        FHD,
        Framerate::from_int(1),
        Framerate::new(30000, 1001),
        &[ColorSpace::Standard],
        "NV12",
    );
    let device = StaticDevice::new("Capture card", vec![ntsc]);

    assert!(select_mode(&device, FHD, 30, ColorSpace::Standard)
        .unwrap()
        .frame_rate_satisfied);
}

#[test]
fn test_no_mode_at_resolution() {
    let device = standard_and_wide_device();
    let result = negotiate(&device, Resolution::new(3840, 2160), 30, ColorSpace::Standard);

    assert_eq!(
        result,
        Err(NegotiationError::NoCompatibleCaptureMode {
            resolution: Resolution::new(3840, 2160),
            fps: 30,
            color_space: ColorSpace::Standard,
        })
    );
}

#[test]
fn test_catalog_reflects_device_changes() {
    let device = standard_and_wide_device();
    assert_eq!(catalog::list_modes(&device).len(), 2);
    assert!(!catalog::supports_color_space(&device, ColorSpace::HighDynamicRange));

    device.replace_modes(vec![mode(1920, 1080, 30, &[ColorSpace::HighDynamicRange])]);
    assert_eq!(catalog::list_modes(&device).len(), 1);
    assert!(catalog::supports_color_space(&device, ColorSpace::HighDynamicRange));

    device.replace_modes(Vec::new());
    assert!(catalog::list_modes(&device).is_empty());
}

#[test]
fn test_log_recording_on_wide_gamut_device() {
    let device = standard_and_wide_device();
    let options = RecordingOptions {
        color_space: Some(ColorSpace::ProfessionalLog),
        target_frame_rate: Some(30),
        ..Default::default()
    };

    let settings = resolve(&options, QualityTier::Fhd, FHD, &device).unwrap();

    assert_eq!(settings.resolution, FHD);
    assert_eq!(settings.color_space, ColorSpace::WideGamut);
    assert!(settings.codec.is_professional());
    assert_eq!(settings.codec, RecordingCodec::ProRes422Hq);
    assert_eq!(settings.container, ContainerType::QuickTimeMovie);
    assert_eq!(settings.frame_rate, 30);
    assert!(settings.substitutions.contains(&Substitution::ColorSpaceDowngraded {
        requested: ColorSpace::ProfessionalLog,
        applied: ColorSpace::WideGamut,
    }));

    // The negotiated mode can be applied to the device
    assert!(device
        .apply_configuration(&camera_recorder::backends::camera::DeviceConfiguration {
            mode: settings.mode.clone(),
            color_space: settings.color_space,
            frame_rate: settings.frame_rate_override,
        })
        .is_ok());
}

#[test]
fn test_quality_tier_clamped_to_portrait_preview() {
    let device = StaticDevice::new(
        "Phone",
        vec![mode(720, 1280, 30, &[ColorSpace::Standard])],
    );
    let settings = resolve(
        &RecordingOptions::default(),
        QualityTier::Hd,
        Resolution::new(1080, 1920),
        &device,
    )
    .unwrap();

    assert_eq!(settings.resolution, Resolution::new(720, 1280));
}

#[test]
fn test_resolve_without_matching_mode() {
    let device = standard_and_wide_device();
    let result = resolve(
        &RecordingOptions::default(),
        QualityTier::Uhd,
        Resolution::new(3840, 2160),
        &device,
    );

    assert!(matches!(result, Err(RecordingError::NoCompatibleCaptureMode(_))));
}

#[test]
fn test_selection_follows_catalog_after_mode_change() {
    let device = standard_and_wide_device();
    let before = select_mode(&device, FHD, 30, ColorSpace::WideGamut).unwrap();
    assert_eq!(before.color_space, ColorSpace::WideGamut);

    // The device drops wide gamut, e.g. after a format change elsewhere
    device.replace_modes(vec![mode(1920, 1080, 30, &[ColorSpace::Standard])]);
    assert_eq!(catalog::list_modes(&device).len(), 1);

    let after = select_mode(&device, FHD, 30, ColorSpace::WideGamut).unwrap();
    assert_eq!(after.color_space, ColorSpace::Standard);
    assert_eq!(after.mode, catalog::list_modes(&device)[0]);
}
