// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use camera_recorder::media::encoders::AudioQuality;
use camera_recorder::{
    BitratePreset, ColorSpace, ContainerType, QualityTier, RecorderConfig, RecordingCodec,
};

#[test]
fn test_config_default() {
    let config = RecorderConfig::default();

    assert!(config.enable_audio, "Audio should be enabled by default");
    assert_eq!(config.quality, QualityTier::Fhd);
    assert_eq!(config.codec, RecordingCodec::H264);
    assert_eq!(config.container, ContainerType::Mpeg4);
    assert_eq!(config.color_space, None);
    assert!(config.writer_max_queued_bytes > 0);
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = RecorderConfig {
        quality: QualityTier::Uhd,
        codec: RecordingCodec::Hevc,
        container: ContainerType::QuickTimeMovie,
        color_space: Some(ColorSpace::HighDynamicRange),
        bitrate_preset: BitratePreset::High,
        enable_audio: false,
        audio_quality: AudioQuality::Low,
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(RecorderConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_config_missing_fields_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "quality": "hd", "color_space": "wide-gamut" }"#).unwrap();

    let config = RecorderConfig::load_from(&path).unwrap();
    assert_eq!(config.quality, QualityTier::Hd);
    assert_eq!(config.color_space, Some(ColorSpace::WideGamut));
    assert_eq!(config.codec, RecordingCodec::default());
    assert!(config.enable_audio);
}

#[test]
fn test_config_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(RecorderConfig::load_from(&path).is_err());
    assert!(RecorderConfig::load_from(&dir.path().join("absent.json")).is_err());
}

#[test]
fn test_config_seeds_recording_options() {
    let config = RecorderConfig {
        codec: RecordingCodec::ProRes422,
        container: ContainerType::QuickTimeMovie,
        enable_audio: false,
        ..Default::default()
    };

    let options = config.recording_options();
    assert_eq!(options.codec, RecordingCodec::ProRes422);
    assert_eq!(options.container, ContainerType::QuickTimeMovie);
    assert!(!options.enable_audio);
    assert_eq!(options.target_frame_rate, None);
}
