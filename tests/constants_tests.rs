// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use camera_recorder::Resolution;
use camera_recorder::constants::{BitratePreset, QualityTier};

#[test]
fn test_bitrate_preset_values() {
    // Test that all presets exist (Low, Medium, High)
    assert_eq!(BitratePreset::ALL.len(), 3);
}

#[test]
fn test_bitrate_preset_ordering() {
    // Test that presets are ordered from lowest to highest quality
    let mut prev_bitrate = 0u32;
    for preset in BitratePreset::ALL {
        let bitrate = preset.bitrate_kbps(Resolution::new(1920, 1080));
        assert!(
            bitrate >= prev_bitrate,
            "Presets should be ordered from lowest to highest"
        );
        prev_bitrate = bitrate;
    }
}

#[test]
fn test_bitrate_scales_with_resolution() {
    // Higher resolution should have higher bitrate at same preset
    let hd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(1280, 720));
    let fhd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(1920, 1080));
    let uhd_bitrate = BitratePreset::Medium.bitrate_kbps(Resolution::new(3840, 2160));

    assert!(hd_bitrate < fhd_bitrate);
    assert!(fhd_bitrate < uhd_bitrate);
}

#[test]
fn test_bitrate_same_for_portrait() {
    for preset in BitratePreset::ALL {
        assert_eq!(
            preset.bitrate_kbps(Resolution::new(1080, 1920)),
            preset.bitrate_kbps(Resolution::new(1920, 1080))
        );
    }
}

#[test]
fn test_bitrate_preset_display_names() {
    // Test that all presets have non-empty display names
    for preset in BitratePreset::ALL {
        let name = preset.display_name();
        assert!(
            !name.is_empty(),
            "Preset {:?} has empty display name",
            preset
        );
    }
}

#[test]
fn test_quality_tiers_never_exceed_preview() {
    let preview = Resolution::new(1280, 720);
    for tier in QualityTier::ALL {
        let size = tier.clamp_to_preview(preview);
        assert!(
            size.fits_within(preview),
            "{:?} produced {} for a {} preview",
            tier,
            size,
            preview
        );
    }
}

#[test]
fn test_highest_tier_uses_preview() {
    let preview = Resolution::new(2592, 1944);
    assert_eq!(QualityTier::Highest.clamp_to_preview(preview), preview);
}

#[test]
fn test_quality_tier_parsing() {
    assert_eq!("1080p".parse::<QualityTier>(), Ok(QualityTier::Fhd));
    assert_eq!("4K".parse::<QualityTier>(), Ok(QualityTier::Uhd));
    assert!("8k".parse::<QualityTier>().is_err());
}

#[test]
fn test_quality_tier_display_names_parse_back() {
    assert_eq!(QualityTier::Fhd.display_name(), "1080p");
    for tier in QualityTier::ALL {
        let name = tier.display_name();
        assert_eq!(name.parse::<QualityTier>(), Ok(tier), "{} parsed wrong", name);
    }
}
