// SPDX-License-Identifier: GPL-3.0-only

//! Persistent recorder configuration
//!
//! Stored as JSON at `$XDG_CONFIG_HOME/camera-recorder/config.json`. A missing
//! file yields the defaults; missing fields take their default values.

use crate::backends::camera::types::ColorSpace;
use crate::constants::{BitratePreset, QualityTier, writer};
use crate::media::encoders::audio::AudioQuality;
use crate::media::formats::codec::{ContainerType, RecordingCodec};
use crate::pipelines::video::RecordingOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "camera-recorder";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Default quality tier for recordings
    pub quality: QualityTier,
    pub codec: RecordingCodec,
    pub container: ContainerType,
    /// Requested color space; `None` records standard
    pub color_space: Option<ColorSpace>,
    /// Video encoder bitrate preset (Low, Medium, High)
    pub bitrate_preset: BitratePreset,
    /// Record an audio track next to video
    pub enable_audio: bool,
    pub audio_quality: AudioQuality,
    /// Bytes each writer input may queue before samples are dropped
    pub writer_max_queued_bytes: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            quality: QualityTier::default(),
            codec: RecordingCodec::default(),
            container: ContainerType::default(),
            color_space: None,
            bitrate_preset: BitratePreset::default(),
            enable_audio: true,
            audio_quality: AudioQuality::default(),
            writer_max_queued_bytes: writer::MAX_QUEUED_BYTES,
        }
    }
}

impl RecorderConfig {
    /// Default location of the configuration file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("No config directory, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                info!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Load from a specific file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&data).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Write to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, data).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    /// Recording options seeded from this configuration
    pub fn recording_options(&self) -> RecordingOptions {
        RecordingOptions {
            codec: self.codec,
            container: self.container,
            color_space: self.color_space,
            target_frame_rate: None,
            enable_audio: self.enable_audio,
            bitrate: self.bitrate_preset,
        }
    }
}
