// SPDX-License-Identifier: MPL-2.0

//! Error types for the recording core

use crate::backends::camera::types::{ColorSpace, Resolution};
use std::fmt;

/// Result type alias using RecordingError
pub type RecordingResult<T> = Result<T, RecordingError>;

/// Recording-specific errors
///
/// Every variant is terminal for the current session; a fresh `start` is
/// needed after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// Output path cannot be written (missing parent, is a directory, no permission)
    PathUnwritable(String),
    /// Settings passed validation but the underlying writer rejected them
    WriterConfigurationFailed(String),
    /// Exclusive device configuration could not be acquired
    DeviceLockFailed(String),
    /// The negotiator exhausted every fallback
    NoCompatibleCaptureMode(NegotiationError),
    /// Stop or pause called with no active session
    NotRecording,
    /// A session is already active
    AlreadyRecording,
    /// The writer could not close cleanly; the file must be treated as invalid
    FinalizeFailed(String),
}

/// Capture mode negotiation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// No mode matches the resolution, even after every fallback
    NoCompatibleCaptureMode {
        resolution: Resolution,
        fps: u32,
        color_space: ColorSpace,
    },
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::PathUnwritable(msg) => {
                write!(f, "Output path is not writable: {}", msg)
            }
            RecordingError::WriterConfigurationFailed(msg) => {
                write!(f, "Writer configuration failed: {}", msg)
            }
            RecordingError::DeviceLockFailed(msg) => {
                write!(f, "Could not lock device for configuration: {}", msg)
            }
            RecordingError::NoCompatibleCaptureMode(err) => write!(f, "{}", err),
            RecordingError::NotRecording => write!(f, "No recording in progress"),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::FinalizeFailed(msg) => {
                write!(f, "Failed to finalize recording: {}", msg)
            }
        }
    }
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationError::NoCompatibleCaptureMode {
                resolution,
                fps,
                color_space,
            } => write!(
                f,
                "No compatible capture mode for {} @ {}fps ({})",
                resolution, fps, color_space
            ),
        }
    }
}

impl std::error::Error for RecordingError {}
impl std::error::Error for NegotiationError {}

impl From<NegotiationError> for RecordingError {
    fn from(err: NegotiationError) -> Self {
        RecordingError::NoCompatibleCaptureMode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_error_converts() {
        let err = NegotiationError::NoCompatibleCaptureMode {
            resolution: Resolution::new(1920, 1080),
            fps: 30,
            color_space: ColorSpace::Standard,
        };
        let recording: RecordingError = err.clone().into();
        assert_eq!(recording, RecordingError::NoCompatibleCaptureMode(err));
        assert!(recording.to_string().contains("1920x1080"));
    }
}
