// SPDX-License-Identifier: GPL-3.0-only

//! Media samples pushed into the recording engine

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which track a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    pub const ALL: [StreamKind; 2] = [StreamKind::Video, StreamKind::Audio];

    pub fn index(&self) -> usize {
        match self {
            StreamKind::Video => 0,
            StreamKind::Audio => 1,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
        }
    }
}

/// One video frame or audio buffer
///
/// Video payloads are raw frames in the negotiated mode's pixel layout; audio
/// payloads are interleaved S16LE PCM. The timestamp is in the capture
/// device's clock domain.
#[derive(Debug, Clone)]
pub struct Sample {
    pub payload: Arc<[u8]>,
    /// Presentation timestamp
    pub pts: Duration,
    pub duration: Option<Duration>,
}

impl Sample {
    pub fn new(payload: impl Into<Arc<[u8]>>, pts: Duration) -> Self {
        Self {
            payload: payload.into(),
            pts,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}
