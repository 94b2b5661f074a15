// SPDX-License-Identifier: GPL-3.0-only

//! Per-stream timestamp correction
//!
//! When one stream stalls while the other keeps going, the stalled stream's
//! next timestamps jump ahead. Each stream keeps an accumulated offset that is
//! subtracted from every raw timestamp, so the stall does not show up as a
//! frozen frame or silence in the output.
//!
//! The same corrector serves both streams. Audio sets `forward_duration`, so
//! its bookkeeping timestamp is the end of the buffer rather than its start.

use super::sample::StreamKind;
use std::time::Duration;
use tracing::{debug, info};

/// What to do with a sample after correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDecision {
    /// Hand the sample to the writer at this timestamp
    Forward { effective: Duration },
    /// The sample measured a disconnection gap and is not written
    GapMeasured { gap: Duration },
    /// The raw timestamp went backwards; drop the sample
    OutOfOrder,
}

/// Timing state for one stream of one session
///
/// Only the stream's own delivery path mutates it.
#[derive(Debug, Clone)]
pub struct StreamTimingCorrector {
    forward_duration: bool,
    /// Bookkeeping timestamp of the last normally delivered sample
    last_accepted: Option<Duration>,
    /// Raw timestamp of the last sample that was not dropped
    last_raw: Option<Duration>,
    last_effective: Option<Duration>,
    accumulated_offset: Duration,
    disconnected: bool,
    disconnections: u32,
}

impl StreamTimingCorrector {
    pub fn new(forward_duration: bool) -> Self {
        Self {
            forward_duration,
            last_accepted: None,
            last_raw: None,
            last_effective: None,
            accumulated_offset: Duration::ZERO,
            disconnected: false,
            disconnections: 0,
        }
    }

    /// Corrector configured for a stream kind (audio forwards durations)
    pub fn for_stream(kind: StreamKind) -> Self {
        Self::new(kind == StreamKind::Audio)
    }

    /// Flag that the stream stalled; the next sample measures the gap
    pub fn mark_disconnected(&mut self) {
        self.disconnected = true;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn accumulated_offset(&self) -> Duration {
        self.accumulated_offset
    }

    pub fn last_accepted(&self) -> Option<Duration> {
        self.last_accepted
    }

    /// Start a stream that has not delivered yet with an offset
    ///
    /// Ignored once the stream has a delivered sample.
    pub fn seed_offset(&mut self, offset: Duration) {
        if self.last_accepted.is_none() {
            self.accumulated_offset = offset;
        }
    }

    /// Number of gaps measured so far
    pub fn disconnections(&self) -> u32 {
        self.disconnections
    }

    /// Correct one sample's timestamp
    ///
    /// # Arguments
    /// * `raw` - Device clock timestamp
    /// * `duration` - Sample duration, if the producer reports one
    pub fn correct(&mut self, raw: Duration, duration: Option<Duration>) -> TimingDecision {
        if let Some(last_raw) = self.last_raw
            && raw <= last_raw
        {
            debug!(raw = ?raw, last = ?last_raw, "Out-of-order sample");
            return TimingDecision::OutOfOrder;
        }

        let bookkeeping = match duration {
            Some(d) if self.forward_duration && !d.is_zero() => raw + d,
            _ => raw,
        };

        if self.disconnected {
            self.disconnected = false;

            if let Some(last) = self.last_accepted {
                let gap = bookkeeping.saturating_sub(last);
                self.accumulated_offset += gap;
                self.disconnections += 1;
                self.last_raw = Some(raw);

                info!(
                    gap = ?gap,
                    offset = ?self.accumulated_offset,
                    disconnections = self.disconnections,
                    "Stream reconnected"
                );
                return TimingDecision::GapMeasured { gap };
            }
        }

        let effective = raw.saturating_sub(self.accumulated_offset);
        if let Some(last_effective) = self.last_effective
            && effective < last_effective
        {
            debug!(effective = ?effective, last = ?last_effective, "Corrected timestamp regressed");
            return TimingDecision::OutOfOrder;
        }

        self.last_raw = Some(raw);
        self.last_accepted = Some(bookkeeping);
        self.last_effective = Some(effective);
        TimingDecision::Forward { effective }
    }
}
