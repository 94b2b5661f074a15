// SPDX-License-Identifier: MPL-2.0

//! Recording engine
//!
//! Owns the lifecycle of one recording session at a time:
//!
//! ```text
//! Idle → Configuring → Writing ⇄ Paused → Finalizing → Idle
//!            │                                 │
//!            └────────────→ Failed ←───────────┘
//! ```
//!
//! `Failed` is a resting state: like `Idle` it accepts a new start.
//!
//! Samples arrive on real-time producer threads through [`RecordingEngine::push_video`]
//! and [`RecordingEngine::push_audio`]. Delivery never blocks: it reads the
//! lifecycle state atomically, takes the session with `try_read` and each
//! stream's timing corrector with `try_lock`. Anything that would wait drops
//! the sample instead.

use super::muxer::{GstWriterFactory, MediaWriter, WriterFactory};
use super::sample::{Sample, StreamKind};
use super::settings::{RecordingOptions, WriterSettings, resolve};
use super::timing::{StreamTimingCorrector, TimingDecision};
use crate::backends::camera::CaptureDevice;
use crate::backends::camera::types::Resolution;
use crate::config::RecorderConfig;
use crate::constants::{QualityTier, timing};
use crate::errors::{RecordingError, RecordingResult};
use crate::media::formats::codec::ContainerType;
use crate::media::formats::negotiation::configure_device;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock, TryLockError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecorderState {
    Idle = 0,
    Configuring = 1,
    Writing = 2,
    Paused = 3,
    Finalizing = 4,
    Failed = 5,
}

impl RecorderState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RecorderState::Configuring,
            2 => RecorderState::Writing,
            3 => RecorderState::Paused,
            4 => RecorderState::Finalizing,
            5 => RecorderState::Failed,
            _ => RecorderState::Idle,
        }
    }

    /// A session exists (samples may be delivered or stop may be called)
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RecorderState::Configuring | RecorderState::Writing | RecorderState::Paused
        )
    }
}

/// Why a pushed sample was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No session is accepting samples
    NotRecording,
    Paused,
    /// A control operation held the session or the stream state
    Contended,
    /// The sample only measured a disconnection gap
    GapMeasurement,
    OutOfOrder,
    /// Corrected timestamp precedes the session anchor
    BeforeSessionStart,
    /// The writer's input for this track is full
    WriterBusy,
    /// The writer failed earlier in the session
    WriterFailed,
}

/// Outcome of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Forwarded { effective: Duration },
    Dropped(DropReason),
}

/// Per-stream counters for the current or last session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub accepted: u64,
    pub dropped: u64,
}

/// Counters for both streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingStats {
    pub video: StreamStats,
    pub audio: StreamStats,
}

#[derive(Default)]
struct StreamCounters {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl StreamCounters {
    fn snapshot(&self) -> StreamStats {
        StreamStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// State of one stream inside a session
struct StreamSlot {
    corrector: Mutex<StreamTimingCorrector>,
    /// Set from the control path, consumed by the delivery path
    disconnect_requested: AtomicBool,
    counters: StreamCounters,
}

impl StreamSlot {
    fn new(kind: StreamKind) -> Self {
        Self {
            corrector: Mutex::new(StreamTimingCorrector::for_stream(kind)),
            disconnect_requested: AtomicBool::new(false),
            counters: StreamCounters::default(),
        }
    }
}

/// Pauses of one session, on the capture clock
#[derive(Debug, Default)]
struct PauseTimeline {
    /// Latest raw timestamp written before the pause still being measured
    open_since: Option<Duration>,
    /// Sum of every measured pause
    total: Duration,
}

/// One recording session
struct RecordingSession {
    writer: Box<dyn MediaWriter>,
    path: PathBuf,
    settings: WriterSettings,
    streams: [StreamSlot; 2],
    /// Effective timestamp of the first written sample
    anchor: OnceLock<Duration>,
    /// Set once the writer has been told about the anchor
    writer_started: AtomicBool,
    /// First writer error; later samples are dropped and stop reports it
    writer_error: OnceLock<String>,
    /// Latest raw timestamp written on either stream, in nanoseconds
    latest_raw_ns: AtomicU64,
    pauses: Mutex<PauseTimeline>,
    /// A pause awaits its first sample after resume to be measured
    pause_pending: AtomicBool,
}

impl RecordingSession {
    fn stats(&self) -> RecordingStats {
        RecordingStats {
            video: self.streams[StreamKind::Video.index()].counters.snapshot(),
            audio: self.streams[StreamKind::Audio.index()].counters.snapshot(),
        }
    }
}

/// The recording engine
///
/// One engine records one session at a time; a second start while a session
/// is active fails with [`RecordingError::AlreadyRecording`].
pub struct RecordingEngine {
    state: AtomicU8,
    paused: AtomicBool,
    session: RwLock<Option<RecordingSession>>,
    last_stats: Mutex<RecordingStats>,
    writer_factory: Arc<dyn WriterFactory>,
}

impl RecordingEngine {
    /// Create an engine that opens writers through `writer_factory`
    pub fn new(writer_factory: Arc<dyn WriterFactory>) -> Self {
        Self {
            state: AtomicU8::new(RecorderState::Idle as u8),
            paused: AtomicBool::new(false),
            session: RwLock::new(None),
            last_stats: Mutex::new(RecordingStats::default()),
            writer_factory,
        }
    }

    /// Create an engine writing through GStreamer
    pub fn with_gstreamer(config: &RecorderConfig) -> Self {
        Self::new(Arc::new(GstWriterFactory {
            audio_quality: config.audio_quality,
            max_queued_bytes: config.writer_max_queued_bytes,
        }))
    }

    pub fn state(&self) -> RecorderState {
        RecorderState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: RecorderState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: RecorderState, to: RecorderState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Configure the device and writer and start a session
    ///
    /// The engine stays in `Configuring` until the first sample of either
    /// stream is written; that sample anchors the output timeline.
    ///
    /// # Arguments
    /// * `path` - Output file; its parent directory must exist
    /// * `device` - Capture device to negotiate with and configure
    /// * `options` - Requested codec, container, color space and frame rate
    /// * `quality` - Quality tier, clamped to `preview`
    /// * `preview` - Size the live preview currently delivers
    pub fn configure_and_start(
        &self,
        path: &Path,
        device: &dyn CaptureDevice,
        options: &RecordingOptions,
        quality: QualityTier,
        preview: Resolution,
    ) -> RecordingResult<()> {
        let claimed = self.transition(RecorderState::Idle, RecorderState::Configuring)
            || self.transition(RecorderState::Failed, RecorderState::Configuring);
        if !claimed {
            warn!(state = ?self.state(), "Start rejected, recording already active");
            return Err(RecordingError::AlreadyRecording);
        }

        info!(
            path = %path.display(),
            ?quality,
            %preview,
            device = device.name(),
            "Starting recording"
        );

        match self.open_session(path, device, options, quality, preview) {
            Ok(session) => {
                self.paused.store(false, Ordering::Release);
                *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to start recording");
                self.transition(RecorderState::Configuring, RecorderState::Failed);
                Err(e)
            }
        }
    }

    fn open_session(
        &self,
        path: &Path,
        device: &dyn CaptureDevice,
        options: &RecordingOptions,
        quality: QualityTier,
        preview: Resolution,
    ) -> RecordingResult<RecordingSession> {
        validate_output_path(path)?;

        let settings = resolve(options, quality, preview, device)?;
        check_extension(path, settings.container)?;

        configure_device(device, &settings.negotiated(), settings.frame_rate_override)
            .map_err(|e| RecordingError::DeviceLockFailed(format!("{}: {}", device.name(), e)))?;

        let writer = self
            .writer_factory
            .open(path, &settings)
            .map_err(RecordingError::WriterConfigurationFailed)?;

        Ok(RecordingSession {
            writer,
            path: path.to_path_buf(),
            settings,
            streams: [
                StreamSlot::new(StreamKind::Video),
                StreamSlot::new(StreamKind::Audio),
            ],
            anchor: OnceLock::new(),
            writer_started: AtomicBool::new(false),
            writer_error: OnceLock::new(),
            latest_raw_ns: AtomicU64::new(0),
            pauses: Mutex::new(PauseTimeline::default()),
            pause_pending: AtomicBool::new(false),
        })
    }

    /// Deliver a video frame
    pub fn push_video(&self, sample: Sample) -> DeliveryOutcome {
        self.deliver(StreamKind::Video, &sample)
    }

    /// Deliver an audio buffer
    pub fn push_audio(&self, sample: Sample) -> DeliveryOutcome {
        self.deliver(StreamKind::Audio, &sample)
    }

    fn deliver(&self, kind: StreamKind, sample: &Sample) -> DeliveryOutcome {
        let state = self.state();
        if !matches!(state, RecorderState::Configuring | RecorderState::Writing) {
            return if state == RecorderState::Paused {
                self.count_drop(kind);
                DeliveryOutcome::Dropped(DropReason::Paused)
            } else {
                DeliveryOutcome::Dropped(DropReason::NotRecording)
            };
        }
        if self.paused.load(Ordering::Acquire) {
            self.count_drop(kind);
            return DeliveryOutcome::Dropped(DropReason::Paused);
        }

        let guard = match self.session.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return DeliveryOutcome::Dropped(DropReason::Contended),
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };
        let Some(session) = guard.as_ref() else {
            return DeliveryOutcome::Dropped(DropReason::NotRecording);
        };

        let slot = &session.streams[kind.index()];
        let outcome = self.deliver_to_session(kind, sample, session, slot);

        match outcome {
            DeliveryOutcome::Forwarded { .. } => {
                let accepted = slot.counters.accepted.fetch_add(1, Ordering::Relaxed) + 1;
                if accepted % timing::SAMPLE_LOG_INTERVAL == 0 {
                    debug!(stream = %kind, accepted, "Recording progress");
                }
            }
            DeliveryOutcome::Dropped(_) => {
                slot.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome
    }

    fn deliver_to_session(
        &self,
        kind: StreamKind,
        sample: &Sample,
        session: &RecordingSession,
        slot: &StreamSlot,
    ) -> DeliveryOutcome {
        if session.writer_error.get().is_some() {
            return DeliveryOutcome::Dropped(DropReason::WriterFailed);
        }

        let mut corrector = match slot.corrector.try_lock() {
            Ok(corrector) => corrector,
            Err(TryLockError::WouldBlock) => return DeliveryOutcome::Dropped(DropReason::Contended),
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        if slot.disconnect_requested.swap(false, Ordering::AcqRel) {
            corrector.mark_disconnected();
        }

        if session.pause_pending.load(Ordering::Acquire) || corrector.last_accepted().is_none() {
            let mut pauses = match session.pauses.try_lock() {
                Ok(pauses) => pauses,
                Err(TryLockError::WouldBlock) => {
                    return DeliveryOutcome::Dropped(DropReason::Contended);
                }
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
            };
            if let Some(since) = pauses.open_since.take() {
                let span = sample.pts.saturating_sub(since);
                pauses.total += span;
                session.pause_pending.store(false, Ordering::Release);
                info!(stream = %kind, span = ?span, total = ?pauses.total, "Pause measured");
            }
            // A stream that starts after a pause skips the paused time too
            if !pauses.total.is_zero() {
                corrector.seed_offset(pauses.total);
            }
        }

        let effective = match corrector.correct(sample.pts, sample.duration) {
            TimingDecision::Forward { effective } => effective,
            TimingDecision::GapMeasured { .. } => {
                return DeliveryOutcome::Dropped(DropReason::GapMeasurement);
            }
            TimingDecision::OutOfOrder => return DeliveryOutcome::Dropped(DropReason::OutOfOrder),
        };
        drop(corrector);

        if let Some(anchor) = session.anchor.get()
            && effective < *anchor
        {
            return DeliveryOutcome::Dropped(DropReason::BeforeSessionStart);
        }

        if !session.writer.is_ready_for_more(kind) {
            return DeliveryOutcome::Dropped(DropReason::WriterBusy);
        }

        let anchor = match session.anchor.get() {
            Some(anchor) => *anchor,
            None if session.anchor.set(effective).is_ok() => {
                info!(stream = %kind, anchor = ?effective, "First sample, anchoring session");
                session.writer.start_session(effective);
                session.writer_started.store(true, Ordering::Release);
                effective
            }
            None => match session.anchor.get() {
                Some(anchor) => *anchor,
                None => return DeliveryOutcome::Dropped(DropReason::Contended),
            },
        };
        if effective < anchor {
            return DeliveryOutcome::Dropped(DropReason::BeforeSessionStart);
        }
        // The other stream is still anchoring the writer
        if !session.writer_started.load(Ordering::Acquire) {
            return DeliveryOutcome::Dropped(DropReason::Contended);
        }

        if let Err(e) = session.writer.append(kind, sample, effective) {
            if session.writer_error.set(e.clone()).is_ok() {
                error!(stream = %kind, error = %e, "Writer failed, dropping further samples");
            }
            return DeliveryOutcome::Dropped(DropReason::WriterFailed);
        }

        let raw_ns = u64::try_from(sample.pts.as_nanos()).unwrap_or(u64::MAX);
        session.latest_raw_ns.fetch_max(raw_ns, Ordering::AcqRel);

        if self.transition(RecorderState::Configuring, RecorderState::Writing) {
            info!("Recording is writing");
        }

        DeliveryOutcome::Forwarded { effective }
    }

    fn count_drop(&self, kind: StreamKind) {
        if let Ok(guard) = self.session.try_read()
            && let Some(session) = guard.as_ref()
        {
            session.streams[kind.index()]
                .counters
                .dropped
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Stop writing samples until [`RecordingEngine::resume`]
    ///
    /// Paused samples are dropped, not buffered. Both streams are flagged as
    /// disconnected, so the paused interval is cut from the output timeline.
    pub fn pause(&self) {
        if !self.transition(RecorderState::Writing, RecorderState::Paused) {
            if self.state() != RecorderState::Paused {
                warn!(state = ?self.state(), "Pause ignored, not writing");
            }
            return;
        }

        self.paused.store(true, Ordering::Release);
        {
            let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
            if let Some(session) = guard.as_ref() {
                let mut pauses = session.pauses.lock().unwrap_or_else(|e| e.into_inner());
                if pauses.open_since.is_none() {
                    let latest = session.latest_raw_ns.load(Ordering::Acquire);
                    pauses.open_since = Some(Duration::from_nanos(latest));
                }
                session.pause_pending.store(true, Ordering::Release);
            }
        }
        for kind in StreamKind::ALL {
            self.mark_disconnected(kind);
        }
        info!("Recording paused");
    }

    /// Resume after [`RecordingEngine::pause`]
    pub fn resume(&self) {
        if !self.transition(RecorderState::Paused, RecorderState::Writing) {
            if self.state() != RecorderState::Writing {
                warn!(state = ?self.state(), "Resume ignored, not paused");
            }
            return;
        }

        self.paused.store(false, Ordering::Release);
        info!("Recording resumed");
    }

    /// Report that a stream stalled
    ///
    /// The stream's next sample measures the gap and is not written.
    pub fn mark_disconnected(&self, kind: StreamKind) {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = guard.as_ref() {
            session.streams[kind.index()]
                .disconnect_requested
                .store(true, Ordering::Release);
            debug!(stream = %kind, "Stream marked disconnected");
        }
    }

    /// Counters of the current session, or of the last one once stopped
    pub fn stats(&self) -> RecordingStats {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(session) => session.stats(),
            None => *self.last_stats.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    /// Settings of the active session
    pub fn active_settings(&self) -> Option<WriterSettings> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|s| s.settings.clone())
    }

    /// Stop and finalize the recording
    ///
    /// Finalization runs on a blocking task that keeps going even if this
    /// future is dropped. The output file must not be read before this
    /// returns.
    ///
    /// # Returns
    /// * `Ok(true)` - Samples were written and the file is complete
    /// * `Ok(false)` - Nothing was recorded; no file is left behind
    /// * `Err(RecordingError::NotRecording)` - No active session
    /// * `Err(RecordingError::FinalizeFailed)` - The file is invalid
    pub async fn stop(self: &Arc<Self>) -> RecordingResult<bool> {
        let session = {
            let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
            // No session yet also covers a start still opening the writer
            if guard.is_none() {
                return Err(RecordingError::NotRecording);
            }

            // Pause and resume may move the state under us
            loop {
                let from = self.state();
                if !from.is_active() {
                    return Err(RecordingError::NotRecording);
                }
                if self.transition(from, RecorderState::Finalizing) {
                    break;
                }
            }
            guard.take()
        };
        self.paused.store(false, Ordering::Release);
        let Some(session) = session else {
            return Err(RecordingError::NotRecording);
        };

        info!(path = %session.path.display(), "Stopping recording");

        let engine = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = engine.finalize_session(session).await;
            let next = if result.is_ok() {
                RecorderState::Idle
            } else {
                RecorderState::Failed
            };
            engine.set_state(next);
            result
        });

        task.await
            .map_err(|e| RecordingError::FinalizeFailed(format!("Finalize task failed: {}", e)))?
    }

    async fn finalize_session(&self, session: RecordingSession) -> RecordingResult<bool> {
        let stats = session.stats();
        *self.last_stats.lock().unwrap_or_else(|e| e.into_inner()) = stats;

        let RecordingSession {
            writer,
            path,
            writer_error,
            ..
        } = session;

        let finalized = tokio::task::spawn_blocking(move || writer.finalize())
            .await
            .map_err(|e| format!("Finalize panicked: {}", e))
            .and_then(|r| r);

        let written = stats.video.accepted + stats.audio.accepted;
        if written == 0 {
            if let Err(e) = &finalized {
                debug!(error = %e, "Finalize of empty recording failed");
            }
            remove_output(&path);
            info!(path = %path.display(), "Nothing recorded");
            return Ok(false);
        }

        if let Some(e) = writer_error.into_inner() {
            error!(error = %e, "Recording failed during writing");
            return Err(RecordingError::FinalizeFailed(e));
        }

        match finalized {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    video = stats.video.accepted,
                    audio = stats.audio.accepted,
                    dropped = stats.video.dropped + stats.audio.dropped,
                    "Recording finalized"
                );
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, "Failed to finalize recording");
                Err(RecordingError::FinalizeFailed(e))
            }
        }
    }
}

/// Check that the output file extension names the container being written
///
/// Paths without an extension are accepted as they are.
fn check_extension(path: &Path, container: ContainerType) -> RecordingResult<()> {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Ok(());
    };
    if ContainerType::from_extension(ext) == Some(container) {
        return Ok(());
    }

    warn!(path = %path.display(), %container, "Output extension does not match container");
    Err(RecordingError::WriterConfigurationFailed(format!(
        "{} cannot hold a {} container, use .{}",
        path.display(),
        container,
        container.extension()
    )))
}

/// Check that the output path can be created or overwritten
fn validate_output_path(path: &Path) -> RecordingResult<()> {
    if path.is_dir() {
        return Err(RecordingError::PathUnwritable(format!(
            "{} is a directory",
            path.display()
        )));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(RecordingError::PathUnwritable(format!(
            "{} does not exist",
            parent.display()
        )));
    }

    let existed = path.exists();
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| RecordingError::PathUnwritable(format!("{}: {}", path.display(), e)))?;
    if !existed {
        remove_output(path);
    }
    Ok(())
}

fn remove_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed output file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove output file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::StaticDevice;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingWriter {
        appended: Arc<AtomicUsize>,
    }

    impl MediaWriter for CountingWriter {
        fn start_session(&self, _at: Duration) {}
        fn is_ready_for_more(&self, _kind: StreamKind) -> bool {
            true
        }
        fn append(&self, _kind: StreamKind, _sample: &Sample, _ts: Duration) -> Result<(), String> {
            self.appended.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn finalize(self: Box<Self>) -> Result<(), String> {
            Ok(())
        }
    }

    struct CountingFactory {
        appended: Arc<AtomicUsize>,
    }

    impl WriterFactory for CountingFactory {
        fn open(
            &self,
            _path: &Path,
            _settings: &WriterSettings,
        ) -> Result<Box<dyn MediaWriter>, String> {
            Ok(Box::new(CountingWriter {
                appended: Arc::clone(&self.appended),
            }))
        }
    }

    fn engine() -> (Arc<RecordingEngine>, Arc<AtomicUsize>) {
        let appended = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            appended: Arc::clone(&appended),
        };
        (Arc::new(RecordingEngine::new(Arc::new(factory))), appended)
    }

    fn start(engine: &RecordingEngine, dir: &Path) {
        engine
            .configure_and_start(
                &dir.join("out.mp4"),
                &StaticDevice::test_pattern(),
                &RecordingOptions::default(),
                QualityTier::Hd,
                Resolution::new(1920, 1080),
            )
            .unwrap();
    }

    #[test]
    fn test_state_roundtrip() {
        for state in [
            RecorderState::Idle,
            RecorderState::Configuring,
            RecorderState::Writing,
            RecorderState::Paused,
            RecorderState::Finalizing,
            RecorderState::Failed,
        ] {
            assert_eq!(RecorderState::from_u8(state as u8), state);
        }
    }

    #[test]
    fn test_first_sample_moves_to_writing() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, appended) = engine();
        start(&engine, dir.path());
        assert_eq!(engine.state(), RecorderState::Configuring);

        let outcome = engine.push_video(Sample::new(vec![0u8; 4], Duration::from_millis(500)));
        assert_eq!(
            outcome,
            DeliveryOutcome::Forwarded {
                effective: Duration::from_millis(500)
            }
        );
        assert_eq!(engine.state(), RecorderState::Writing);
        assert_eq!(appended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_samples_dropped_while_idle() {
        let (engine, appended) = engine();
        let outcome = engine.push_audio(Sample::new(vec![0u8; 4], Duration::ZERO));
        assert_eq!(outcome, DeliveryOutcome::Dropped(DropReason::NotRecording));
        assert_eq!(appended.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_samples_before_anchor_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _) = engine();
        start(&engine, dir.path());

        engine.push_video(Sample::new(vec![0u8; 4], Duration::from_millis(100)));
        // Audio from before the video anchor
        let early = Sample::new(vec![0u8; 4], Duration::from_millis(80))
            .with_duration(Duration::from_millis(10));
        let outcome = engine.push_audio(early);
        assert_eq!(outcome, DeliveryOutcome::Dropped(DropReason::BeforeSessionStart));
        assert_eq!(engine.stats().audio.dropped, 1);
    }

    #[test]
    fn test_pause_outside_session_is_noop() {
        let (engine, _) = engine();
        engine.pause();
        engine.resume();
        assert_eq!(engine.state(), RecorderState::Idle);
    }

    #[test]
    fn test_path_validation() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_output_path(dir.path()),
            Err(RecordingError::PathUnwritable(_))
        ));
        assert!(matches!(
            validate_output_path(&dir.path().join("missing").join("out.mp4")),
            Err(RecordingError::PathUnwritable(_))
        ));

        let ok = dir.path().join("out.mp4");
        validate_output_path(&ok).unwrap();
        assert!(!ok.exists());
    }

    #[test]
    fn test_extension_check() {
        let mov = ContainerType::QuickTimeMovie;
        assert!(check_extension(Path::new("clip.MOV"), mov).is_ok());
        assert!(check_extension(Path::new("clip"), mov).is_ok());
        assert!(matches!(
            check_extension(Path::new("clip.mp4"), mov),
            Err(RecordingError::WriterConfigurationFailed(_))
        ));
        assert!(check_extension(Path::new("clip.mkv"), ContainerType::Mpeg4).is_err());
    }
}
