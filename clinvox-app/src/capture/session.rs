//! Capture session state machine
//!
//! A linear session: `Idle → Recording → (Paused ⇄ Recording) → Stopped`.
//! Transitions are guarded; anything else is an [`Error::InvalidState`].
//! Duration is accumulated from wall-clock deltas across pause/resume cycles,
//! so paused time never counts. Stopping concatenates the buffered chunks
//! into one immutable payload pending an explicit save; nothing is persisted
//! here.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Recording => write!(f, "recording"),
            CaptureState::Paused => write!(f, "paused"),
            CaptureState::Stopped => write!(f, "stopped"),
        }
    }
}

/// The immutable result of a stopped session, pending an explicit save
#[derive(Debug, Clone)]
pub struct FinishedCapture {
    pub audio: Vec<u8>,
    pub duration_ms: i64,
    pub mime_type: String,
}

/// One microphone capture session
///
/// The public transition methods stamp time internally; the `_at` variants
/// take an explicit instant so duration accounting is deterministic under
/// test. At most one session is expected to be active at a time.
#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
    chunks: Vec<Vec<u8>>,
    /// Completed recording intervals accumulated so far
    accumulated: Duration,
    /// Start of the interval currently being recorded
    segment_started: Option<Instant>,
    mime_type: String,
}

impl CaptureSession {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            state: CaptureState::Idle,
            chunks: Vec::new(),
            accumulated: Duration::ZERO,
            segment_started: None,
            mime_type: mime_type.into(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Bytes buffered so far across all chunks
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Begin recording; allowed only from Idle
    pub fn start(&mut self) -> Result<()> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<()> {
        self.guard(CaptureState::Idle, "start")?;
        self.segment_started = Some(now);
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Pause; allowed only from Recording
    pub fn pause(&mut self) -> Result<()> {
        self.pause_at(Instant::now())
    }

    pub fn pause_at(&mut self, now: Instant) -> Result<()> {
        self.guard(CaptureState::Recording, "pause")?;
        self.close_segment(now);
        self.state = CaptureState::Paused;
        Ok(())
    }

    /// Resume; allowed only from Paused
    pub fn resume(&mut self) -> Result<()> {
        self.resume_at(Instant::now())
    }

    pub fn resume_at(&mut self, now: Instant) -> Result<()> {
        self.guard(CaptureState::Paused, "resume")?;
        self.segment_started = Some(now);
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Stop and finish; allowed from Recording or Paused
    ///
    /// Concatenates the buffered chunks and returns the finished capture.
    /// The session itself ends in Stopped and accepts no further chunks.
    pub fn stop(&mut self) -> Result<FinishedCapture> {
        self.stop_at(Instant::now())
    }

    pub fn stop_at(&mut self, now: Instant) -> Result<FinishedCapture> {
        match self.state {
            CaptureState::Recording => self.close_segment(now),
            CaptureState::Paused => {}
            other => {
                return Err(Error::InvalidState(format!(
                    "cannot stop from {} state",
                    other
                )))
            }
        }
        self.state = CaptureState::Stopped;

        let audio = self.chunks.concat();
        Ok(FinishedCapture {
            audio,
            duration_ms: self.accumulated.as_millis() as i64,
            mime_type: self.mime_type.clone(),
        })
    }

    /// Buffer a data chunk; allowed only while Recording
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> Result<()> {
        if self.state != CaptureState::Recording {
            return Err(Error::InvalidState(format!(
                "cannot buffer audio in {} state",
                self.state
            )));
        }
        self.chunks.push(chunk);
        Ok(())
    }

    fn guard(&self, expected: CaptureState, action: &str) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState(format!(
                "cannot {} from {} state",
                action, self.state
            )));
        }
        Ok(())
    }

    fn close_segment(&mut self, now: Instant) {
        if let Some(started) = self.segment_started.take() {
            self.accumulated += now.saturating_duration_since(started);
        }
    }
}
