//! Voice-sample capture
//!
//! The session state machine is independent of any audio backend; chunks can
//! come from the microphone input or from anywhere else that produces bytes.

pub mod session;

#[cfg(feature = "microphone")]
pub mod input;

pub use session::{CaptureSession, CaptureState, FinishedCapture};
