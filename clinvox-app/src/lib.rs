//! # ClinVox App Library
//!
//! Clinical voice-capture application: capture session state machine,
//! patient/recording/assignment workflows, and the static-file HTTP server.
//!
//! Workflows receive their [`clinvox_common::RecordStore`] at construction;
//! there is no shared global state.

pub mod capture;
pub mod error;
pub mod server;
pub mod workflow;

pub use error::{Error, Result};
