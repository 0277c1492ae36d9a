//! # ClinVox Common Library
//!
//! Shared code for the ClinVox clinical voice-capture tool:
//! - Record store (SQLite) and database models
//! - Configuration and data-folder resolution
//! - JSON export of the clinic dataset
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod export;

pub use db::store::RecordStore;
pub use error::{Error, Result};
