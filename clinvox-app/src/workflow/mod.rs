//! Feature workflows
//!
//! Each workflow is constructed once at startup with the record store it
//! needs; there are no global references. A workflow validates its input,
//! calls the store, and surfaces the first store failure unchanged — it
//! never retries.

pub mod assignment;
pub mod patient;
pub mod recording;

pub use assignment::AssignmentWorkflow;
pub use patient::{PatientRules, PatientWorkflow};
pub use recording::RecordingWorkflow;
