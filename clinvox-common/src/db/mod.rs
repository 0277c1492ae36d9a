//! Database schema, models, and the record store

pub mod init;
pub mod models;
pub mod store;

pub use init::*;
pub use models::*;
pub use store::RecordStore;
