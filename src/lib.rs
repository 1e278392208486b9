//! Medialist Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod jobs;
pub mod providers;
pub mod server;
pub mod store;
pub mod sync;

// Re-export commonly used types for convenience
pub use jobs::{JobContext, JobRunner};
pub use server::{run_server, RequestsLoggingLevel};
pub use store::{MediaStore, MemoryMediaStore, SqliteMediaStore};
