use crate::store::MediaStore;
use std::sync::Arc;

/// Shared resources handed to jobs during execution.
///
/// Runs are never interrupted mid-way; a triggered job finishes its batch,
/// so there is no cancellation token here.
#[derive(Clone)]
pub struct JobContext {
    /// Access to the media library.
    pub store: Arc<dyn MediaStore>,
}

impl JobContext {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }
}
