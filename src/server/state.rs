use axum::extract::FromRef;

use crate::jobs::JobRunner;
use crate::store::MediaStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedMediaStore = Arc<dyn MediaStore>;
pub type GuardedJobRunner = Arc<JobRunner>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedMediaStore,
    pub job_runner: GuardedJobRunner,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedMediaStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedJobRunner {
    fn from_ref(input: &ServerState) -> Self {
        input.job_runner.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
