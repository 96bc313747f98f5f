use std::sync::Arc;

use crate::{
    errors::AppError,
    repositories::{
        contact::ContactRepository,
        event::EventRepository,
        memory::{MemoryContactRepo, MemoryEventRepo, MemoryProjectRepo},
        project::ProjectRepository,
        sqlx_repo::{SqlxContactRepo, SqlxEventRepo, SqlxProjectRepo},
    },
};

/// One repository per resource, backed by Postgres or by process memory.
#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            event_repo: Arc::new(SqlxEventRepo::new(pool.clone())),
            contact_repo: Arc::new(SqlxContactRepo::new(pool)),
        }
    }

    /// In-memory stores seeded with the bundled projects and events.
    pub fn in_memory() -> Result<Self, AppError> {
        Ok(SharedRepositories {
            project_repo: Arc::new(MemoryProjectRepo::seeded()?),
            event_repo: Arc::new(MemoryEventRepo::seeded()?),
            contact_repo: Arc::new(MemoryContactRepo::new()),
        })
    }
}
