//! Session state — the orchestration shell's mutable state as an explicit
//! store, never module-level globals.
//!
//! A session owns the current artifact per task, the ordered memory log of
//! every artifact text produced so far, and the advisory response cache.
//! In-memory only; sessions die with the process.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::builder::GenerationTask;
use crate::suggestions::SuggestionRecord;

/// One generated artifact. Regeneration replaces the previous artifact for
/// the same task and re-timestamps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub task: GenerationTask,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// Cached advisory response, valid only while the state hash it was computed
/// from still matches.
#[derive(Debug, Clone)]
struct AdvisoryCache {
    state_hash: blake3::Hash,
    records: Vec<SuggestionRecord>,
}

#[derive(Debug)]
struct Session {
    created_at: DateTime<Utc>,
    artifacts: HashMap<GenerationTask, Artifact>,
    memory: Vec<String>,
    advisory_cache: Option<AdvisoryCache>,
}

impl Session {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            artifacts: HashMap::new(),
            memory: Vec::new(),
            advisory_cache: None,
        }
    }
}

/// Read snapshot of a session's artifact state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub created_at: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
}

/// In-memory session registry shared across handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(id, Session::new());
        id
    }

    /// Current artifacts in fixed task order, plus session metadata.
    pub async fn overview(&self, id: Uuid) -> Result<SessionOverview, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(SessionOverview {
            created_at: session.created_at,
            artifacts: ordered_artifacts(session),
        })
    }

    /// Current artifacts in fixed task order.
    pub async fn artifacts(&self, id: Uuid) -> Result<Vec<Artifact>, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(ordered_artifacts(session))
    }

    /// The stored artifact for one task, if any.
    pub async fn artifact(
        &self,
        id: Uuid,
        task: GenerationTask,
    ) -> Result<Option<Artifact>, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(session.artifacts.get(&task).cloned())
    }

    /// Snapshot of the session's memory log.
    pub async fn memory(&self, id: Uuid) -> Result<Vec<String>, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(session.memory.clone())
    }

    /// Stores a freshly generated artifact and appends its text to memory.
    pub async fn record_artifact(&self, id: Uuid, artifact: Artifact) -> Result<(), AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.memory.push(artifact.content.clone());
        session.artifacts.insert(artifact.task, artifact);
        Ok(())
    }

    /// Returns the cached advisory records if the state hash still matches.
    pub async fn cached_suggestions(
        &self,
        id: Uuid,
        state_hash: blake3::Hash,
    ) -> Result<Option<Vec<SuggestionRecord>>, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(session
            .advisory_cache
            .as_ref()
            .filter(|cache| cache.state_hash == state_hash)
            .map(|cache| cache.records.clone()))
    }

    /// Replaces the advisory cache entry for this session.
    pub async fn store_suggestions(
        &self,
        id: Uuid,
        state_hash: blake3::Hash,
        records: Vec<SuggestionRecord>,
    ) -> Result<(), AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.advisory_cache = Some(AdvisoryCache {
            state_hash,
            records,
        });
        Ok(())
    }
}

fn ordered_artifacts(session: &Session) -> Vec<Artifact> {
    GenerationTask::ALL
        .iter()
        .filter_map(|task| session.artifacts.get(task).cloned())
        .collect()
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
