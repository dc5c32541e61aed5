use std::sync::Arc;

use crate::llm_client::TextCompletion;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Production: `LlmClient`; tests drive the
    /// engine with scripted fakes.
    pub llm: Arc<dyn TextCompletion>,
    pub sessions: SessionStore,
}
