//! Generation engine — orchestrates the artifact pipeline.
//!
//! Flow: session snapshot → build_prompt → LLM call → record artifact +
//! memory. The advisory flow adds a response cache keyed on a stable hash of
//! everything the call depends on, so an unchanged session never pays for a
//! second advisory call.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::builder::{build_prompt, GenerationTask, PromptContext};
use crate::generation::prompts::{ADVISORY_PROMPT_TEMPLATE, ADVISORY_SYSTEM, GENERATION_SYSTEM};
use crate::generation::style::StyleConfig;
use crate::llm_client::TextCompletion;
use crate::session::{Artifact, SessionStore};
use crate::suggestions::{parse_suggestions, ParserOptions, SuggestionRecord};

/// Result of one advisory call.
#[derive(Debug, Clone)]
pub struct AdvisoryOutcome {
    pub suggestions: Vec<SuggestionRecord>,
    /// True when the records came from the cache without an LLM call.
    pub cached: bool,
}

/// Generates one artifact and records it in the session.
pub async fn generate_artifact(
    llm: &dyn TextCompletion,
    sessions: &SessionStore,
    session_id: Uuid,
    task: GenerationTask,
    style: &StyleConfig,
    notes: &str,
    use_memory: bool,
) -> Result<Artifact, AppError> {
    let mut memory = sessions.memory(session_id).await?;
    if !use_memory {
        memory.clear();
    }

    let prompt = build_prompt(task, style, &PromptContext::generation(notes, &memory));
    info!(
        "Generating {task} artifact for session {session_id} ({} memory entries)",
        memory.len()
    );

    let content = llm
        .complete(&prompt, GENERATION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("{task} generation failed: {e}")))?;

    let artifact = Artifact {
        task,
        content,
        generated_at: Utc::now(),
    };
    sessions.record_artifact(session_id, artifact.clone()).await?;
    Ok(artifact)
}

/// Generates all four artifacts sequentially in fixed task order against the
/// same notes and style. Each generated artifact lands in memory before the
/// next task runs.
pub async fn generate_all(
    llm: &dyn TextCompletion,
    sessions: &SessionStore,
    session_id: Uuid,
    style: &StyleConfig,
    notes: &str,
    use_memory: bool,
) -> Result<Vec<Artifact>, AppError> {
    let mut artifacts = Vec::with_capacity(GenerationTask::ALL.len());
    for task in GenerationTask::ALL {
        artifacts
            .push(generate_artifact(llm, sessions, session_id, task, style, notes, use_memory).await?);
    }
    Ok(artifacts)
}

/// Refines the stored artifact for `task` and replaces it with the result.
pub async fn refine_artifact(
    llm: &dyn TextCompletion,
    sessions: &SessionStore,
    session_id: Uuid,
    task: GenerationTask,
    instruction: &str,
) -> Result<Artifact, AppError> {
    let existing = sessions.artifact(session_id, task).await?.ok_or_else(|| {
        AppError::NotFound(format!("No {task} artifact to refine in session {session_id}"))
    })?;

    // Style never reaches a refinement prompt — the instruction alone
    // determines the transformation.
    let prompt = build_prompt(
        task,
        &StyleConfig::default(),
        &PromptContext::refinement(&existing.content, instruction),
    );
    info!("Refining {task} artifact for session {session_id}");

    let content = llm
        .complete(&prompt, GENERATION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("{task} refinement failed: {e}")))?;

    let artifact = Artifact {
        task,
        content,
        generated_at: Utc::now(),
    };
    sessions.record_artifact(session_id, artifact.clone()).await?;
    Ok(artifact)
}

/// Runs the advisory suggestions call, consulting the response cache first.
pub async fn advise(
    llm: &dyn TextCompletion,
    sessions: &SessionStore,
    session_id: Uuid,
    options: &ParserOptions,
) -> Result<AdvisoryOutcome, AppError> {
    let artifacts = sessions.artifacts(session_id).await?;
    if artifacts.is_empty() {
        return Err(AppError::Validation(
            "No artifacts to review yet. Generate at least one artifact first.".to_string(),
        ));
    }

    let state_hash = advisory_state_hash(&artifacts, options);
    if let Some(records) = sessions.cached_suggestions(session_id, state_hash).await? {
        debug!("Advisory cache hit for session {session_id}");
        return Ok(AdvisoryOutcome {
            suggestions: records,
            cached: true,
        });
    }

    let prompt = ADVISORY_PROMPT_TEMPLATE.replace("{artifacts}", &render_artifacts(&artifacts));
    let raw = llm
        .complete(&prompt, ADVISORY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Advisory call failed: {e}")))?;

    let suggestions = parse_suggestions(&raw, options);
    info!(
        "Advisory call for session {session_id} produced {} suggestions",
        suggestions.len()
    );

    sessions
        .store_suggestions(session_id, state_hash, suggestions.clone())
        .await?;
    Ok(AdvisoryOutcome {
        suggestions,
        cached: false,
    })
}

fn render_artifacts(artifacts: &[Artifact]) -> String {
    artifacts
        .iter()
        .map(|a| format!("## {}\n{}", a.task, a.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Stable cache key over everything the advisory call depends on: the ordered
/// artifact state and the parser knobs. Any change produces a new hash, which
/// is what invalidates the cached response.
fn advisory_state_hash(artifacts: &[Artifact], options: &ParserOptions) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for artifact in artifacts {
        hasher.update(artifact.task.key().as_bytes());
        hasher.update(&[0]);
        hasher.update(artifact.content.as_bytes());
        hasher.update(&[0]);
    }
    hasher.update(&(options.min_action_len as u64).to_le_bytes());
    hasher.update(&[options.require_confidence as u8]);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::suggestions::Confidence;

    /// Completion fake that always answers with the same text and counts calls.
    struct ScriptedLlm {
        response: String,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextCompletion for ScriptedLlm {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    const NOTES: &str = "Checkout drop-off spiked after the shipping fee change.";

    #[tokio::test]
    async fn test_generate_artifact_records_output_and_memory() {
        let llm = ScriptedLlm::new("A crisp executive summary.");
        let sessions = SessionStore::new();
        let id = sessions.create().await;

        let artifact = generate_artifact(
            &llm,
            &sessions,
            id,
            GenerationTask::Summary,
            &StyleConfig::default(),
            NOTES,
            true,
        )
        .await
        .unwrap();

        assert_eq!(artifact.task, GenerationTask::Summary);
        assert_eq!(artifact.content, "A crisp executive summary.");
        assert_eq!(sessions.memory(id).await.unwrap().len(), 1);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_all_produces_four_artifacts_in_order() {
        let llm = ScriptedLlm::new("Generated artifact text.");
        let sessions = SessionStore::new();
        let id = sessions.create().await;

        let artifacts = generate_all(&llm, &sessions, id, &StyleConfig::default(), NOTES, true)
            .await
            .unwrap();

        let tasks: Vec<GenerationTask> = artifacts.iter().map(|a| a.task).collect();
        assert_eq!(tasks, GenerationTask::ALL);
        assert_eq!(llm.call_count(), 4);
        assert_eq!(sessions.memory(id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_refine_without_existing_artifact_is_not_found() {
        let llm = ScriptedLlm::new("irrelevant");
        let sessions = SessionStore::new();
        let id = sessions.create().await;

        let err = refine_artifact(&llm, &sessions, id, GenerationTask::Prd, "Shorten it.")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(llm.call_count(), 0, "no LLM call without an artifact");
    }

    #[tokio::test]
    async fn test_refine_replaces_artifact_and_extends_memory() {
        let llm = ScriptedLlm::new("The refined summary.");
        let sessions = SessionStore::new();
        let id = sessions.create().await;
        sessions
            .record_artifact(
                id,
                Artifact {
                    task: GenerationTask::Summary,
                    content: "The draft summary.".to_string(),
                    generated_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let artifact = refine_artifact(&llm, &sessions, id, GenerationTask::Summary, "Tighten.")
            .await
            .unwrap();

        assert_eq!(artifact.content, "The refined summary.");
        let stored = sessions
            .artifact(id, GenerationTask::Summary)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.content, "The refined summary.");
        assert_eq!(sessions.memory(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_advise_requires_at_least_one_artifact() {
        let llm = ScriptedLlm::new("irrelevant");
        let sessions = SessionStore::new();
        let id = sessions.create().await;

        let err = advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_advise_parses_the_pipe_table_response() {
        let llm = ScriptedLlm::new(
            "Action | Reason | Confidence\nShip beta | waitlist keeps growing | High",
        );
        let sessions = SessionStore::new();
        let id = sessions.create().await;
        generate_artifact(
            &ScriptedLlm::new("Summary text."),
            &sessions,
            id,
            GenerationTask::Summary,
            &StyleConfig::default(),
            NOTES,
            true,
        )
        .await
        .unwrap();

        let outcome = advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap();
        assert!(!outcome.cached);
        assert_eq!(outcome.suggestions.len(), 1);
        assert_eq!(outcome.suggestions[0].action, "Ship beta");
        assert_eq!(outcome.suggestions[0].confidence, Confidence::High);
    }

    #[tokio::test]
    async fn test_advise_hits_cache_until_artifacts_change() {
        let llm = ScriptedLlm::new("Ship beta | waitlist keeps growing | High");
        let sessions = SessionStore::new();
        let id = sessions.create().await;
        let generator = ScriptedLlm::new("Artifact text.");

        generate_artifact(
            &generator,
            &sessions,
            id,
            GenerationTask::Summary,
            &StyleConfig::default(),
            NOTES,
            true,
        )
        .await
        .unwrap();

        let first = advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap();
        assert!(!first.cached);
        assert_eq!(llm.call_count(), 1);

        let second = advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap();
        assert!(second.cached, "unchanged state must come from the cache");
        assert_eq!(second.suggestions, first.suggestions);
        assert_eq!(llm.call_count(), 1, "no second LLM call on a cache hit");

        // Any artifact change invalidates the cached response.
        generate_artifact(
            &generator,
            &sessions,
            id,
            GenerationTask::ActionItems,
            &StyleConfig::default(),
            NOTES,
            true,
        )
        .await
        .unwrap();

        let third = advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap();
        assert!(!third.cached);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_changed_parser_options_bypass_the_cache() {
        let llm = ScriptedLlm::new("Ship beta | waitlist keeps growing | High");
        let sessions = SessionStore::new();
        let id = sessions.create().await;
        generate_artifact(
            &ScriptedLlm::new("Artifact text."),
            &sessions,
            id,
            GenerationTask::Summary,
            &StyleConfig::default(),
            NOTES,
            true,
        )
        .await
        .unwrap();

        advise(&llm, &sessions, id, &ParserOptions::default())
            .await
            .unwrap();
        let stricter = ParserOptions {
            min_action_len: 5,
            ..ParserOptions::default()
        };
        let outcome = advise(&llm, &sessions, id, &stricter).await.unwrap();
        assert!(!outcome.cached, "parser options are part of the cache key");
        assert_eq!(llm.call_count(), 2);
    }

    #[test]
    fn test_state_hash_tracks_content_and_options() {
        let artifact = |content: &str| Artifact {
            task: GenerationTask::Summary,
            content: content.to_string(),
            generated_at: Utc::now(),
        };
        let options = ParserOptions::default();

        let a = advisory_state_hash(&[artifact("one")], &options);
        let b = advisory_state_hash(&[artifact("one")], &options);
        let c = advisory_state_hash(&[artifact("two")], &options);
        let d = advisory_state_hash(
            &[artifact("one")],
            &ParserOptions {
                require_confidence: true,
                ..options
            },
        );

        assert_eq!(a, b, "hash is a pure function of its inputs");
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
