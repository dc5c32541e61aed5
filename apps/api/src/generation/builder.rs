//! Prompt Builder — deterministic assembly of generation and refinement prompts.
//!
//! Pure string construction: no I/O, no mutation of inputs, byte-identical
//! output for identical (task, style, context) input. Task-specific text lives
//! in `prompts.rs` as data; there is exactly one code path per prompt mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::prompts::{
    ACTION_ITEMS_INSTRUCTION, PRD_INSTRUCTION, REFINEMENT_FRAMING, SUMMARY_INSTRUCTION,
    USER_STORIES_INSTRUCTION,
};
use crate::generation::style::StyleConfig;

/// The four artifact kinds ProdPilot can generate from product notes.
///
/// Wire identifiers are the artifact keys (`summary`, `actions`, `prd`,
/// `stories`); anything else fails task parsing with `AppError::UnknownTask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationTask {
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "actions")]
    ActionItems,
    #[serde(rename = "prd")]
    Prd,
    #[serde(rename = "stories")]
    UserStories,
}

impl GenerationTask {
    /// All tasks in the order "Generate All" runs them.
    pub const ALL: [GenerationTask; 4] = [
        GenerationTask::Summary,
        GenerationTask::ActionItems,
        GenerationTask::Prd,
        GenerationTask::UserStories,
    ];

    /// Stable artifact key used on the wire and as the session storage key.
    pub fn key(&self) -> &'static str {
        match self {
            GenerationTask::Summary => "summary",
            GenerationTask::ActionItems => "actions",
            GenerationTask::Prd => "prd",
            GenerationTask::UserStories => "stories",
        }
    }

    /// The fixed instruction fragment a generation-mode prompt ends with.
    pub fn instruction(&self) -> &'static str {
        match self {
            GenerationTask::Summary => SUMMARY_INSTRUCTION,
            GenerationTask::ActionItems => ACTION_ITEMS_INSTRUCTION,
            GenerationTask::Prd => PRD_INSTRUCTION,
            GenerationTask::UserStories => USER_STORIES_INSTRUCTION,
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GenerationTask {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(GenerationTask::Summary),
            "actions" => Ok(GenerationTask::ActionItems),
            "prd" => Ok(GenerationTask::Prd),
            "stories" => Ok(GenerationTask::UserStories),
            _ => Err(AppError::UnknownTask(s.to_string())),
        }
    }
}

/// A follow-up request that transforms an existing artifact instead of
/// generating a new one from raw notes.
#[derive(Debug, Clone, Copy)]
pub struct Refinement<'a> {
    pub existing_output: &'a str,
    pub instruction: &'a str,
}

/// Per-call prompt input: raw notes, prior artifacts ("memory"), and an
/// optional refinement pair. Borrowed from the caller; never mutated.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub notes: &'a str,
    pub memory: &'a [String],
    pub refinement: Option<Refinement<'a>>,
}

impl<'a> PromptContext<'a> {
    pub fn generation(notes: &'a str, memory: &'a [String]) -> Self {
        Self {
            notes,
            memory,
            refinement: None,
        }
    }

    pub fn refinement(existing_output: &'a str, instruction: &'a str) -> Self {
        Self {
            notes: "",
            memory: &[],
            refinement: Some(Refinement {
                existing_output,
                instruction,
            }),
        }
    }
}

/// Composes the prompt for one LLM call.
///
/// Two mutually exclusive modes: refinement mode when `context` carries a
/// refinement pair, generation mode otherwise. Refinement mode adds no
/// task-specific boilerplate — the refinement instruction alone determines
/// the requested transformation.
pub fn build_prompt(task: GenerationTask, style: &StyleConfig, context: &PromptContext) -> String {
    match &context.refinement {
        Some(refinement) => build_refinement_prompt(refinement),
        None => build_generation_prompt(task, style, context),
    }
}

fn build_refinement_prompt(refinement: &Refinement) -> String {
    format!(
        "{REFINEMENT_FRAMING}\n\nCurrent deliverable:\n{}\n\nRevision request:\n{}",
        refinement.existing_output, refinement.instruction
    )
}

fn build_generation_prompt(
    task: GenerationTask,
    style: &StyleConfig,
    context: &PromptContext,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(&style.preamble());
    prompt.push_str("\n\nProduct notes:\n");
    prompt.push_str(context.notes);

    if !context.memory.is_empty() {
        prompt.push_str("\n\nEarlier artifacts from this session:\n");
        prompt.push_str(&context.memory.join("\n\n"));
    }

    prompt.push_str("\n\n");
    prompt.push_str(task.instruction());
    prompt
}
