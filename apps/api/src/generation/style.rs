//! Style configuration — persona and verbosity settings for generation prompts.
//!
//! The preamble built here is the only place style reaches the model: it names
//! the persona and the verbosity level literally so that identical style input
//! always yields an identical prompt fragment.

use serde::{Deserialize, Serialize};

/// Product-management persona the model is asked to write as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmRole {
    #[default]
    SeniorProductManager,
    StartupFounder,
    AgileCoach,
    TechnicalProductManager,
}

impl PmRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            PmRole::SeniorProductManager => "Senior Product Manager",
            PmRole::StartupFounder => "Startup Founder",
            PmRole::AgileCoach => "Agile Coach",
            PmRole::TechnicalProductManager => "Technical Product Manager",
        }
    }
}

/// Requested verbosity of the generated artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Concise,
    Detailed,
}

impl Tone {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tone::Concise => "concise",
            Tone::Detailed => "detailed",
        }
    }
}

/// Immutable (persona, tone) pair supplied once per generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub role: PmRole,
    #[serde(default)]
    pub tone: Tone,
}

impl StyleConfig {
    /// Renders the role/tone preamble for generation-mode prompts.
    pub fn preamble(&self) -> String {
        format!(
            "You are acting as a {}. Respond in a {}, well-structured style.",
            self.role.display_name(),
            self.tone.display_name()
        )
    }
}
