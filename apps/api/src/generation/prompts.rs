// All LLM prompt constants for the Generation module.
// Task instruction fragments are data, not code paths — the builder selects
// one per task and appends it unchanged.

/// System prompt for artifact generation — plain markdown output, no wrappers.
pub const GENERATION_SYSTEM: &str =
    "You are an experienced product manager turning raw product notes into \
    polished written deliverables. \
    Respond with the deliverable text only, formatted as markdown. \
    Do NOT wrap the answer in code fences. \
    Do NOT include preambles, apologies, or commentary about the request.";

/// Instruction fragment appended for executive summaries.
pub const SUMMARY_INSTRUCTION: &str = "Create an executive summary.";

/// Instruction fragment appended for action-item extraction.
pub const ACTION_ITEMS_INSTRUCTION: &str =
    "Extract clear/prioritized action items (with priority).";

/// Instruction fragment appended for PRDs.
pub const PRD_INSTRUCTION: &str = "Create a structured Product Requirements Document \
    covering Problem, Target Users, Goals, Success Metrics, Features, Risks.";

/// Instruction fragment appended for user stories.
pub const USER_STORIES_INSTRUCTION: &str = "Generate Agile user stories in the form \
    'As a / I want / So that', including acceptance criteria.";

/// Framing line that opens every refinement-mode prompt.
/// Refinement carries no task-specific boilerplate — the caller's instruction
/// alone determines the requested transformation.
pub const REFINEMENT_FRAMING: &str =
    "You are an expert product manager revising one of your own deliverables.";

/// System prompt for the advisory suggestions call — enforces the
/// pipe-delimited table shape the suggestion parser expects.
pub const ADVISORY_SYSTEM: &str =
    "You are a pragmatic product advisor reviewing a set of planning artifacts. \
    You MUST respond with a pipe-delimited table only, one suggestion per line, \
    in the exact form: Action | Reason | Confidence. \
    Confidence MUST be one of High, Medium, Low. \
    Do NOT include markdown formatting, numbering, or any text outside the table.";

/// Advisory prompt template. Replace `{artifacts}` before sending.
pub const ADVISORY_PROMPT_TEMPLATE: &str = "\
Review the product artifacts below and suggest the next concrete moves for the team.

Return at most 3 suggestions, one per line, each formatted exactly as:
Action | Reason | Confidence

ARTIFACTS:
{artifacts}";
