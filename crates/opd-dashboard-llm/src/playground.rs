//! The "Generate Response" action of the prompt box.

use opd_dashboard_core::models::RecordRow;

use crate::client::{InferenceClient, InferenceResult};
use crate::prompts::build_prompt;

pub const EMPTY_PROMPT_WARNING: &str = "Please enter a prompt";

/// What the prompt box shows after "Generate Response".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Non-fatal; no request was made
    Warning(&'static str),
    Response(String),
}

/// Run one generation over the full record set.
///
/// A blank instruction never reaches the client.
pub fn generate_response(
    client: &dyn InferenceClient,
    records: &[RecordRow],
    instruction: &str,
) -> InferenceResult<GenerateOutcome> {
    if instruction.trim().is_empty() {
        tracing::warn!("Generate requested with an empty prompt");
        return Ok(GenerateOutcome::Warning(EMPTY_PROMPT_WARNING));
    }

    let prompt = build_prompt(records, instruction);
    let text = client.generate(&prompt)?;
    Ok(GenerateOutcome::Response(text))
}
