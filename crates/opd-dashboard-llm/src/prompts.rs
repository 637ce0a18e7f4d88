//! Prompts for OPD summarization.
//!
//! The model only summarizes and observes patterns. The rules block is fixed
//! and sent with every request.

use opd_dashboard_core::models::RecordRow;
use serde_json::Value;

/// System message sent ahead of every OPD prompt.
pub const SYSTEM_INSTRUCTION: &str =
    "You are assisting an Ayurvedic doctor for OPD summary and analysis.";

pub const ROLE_STATEMENT: &str = "You are assisting an Ayurvedic doctor.";

/// Guard rails, in the order they appear in the prompt.
pub const STRICT_RULES: [&str; 5] = [
    "Do NOT diagnose",
    "Do NOT suggest medicines",
    "Do NOT change treatment",
    "Only summarize and observe patterns",
    "Use simple, non-alarming language",
];

/// Task items after the first one, which carries the user instruction.
pub const FOLLOW_ON_TASKS: [&str; 6] = [
    "List most common complaints",
    "List common diagnoses",
    "Mention prakriti trends",
    "Mention follow-up workload",
    "How Next week will be?",
    "How I can be Prepared?",
];

/// Build the user prompt from the full, unfiltered record set and the
/// doctor's instruction.
///
/// Records are embedded as a pretty-printed JSON array of objects keyed by
/// column name, in header order.
pub fn build_prompt(records: &[RecordRow], instruction: &str) -> String {
    let data = Value::Array(records.iter().map(RecordRow::to_json).collect());

    let rules: String = STRICT_RULES
        .iter()
        .map(|rule| format!("- {}\n", rule))
        .collect();

    let tasks: String = FOLLOW_ON_TASKS
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}\n", i + 2, task))
        .collect();

    format!(
        r#"{role}

STRICT RULES:
{rules}
OPD DATA:
{data:#}

TASK:
1. Give a short OPD summary + {instruction}
{tasks}"#,
        role = ROLE_STATEMENT,
        rules = rules,
        data = data,
        instruction = instruction,
        tasks = tasks,
    )
}
