//! Hosted LLM summaries of OPD data.
//!
//! Builds the fixed summarization prompt around the full record set and sends
//! it to an OpenAI-compatible chat-completions endpoint.

pub mod client;
pub mod playground;
pub mod prompts;

pub use client::*;
pub use playground::*;
pub use prompts::*;
