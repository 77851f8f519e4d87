//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System instruction for structured guidance
pub const GUIDANCE_SYSTEM: &str = include_str!("../../prompts/guidance-system.pmt");

/// User prompt for structured guidance
pub const GUIDANCE: &str = include_str!("../../prompts/guidance.pmt");

/// System instruction for follow-up answers
pub const ANSWER_SYSTEM: &str = include_str!("../../prompts/answer-system.pmt");

/// User prompt for follow-up answers (transcript + new question)
pub const ANSWER: &str = include_str!("../../prompts/answer.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "guidance-system" => Some(GUIDANCE_SYSTEM),
        "guidance" => Some(GUIDANCE),
        "answer-system" => Some(ANSWER_SYSTEM),
        "answer" => Some(ANSWER),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
