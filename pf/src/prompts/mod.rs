//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for guidance and
//! follow-up answers.
//!
//! Template loading chain:
//! 1. `{prompts.dir}/{name}.pmt` (user override, default `.procflow/prompts`)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{AnswerPromptContext, GuidancePromptContext, PromptLoader};
