//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::domain::ChatTurn;

/// Context for the `guidance` and `guidance-system` templates
#[derive(Debug, Clone, Serialize)]
pub struct GuidancePromptContext {
    pub node_label: String,
    pub phase_title: String,
}

impl GuidancePromptContext {
    pub fn new(node_label: &str, phase_title: &str) -> Self {
        debug!(%node_label, %phase_title, "GuidancePromptContext::new: called");
        Self {
            node_label: node_label.to_string(),
            phase_title: phase_title.to_string(),
        }
    }
}

/// Context for the `answer` and `answer-system` templates
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPromptContext {
    pub node_label: String,
    pub phase_title: String,
    /// Summary of the guidance already shown, if any
    pub guidance_summary: Option<String>,
    /// Prior turns rendered as `Speaker: text` lines
    pub transcript: String,
    /// The new question
    pub question: String,
}

impl AnswerPromptContext {
    pub fn new(
        node_label: &str,
        phase_title: &str,
        guidance_summary: Option<&str>,
        history: &[ChatTurn],
        question: &str,
    ) -> Self {
        debug!(%node_label, %phase_title, history_len = history.len(), "AnswerPromptContext::new: called");
        Self {
            node_label: node_label.to_string(),
            phase_title: phase_title.to_string(),
            guidance_summary: guidance_summary
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            transcript: render_transcript(history),
            question: question.to_string(),
        }
    }
}

/// Render chat turns as one `Speaker: text` line each
pub fn render_transcript(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}\n", turn.role.speaker(), turn.text))
        .collect()
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.procflow/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` for overrides before the embedded templates
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let user_dir_exists = dir.is_dir();
        debug!(?dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            user_dir: user_dir_exists.then(|| dir.to_path_buf()),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{dir}/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        let rendered = self
            .hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))?;
        Ok(rendered.trim_end().to_string())
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
