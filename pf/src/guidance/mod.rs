//! Guidance Provider
//!
//! Produces structured guidance for a process step and answers follow-up
//! questions about it. Every call resolves: backend failures, empty output
//! and malformed JSON all degrade to the deterministic offline generator.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

mod offline;

pub use offline::{CONNECTION_TROUBLE, EMPTY_ANSWER, OFFLINE_TIP, offline_answer, offline_guidance};

use crate::config::{Config, GuidanceConfig};
use crate::domain::{ChatTurn, GuidanceResult};
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, create_client};
use crate::prompts::{AnswerPromptContext, GuidancePromptContext, PromptLoader};

/// Default response budget when none is configured
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Dual-path guidance source: AI backend when configured, offline generator otherwise
pub struct GuidanceProvider {
    backend: Option<Arc<dyn LlmClient>>,
    prompts: PromptLoader,
    config: GuidanceConfig,
    max_tokens: u32,
}

impl GuidanceProvider {
    /// Provider with no backend; every call uses the offline generator
    pub fn offline(config: GuidanceConfig) -> Self {
        debug!(offline_delay_ms = config.offline_delay_ms, "GuidanceProvider::offline: called");
        Self {
            backend: None,
            prompts: PromptLoader::embedded_only(),
            config,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Provider backed by the given client
    pub fn with_backend(client: Arc<dyn LlmClient>, config: GuidanceConfig) -> Self {
        debug!(provider = %client.provider(), "GuidanceProvider::with_backend: called");
        Self {
            backend: Some(client),
            prompts: PromptLoader::embedded_only(),
            config,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build from configuration
    ///
    /// A backend is only created when the credential environment variable is
    /// set; a client that fails to build leaves the provider offline.
    pub fn from_config(config: &Config) -> Self {
        debug!(provider = %config.llm.provider, "GuidanceProvider::from_config: called");
        let provider = if config.llm.has_credentials() {
            match create_client(&config.llm) {
                Ok(client) => Self::with_backend(client, config.guidance.clone()),
                Err(e) => {
                    warn!(error = %e, "Failed to create LLM client, using offline guidance");
                    Self::offline(config.guidance.clone())
                }
            }
        } else {
            info!(env = %config.llm.api_key_env, "No API key set, using offline guidance");
            Self::offline(config.guidance.clone())
        };

        provider
            .with_prompts(PromptLoader::new(&config.prompts.dir))
            .with_max_tokens(config.llm.max_tokens)
    }

    pub fn with_prompts(mut self, prompts: PromptLoader) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether a backend is configured
    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    /// Structured guidance for a node; never fails
    pub async fn fetch_guidance(&self, node_label: &str, phase_title: &str) -> GuidanceResult {
        debug!(%node_label, %phase_title, "fetch_guidance: called");
        let Some(backend) = &self.backend else {
            self.offline_pause().await;
            return offline_guidance(node_label, phase_title);
        };

        match self.request_guidance(backend.as_ref(), node_label, phase_title).await {
            Ok(result) => {
                debug!(items = result.checklist.len(), "fetch_guidance: backend guidance accepted");
                result
            }
            Err(reason) => {
                warn!(%node_label, %reason, "Guidance request failed, using offline guidance");
                offline_guidance(node_label, phase_title)
            }
        }
    }

    async fn request_guidance(
        &self,
        backend: &dyn LlmClient,
        node_label: &str,
        phase_title: &str,
    ) -> Result<GuidanceResult, String> {
        let ctx = GuidancePromptContext::new(node_label, phase_title);
        let system = self.prompts.render("guidance-system", &ctx).map_err(|e| e.to_string())?;
        let prompt = self.prompts.render("guidance", &ctx).map_err(|e| e.to_string())?;

        let request = CompletionRequest::text(system, prompt, self.max_tokens)
            .with_temperature(self.config.guidance_temperature)
            .with_schema(guidance_schema());

        let response = backend.complete(request).await.map_err(|e| {
            log_backend_error("guidance", &e);
            e.to_string()
        })?;
        log_response("guidance", &response);
        if response.stop_reason == StopReason::Blocked {
            return Err("response blocked by the provider".to_string());
        }
        let text = response
            .content
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "empty response".to_string())?;

        let result: GuidanceResult =
            serde_json::from_str(extract_json(&text)).map_err(|e| format!("malformed guidance JSON: {}", e))?;
        let result = result.without_blank_items();
        if !result.is_complete() {
            return Err("guidance missing summary or checklist".to_string());
        }
        Ok(result)
    }

    /// Answer a follow-up question about a node; never fails
    ///
    /// `history` is the conversation so far, excluding `question`.
    pub async fn answer_question(
        &self,
        question: &str,
        node_label: &str,
        phase_title: &str,
        prior_guidance: Option<&GuidanceResult>,
        history: &[ChatTurn],
    ) -> String {
        debug!(%node_label, history_len = history.len(), "answer_question: called");
        let Some(backend) = &self.backend else {
            self.offline_pause().await;
            return offline_answer(question, node_label);
        };

        let ctx = AnswerPromptContext::new(
            node_label,
            phase_title,
            prior_guidance.map(|g| g.summary.as_str()),
            history,
            question,
        );
        let rendered = self
            .prompts
            .render("answer-system", &ctx)
            .and_then(|system| Ok((system, self.prompts.render("answer", &ctx)?)));
        let (system, prompt) = match rendered {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "Failed to render answer prompt");
                return CONNECTION_TROUBLE.to_string();
            }
        };

        let request =
            CompletionRequest::text(system, prompt, self.max_tokens).with_temperature(self.config.answer_temperature);

        match backend.complete(request).await {
            Ok(response) => {
                log_response("answer", &response);
                if response.stop_reason == StopReason::Blocked {
                    warn!(%node_label, "Answer blocked by the provider");
                    return EMPTY_ANSWER.to_string();
                }
                match response.content.map(|t| t.trim().to_string()) {
                    Some(text) if !text.is_empty() => text,
                    _ => {
                        debug!("answer_question: backend returned no content");
                        EMPTY_ANSWER.to_string()
                    }
                }
            }
            Err(e) => {
                log_backend_error("answer", &e);
                CONNECTION_TROUBLE.to_string()
            }
        }
    }

    async fn offline_pause(&self) {
        let delay = self.config.offline_delay();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
    }
}

fn log_response(call: &str, response: &CompletionResponse) {
    debug!(
        call,
        stop_reason = ?response.stop_reason,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Backend call finished"
    );
}

fn log_backend_error(call: &str, e: &LlmError) {
    if e.is_rate_limit() {
        warn!(call, retry_after = ?e.retry_after(), "Backend rate limited, not retrying");
    } else if e.is_config() {
        warn!(call, error = %e, "Backend is misconfigured");
    } else {
        warn!(call, error = %e, "Backend request failed");
    }
}

/// JSON Schema for [`GuidanceResult`]
pub fn guidance_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A 2-3 sentence explanation of the activity."
            },
            "checklist": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of 3-5 actionable steps or verification points."
            },
            "tip": {
                "type": "string",
                "description": "One valuable pro-tip or common pitfall to avoid."
            }
        },
        "required": ["summary", "checklist", "tip"],
        "additionalProperties": false
    })
}

/// Strip a surrounding markdown code fence, if any
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. "json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
