//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use procflow::config::GuidanceConfig;
use procflow::controller::Dashboard;
use procflow::domain::ProcessTree;
use procflow::guidance::GuidanceProvider;
use procflow::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// What the scripted backend does for one call
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Error,
    After(Duration, Box<Script>),
}

/// Backend that plays back a fixed script, one entry per call
pub struct ScriptedClient {
    script: Vec<Script>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let mut step = self
            .script
            .get(idx)
            .cloned()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))?;
        loop {
            match step {
                Script::Reply(text) => return Ok(CompletionResponse::text(text)),
                Script::Error => {
                    return Err(LlmError::ApiError {
                        status: 500,
                        message: "scripted failure".to_string(),
                    });
                }
                Script::After(delay, next) => {
                    tokio::time::sleep(delay).await;
                    step = *next;
                }
            }
        }
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

pub fn guidance_json(summary: &str) -> String {
    serde_json::json!({
        "summary": summary,
        "checklist": ["First", "Second", "Third"],
        "tip": "A tip."
    })
    .to_string()
}

pub fn tree() -> Arc<ProcessTree> {
    Arc::new(ProcessTree::embedded().expect("embedded process flow"))
}

/// Dashboard with no backend and the default 800ms simulated delay
pub fn offline_dashboard() -> Dashboard {
    Dashboard::new(tree(), Arc::new(GuidanceProvider::offline(GuidanceConfig::default())))
}

pub fn online_dashboard(client: Arc<ScriptedClient>) -> Dashboard {
    Dashboard::new(
        tree(),
        Arc::new(GuidanceProvider::with_backend(client, GuidanceConfig::default())),
    )
}
