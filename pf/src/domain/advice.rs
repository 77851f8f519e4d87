//! Advisory content produced for a selected node

use serde::{Deserialize, Serialize};

/// Structured guidance for one process step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResult {
    /// Two or three sentences describing the step
    pub summary: String,

    /// Ordered, imperative action items
    pub checklist: Vec<String>,

    /// One practical tip
    #[serde(alias = "tips")]
    pub tip: String,
}

impl GuidanceResult {
    /// Trim checklist items and drop the blank ones
    pub fn without_blank_items(mut self) -> Self {
        self.checklist = self
            .checklist
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        self
    }

    /// A result is usable when it has a summary and a non-empty checklist with no blank items
    pub fn is_complete(&self) -> bool {
        !self.summary.trim().is_empty()
            && !self.checklist.is_empty()
            && self.checklist.iter().all(|item| !item.trim().is_empty())
    }
}

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Speaker name used when a conversation is rendered into a prompt
    pub fn speaker(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Mentor",
        }
    }
}

/// One message in a follow-up conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
