//! Selection and chat state, driven by actions
//!
//! [`Store`] is a synchronous reducer: every state change is an [`Action`]
//! applied by [`Store::dispatch`], which may hand back an [`Effect`] for
//! the async runtime to execute. Effect results come back as actions, so
//! the store remains the single writer of selection and chat state.

mod chat;
mod runtime;
mod selection;

pub use chat::{ANSWER_FAILED, ChatSession, QuestionTicket};
pub use runtime::{Dashboard, DashboardError};
pub use selection::{GuidanceTicket, SelectionController, SelectionState, SelectionStatus};

use tracing::debug;

use crate::domain::{GuidanceResult, Node};

/// Every input that can change dashboard state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// User picked a node
    SelectNode { node: Node, phase_title: String },
    /// User dismissed the side panel
    ClosePanel,
    /// User edited the chat input
    SetDraft(String),
    /// User sent a chat question
    SubmitQuestion(String),
    /// A guidance request finished; `None` if it died unexpectedly
    GuidanceResolved {
        generation: u64,
        result: Option<GuidanceResult>,
    },
    /// An answer arrived
    AnswerResolved { epoch: u64, text: String },
    /// An answer request died unexpectedly
    AnswerFailed { epoch: u64 },
}

/// Async work requested by a dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchGuidance(GuidanceTicket),
    AskQuestion(QuestionTicket),
}

/// Selection Controller plus Chat Session behind one dispatch function
#[derive(Debug, Default)]
pub struct Store {
    selection: SelectionController,
    chat: ChatSession,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn status(&self) -> SelectionStatus {
        self.selection.status()
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Apply an action, returning any async work it starts
    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        debug!(?action, "Store::dispatch: called");
        match action {
            Action::SelectNode { node, phase_title } => {
                let ticket = self.selection.select_node(&node, &phase_title);
                self.chat.reset(&node.id);
                Some(Effect::FetchGuidance(ticket))
            }
            Action::ClosePanel => {
                self.selection.close_panel();
                None
            }
            Action::SetDraft(text) => {
                self.chat.set_draft(text);
                None
            }
            Action::SubmitQuestion(question) => self
                .chat
                .submit(&question, self.selection.state())
                .map(Effect::AskQuestion),
            Action::GuidanceResolved { generation, result } => {
                self.selection.resolve_guidance(generation, result);
                None
            }
            Action::AnswerResolved { epoch, text } => {
                self.chat.resolve_answer(epoch, text);
                None
            }
            Action::AnswerFailed { epoch } => {
                self.chat.fail_answer(epoch);
                None
            }
        }
    }
}
