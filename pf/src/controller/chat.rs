//! Chat Session
//!
//! Follow-up conversation about the selected node. The log belongs to one
//! node at a time and is cleared, not archived, whenever the selection
//! changes. Each reset starts a new epoch; answers carry the epoch they
//! were asked in and are dropped if the session has moved on.

use tracing::debug;

use super::selection::SelectionState;
use crate::domain::{ChatTurn, GuidanceResult};

/// Assistant turn appended when an answer could not be produced at all
pub const ANSWER_FAILED: &str = "Sorry, I encountered an error. Please try again.";

/// A question the runtime must answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTicket {
    /// Session epoch the question was asked in
    pub epoch: u64,
    pub question: String,
    pub node_label: String,
    pub phase_title: String,
    /// Guidance shown when the question was asked
    pub guidance: Option<GuidanceResult>,
    /// Conversation before this question
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    node_id: Option<String>,
    turns: Vec<ChatTurn>,
    draft: String,
    loading: bool,
    epoch: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node the conversation is about
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Unsent input text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// An answer is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start an empty conversation about `node_id`
    pub fn reset(&mut self, node_id: &str) {
        self.epoch += 1;
        debug!(%node_id, epoch = self.epoch, dropped_turns = self.turns.len(), "ChatSession::reset: called");
        self.node_id = Some(node_id.to_string());
        self.turns.clear();
        self.draft.clear();
        self.loading = false;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Append the user's question and hand back the request to answer it
    ///
    /// Nothing happens for blank questions, with no node selected, or while
    /// the previous answer is still pending.
    pub fn submit(&mut self, question: &str, selection: &SelectionState) -> Option<QuestionTicket> {
        debug!(question_len = question.len(), "ChatSession::submit: called");
        if question.trim().is_empty() {
            debug!("ChatSession::submit: blank question ignored");
            return None;
        }
        if self.loading {
            debug!("ChatSession::submit: answer already in flight");
            return None;
        }
        let (Some(node), Some(phase_title)) = (&selection.node, &selection.phase_title) else {
            debug!("ChatSession::submit: no node selected");
            return None;
        };

        let history = self.turns.clone();
        self.turns.push(ChatTurn::user(question));
        self.draft.clear();
        self.loading = true;

        Some(QuestionTicket {
            epoch: self.epoch,
            question: question.to_string(),
            node_label: node.label.clone(),
            phase_title: phase_title.clone(),
            guidance: selection.guidance.clone(),
            history,
        })
    }

    /// Append the answer for a question asked in `epoch`
    pub fn resolve_answer(&mut self, epoch: u64, text: impl Into<String>) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "ChatSession::resolve_answer: discarding stale answer");
            return false;
        }
        self.turns.push(ChatTurn::assistant(text));
        self.loading = false;
        true
    }

    /// Record that the answer for `epoch` could not be produced
    pub fn fail_answer(&mut self, epoch: u64) -> bool {
        debug!(epoch, "ChatSession::fail_answer: called");
        self.resolve_answer(epoch, ANSWER_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::selection::SelectionController;
    use crate::domain::{ChatRole, Node, NodeKind};

    fn selected(label: &str) -> SelectionState {
        let mut controller = SelectionController::new();
        controller.select_node(&Node::new("n", label, NodeKind::Document), "Initiation");
        controller.state().clone()
    }

    #[test]
    fn test_submit_appends_user_turn_first() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        let selection = selected("Project Charter");

        let ticket = chat.submit("What's next?", &selection).unwrap();
        assert_eq!(ticket.node_label, "Project Charter");
        assert_eq!(ticket.phase_title, "Initiation");
        assert!(ticket.history.is_empty());
        assert_eq!(chat.turns(), &[ChatTurn::user("What's next?")]);
        assert!(chat.is_loading());

        assert!(chat.resolve_answer(ticket.epoch, "Draft it."));
        assert_eq!(chat.turns()[1], ChatTurn::assistant("Draft it."));
        assert!(!chat.is_loading());
    }

    #[test]
    fn test_blank_question_is_ignored() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        let selection = selected("Project Charter");

        for question in ["", "   ", "\n\t"] {
            assert!(chat.submit(question, &selection).is_none());
        }
        assert!(chat.turns().is_empty());
        assert!(!chat.is_loading());
    }

    #[test]
    fn test_submit_without_selection_is_ignored() {
        let mut chat = ChatSession::new();
        assert!(chat.submit("Hello?", &SelectionState::default()).is_none());
        assert!(chat.turns().is_empty());
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        let selection = selected("Project Charter");

        chat.submit("First?", &selection).unwrap();
        assert!(chat.submit("Second?", &selection).is_none());
        assert_eq!(chat.turns().len(), 1);
    }

    #[test]
    fn test_history_excludes_new_question() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        let selection = selected("Project Charter");

        let first = chat.submit("One?", &selection).unwrap();
        chat.resolve_answer(first.epoch, "Yes.");
        let second = chat.submit("Two?", &selection).unwrap();

        assert_eq!(second.history, vec![ChatTurn::user("One?"), ChatTurn::assistant("Yes.")]);
    }

    #[test]
    fn test_reset_clears_log_draft_and_loading() {
        let mut chat = ChatSession::new();
        chat.reset("a");
        let selection = selected("A");
        let ticket = chat.submit("Q?", &selection).unwrap();
        chat.set_draft("half typed");

        chat.reset("a");
        assert!(chat.turns().is_empty());
        assert_eq!(chat.draft(), "");
        assert!(!chat.is_loading());
        assert_eq!(chat.node_id(), Some("a"));

        // The answer to the old question is dropped
        assert!(!chat.resolve_answer(ticket.epoch, "late"));
        assert!(chat.turns().is_empty());
    }

    #[test]
    fn test_fail_answer_appends_apology() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        let ticket = chat.submit("Q?", &selected("N")).unwrap();

        assert!(chat.fail_answer(ticket.epoch));
        let last = chat.turns().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, ANSWER_FAILED);
        assert!(!chat.is_loading());
    }

    #[test]
    fn test_submit_clears_draft() {
        let mut chat = ChatSession::new();
        chat.reset("n");
        chat.set_draft("Q?");
        chat.submit("Q?", &selected("N")).unwrap();
        assert_eq!(chat.draft(), "");
    }
}
