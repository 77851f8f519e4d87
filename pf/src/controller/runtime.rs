//! Async runtime around the [`Store`]
//!
//! Effects run as tokio tasks; each finished task sends exactly one
//! [`Action`] back over a channel. Callers pull those completions with
//! [`Dashboard::next_update`] or [`Dashboard::settle`], so every state
//! change still goes through [`Store::dispatch`] on the caller's task.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Action, Effect, SelectionStatus, Store};
use crate::domain::{Node, ProcessTree};
use crate::guidance::GuidanceProvider;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Unknown node id: {0}")]
    UnknownNode(String),
}

/// Process tree, guidance provider, and the state they drive
pub struct Dashboard {
    store: Store,
    tree: Arc<ProcessTree>,
    provider: Arc<GuidanceProvider>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    /// Spawned effects whose completion has not been applied yet
    pending: usize,
}

impl Dashboard {
    pub fn new(tree: Arc<ProcessTree>, provider: Arc<GuidanceProvider>) -> Self {
        debug!(nodes = tree.len(), online = provider.is_online(), "Dashboard::new: called");
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: Store::new(),
            tree,
            provider,
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn tree(&self) -> &ProcessTree {
        &self.tree
    }

    pub fn state(&self) -> &Store {
        &self.store
    }

    pub fn status(&self) -> SelectionStatus {
        self.store.status()
    }

    pub fn is_online(&self) -> bool {
        self.provider.is_online()
    }

    /// Number of requests still in flight
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Select a node by id
    pub fn select(&mut self, id: &str) -> Result<(), DashboardError> {
        debug!(%id, "Dashboard::select: called");
        let (node, phase_title) = {
            let found = self
                .tree
                .find(id)
                .ok_or_else(|| DashboardError::UnknownNode(id.to_string()))?;
            (found.node.clone(), found.phase_title().to_string())
        };
        self.select_node(node, phase_title);
        Ok(())
    }

    /// Select a node directly
    pub fn select_node(&mut self, node: Node, phase_title: impl Into<String>) {
        self.dispatch(Action::SelectNode {
            node,
            phase_title: phase_title.into(),
        });
    }

    pub fn close_panel(&mut self) {
        self.dispatch(Action::ClosePanel);
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SetDraft(text.into()));
    }

    /// Send a chat question; returns `false` if it was not accepted
    pub fn submit(&mut self, question: impl Into<String>) -> bool {
        self.dispatch(Action::SubmitQuestion(question.into()))
    }

    /// Apply an action and start whatever work it asks for
    ///
    /// Returns whether an effect was started.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match self.store.dispatch(action) {
            Some(effect) => {
                self.spawn(effect);
                true
            }
            None => false,
        }
    }

    fn spawn(&mut self, effect: Effect) {
        debug!(?effect, pending = self.pending, "Dashboard::spawn: called");
        self.pending += 1;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();

        match effect {
            Effect::FetchGuidance(ticket) => {
                let generation = ticket.generation;
                tokio::spawn(async move {
                    let task = tokio::spawn(async move {
                        provider.fetch_guidance(&ticket.node_label, &ticket.phase_title).await
                    });
                    // A panicked or cancelled fetch still ends the loading state
                    let result = match task.await {
                        Ok(result) => Some(result),
                        Err(e) => {
                            warn!(generation, error = %e, "Guidance task failed");
                            None
                        }
                    };
                    if tx.send(Action::GuidanceResolved { generation, result }).is_err() {
                        debug!(generation, "Dashboard dropped before guidance resolved");
                    }
                });
            }
            Effect::AskQuestion(ticket) => {
                let epoch = ticket.epoch;
                tokio::spawn(async move {
                    let task = tokio::spawn(async move {
                        provider
                            .answer_question(
                                &ticket.question,
                                &ticket.node_label,
                                &ticket.phase_title,
                                ticket.guidance.as_ref(),
                                &ticket.history,
                            )
                            .await
                    });
                    let action = match task.await {
                        Ok(text) => Action::AnswerResolved { epoch, text },
                        Err(e) => {
                            warn!(epoch, error = %e, "Answer task failed");
                            Action::AnswerFailed { epoch }
                        }
                    };
                    if tx.send(action).is_err() {
                        debug!(epoch, "Dashboard dropped before answer resolved");
                    }
                });
            }
        }
    }

    /// Wait for the next request to finish and apply it
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_update(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(action) => {
                self.pending -= 1;
                debug!(?action, pending = self.pending, "Dashboard::next_update: applying");
                self.dispatch(action);
                true
            }
            None => {
                self.pending = 0;
                false
            }
        }
    }

    /// Wait until every in-flight request has finished
    pub async fn settle(&mut self) {
        debug!(pending = self.pending, "Dashboard::settle: called");
        while self.next_update().await {}
    }
}
