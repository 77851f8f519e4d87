//! Selection Controller
//!
//! Tracks which node is active, whether the side panel is open, and the
//! guidance shown for it. Guidance requests are identified by a generation
//! number so only the response for the latest selection is ever applied.

use serde::Serialize;
use tracing::debug;

use crate::domain::{GuidanceResult, Node};

/// What the side panel shows for the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    /// Selected node; `None` until the first selection
    pub node: Option<Node>,

    /// Title of the phase owning `node`
    pub phase_title: Option<String>,

    pub panel_open: bool,

    /// Guidance for `node`; `None` while loading or after an unexpected failure
    pub guidance: Option<GuidanceResult>,

    /// A guidance request for `node` is in flight
    pub loading: bool,
}

/// Coarse panel state derived from [`SelectionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionStatus {
    /// No node selected, or the panel is closed
    Idle,
    /// Panel open, guidance request in flight
    Loading,
    /// Panel open, request finished
    Ready,
}

impl SelectionState {
    pub fn status(&self) -> SelectionStatus {
        if self.node.is_none() || !self.panel_open {
            SelectionStatus::Idle
        } else if self.loading {
            SelectionStatus::Loading
        } else {
            SelectionStatus::Ready
        }
    }

    /// Label of the selected node, if any
    pub fn node_label(&self) -> Option<&str> {
        self.node.as_ref().map(|n| n.label.as_str())
    }
}

/// A guidance request the runtime must execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidanceTicket {
    /// Selection this request belongs to
    pub generation: u64,
    pub node_label: String,
    pub phase_title: String,
}

/// Owns [`SelectionState`]; the only writer of it
#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
    generation: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn status(&self) -> SelectionStatus {
        self.state.status()
    }

    /// Generation of the latest selection (0 before any selection)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Select a node from any state and start loading its guidance
    ///
    /// Re-selecting the current node starts a fresh request too.
    pub fn select_node(&mut self, node: &Node, phase_title: &str) -> GuidanceTicket {
        self.generation += 1;
        debug!(node_id = %node.id, %phase_title, generation = self.generation, "select_node: called");

        self.state = SelectionState {
            node: Some(node.clone()),
            phase_title: Some(phase_title.to_string()),
            panel_open: true,
            guidance: None,
            loading: true,
        };

        GuidanceTicket {
            generation: self.generation,
            node_label: node.label.clone(),
            phase_title: phase_title.to_string(),
        }
    }

    /// Apply a finished guidance request
    ///
    /// Returns `false` (and changes nothing) when the request belongs to an
    /// earlier selection. `None` marks a request that died unexpectedly; the
    /// panel still leaves the loading state.
    pub fn resolve_guidance(&mut self, generation: u64, result: Option<GuidanceResult>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "resolve_guidance: discarding stale result");
            return false;
        }
        debug!(generation, has_result = result.is_some(), "resolve_guidance: applying");

        self.state.guidance = result;
        self.state.loading = false;
        true
    }

    /// Close the panel, keeping the selection and its guidance
    pub fn close_panel(&mut self) {
        debug!("close_panel: called");
        self.state.panel_open = false;
    }
}
