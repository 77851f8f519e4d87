//! Process flow data model
//!
//! Phases own an ordered list of root nodes and every node owns its children.
//! There are no parent pointers: the tree is walked top-down, depth first.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Process flow compiled into the binary
const EMBEDDED_PROCESS: &str = include_str!("../../data/process.yml");

/// Errors raised while loading a process flow document
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Duplicate node id '{id}' (first seen in phase '{first_phase}', again in phase '{phase}')")]
    DuplicateId {
        id: String,
        first_phase: String,
        phase: String,
    },

    #[error("Node with label '{label}' in phase '{phase}' has an empty id")]
    EmptyId { label: String, phase: String },

    #[error("Failed to parse process document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Display category of a node
///
/// Purely a rendering tag: selection and guidance treat every kind the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Activity,
    Decision,
    Document,
    Milestone,
    Group,
}

impl NodeKind {
    /// Short marker used by the text views
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Activity => "•",
            Self::Decision => "◇",
            Self::Document => "▤",
            Self::Milestone => "★",
            Self::Group => "▾",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Activity => "activity",
            Self::Decision => "decision",
            Self::Document => "document",
            Self::Milestone => "milestone",
            Self::Group => "group",
        };
        write!(f, "{}", name)
    }
}

/// A selectable step in the process flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique across the whole forest; used as the selection key
    pub id: String,

    pub label: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nested steps in display order
    #[serde(default, rename = "sub-items", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a leaf node
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            description: None,
            children: Vec::new(),
        }
    }

    /// Builder-style helper to attach children
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Display metadata of a phase column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseStyle {
    pub color: String,
    #[serde(rename = "border-color")]
    pub border_color: String,
    #[serde(rename = "text-color")]
    pub text_color: String,
}

/// A phase of the process flow (one column on the dashboard)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub style: PhaseStyle,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// A node located in the tree, together with its owning phase
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub phase: &'a Phase,
    pub node: &'a Node,
    /// 0 for phase roots
    pub depth: usize,
}

impl NodeRef<'_> {
    pub fn phase_title(&self) -> &str {
        &self.phase.title
    }
}

/// The complete, immutable process flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTree {
    pub phases: Vec<Phase>,
}

impl ProcessTree {
    /// Build a tree from phases, validating id uniqueness
    pub fn new(phases: Vec<Phase>) -> Result<Self, ProcessError> {
        let tree = Self { phases };
        tree.validate()?;
        Ok(tree)
    }

    /// Load the process flow compiled into the binary
    pub fn embedded() -> Result<Self, ProcessError> {
        debug!("ProcessTree::embedded: called");
        Self::from_yaml(EMBEDDED_PROCESS)
    }

    /// Parse and validate a YAML process document
    pub fn from_yaml(text: &str) -> Result<Self, ProcessError> {
        debug!(len = text.len(), "ProcessTree::from_yaml: called");
        let tree: Self = serde_yaml::from_str(text)?;
        tree.validate()?;
        debug!(phases = tree.phases.len(), nodes = tree.len(), "ProcessTree::from_yaml: loaded");
        Ok(tree)
    }

    /// Check that every node id is non-empty and unique across all phases
    pub fn validate(&self) -> Result<(), ProcessError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for entry in self.walk() {
            let id = entry.node.id.as_str();
            if id.trim().is_empty() {
                return Err(ProcessError::EmptyId {
                    label: entry.node.label.clone(),
                    phase: entry.phase.title.clone(),
                });
            }
            if let Some(first_phase) = seen.insert(id, entry.phase.title.as_str()) {
                return Err(ProcessError::DuplicateId {
                    id: id.to_string(),
                    first_phase: first_phase.to_string(),
                    phase: entry.phase.title.clone(),
                });
            }
        }

        Ok(())
    }

    /// Depth-first, pre-order traversal of every node in display order
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.phases)
    }

    /// Find a node by id anywhere in the forest
    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        debug!(%id, "ProcessTree::find: called");
        self.walk().find(|entry| entry.node.id == id)
    }

    /// Total number of nodes (all depths)
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(|p| p.nodes.is_empty())
    }
}

/// Iterator returned by [`ProcessTree::walk`]
pub struct Walk<'a> {
    phases: std::slice::Iter<'a, Phase>,
    current: Option<&'a Phase>,
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Walk<'a> {
    fn new(phases: &'a [Phase]) -> Self {
        Self {
            phases: phases.iter(),
            current: None,
            stack: Vec::new(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((node, depth)) = self.stack.pop()
                && let Some(phase) = self.current
            {
                // Push in reverse so the first child is visited next
                for child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some(NodeRef { phase, node, depth });
            }

            let phase = self.phases.next()?;
            self.current = Some(phase);
            for root in phase.nodes.iter().rev() {
                self.stack.push((root, 0));
            }
        }
    }
}
