//! Plain-text rendering of the process flow and the side panel
//!
//! Output is uncoloured so it can be asserted on and piped; the REPL adds
//! colour around it.

use std::fmt::Write;

use crate::controller::{ChatSession, SelectionStatus, Store};
use crate::domain::{GuidanceResult, Node, ProcessTree};

const INDENT: &str = "  ";

/// Every phase with its nodes, nested by depth
///
/// ```text
/// == Initiation ==
///   ▤ Project Charter [project-charter]
/// ```
pub fn render_tree(tree: &ProcessTree) -> String {
    let mut out = String::new();
    for (i, phase) in tree.phases.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "== {} ==", phase.title);
        for node in &phase.nodes {
            render_node(&mut out, node, 1);
        }
    }
    out
}

fn render_node(out: &mut String, node: &Node, depth: usize) {
    let _ = writeln!(
        out,
        "{}{} {} [{}]",
        INDENT.repeat(depth),
        node.kind.marker(),
        node.label,
        node.id
    );
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

/// The side panel for the current selection
pub fn render_panel(store: &Store) -> String {
    let selection = store.selection();
    let Some(node) = &selection.node else {
        return "No step selected.\n".to_string();
    };
    let phase = selection.phase_title.as_deref().unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", node.label, phase);
    if let Some(description) = &node.description {
        let _ = writeln!(out, "{}", description);
    }

    match store.status() {
        SelectionStatus::Idle => {
            out.push_str("Panel closed.\n");
            return out;
        }
        SelectionStatus::Loading => {
            out.push_str("\nLoading guidance...\n");
        }
        SelectionStatus::Ready => match &selection.guidance {
            Some(guidance) => {
                out.push('\n');
                out.push_str(&render_guidance(guidance));
            }
            None => out.push_str("\nGuidance is unavailable. Select the step again to retry.\n"),
        },
    }

    let chat = render_chat(store.chat());
    if !chat.is_empty() {
        out.push('\n');
        out.push_str(&chat);
    }
    out
}

/// Summary, numbered checklist and tip
pub fn render_guidance(guidance: &GuidanceResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary:\n{}{}", INDENT, guidance.summary);
    out.push_str("\nChecklist:\n");
    for (i, item) in guidance.checklist.iter().enumerate() {
        let _ = writeln!(out, "{}{}. {}", INDENT, i + 1, item);
    }
    if !guidance.tip.trim().is_empty() {
        let _ = writeln!(out, "\nTip:\n{}{}", INDENT, guidance.tip);
    }
    out
}

/// Conversation so far; empty when nothing has been asked
pub fn render_chat(chat: &ChatSession) -> String {
    if chat.turns().is_empty() && !chat.is_loading() {
        return String::new();
    }

    let mut out = String::from("Chat:\n");
    for turn in chat.turns() {
        let _ = writeln!(out, "{}{}: {}", INDENT, turn.role.speaker(), turn.text);
    }
    if chat.is_loading() {
        let _ = writeln!(out, "{}Mentor is thinking...", INDENT);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Effect};
    use crate::domain::{NodeKind, Phase, PhaseStyle};
    use crate::guidance::offline_guidance;

    fn small_tree() -> ProcessTree {
        ProcessTree::new(vec![
            Phase {
                id: "initiation".to_string(),
                title: "Initiation".to_string(),
                style: PhaseStyle::default(),
                nodes: vec![Node::new("charter", "Project Charter", NodeKind::Document)],
            },
            Phase {
                id: "planning".to_string(),
                title: "Planning".to_string(),
                style: PhaseStyle::default(),
                nodes: vec![
                    Node::new("scope", "Scope", NodeKind::Group)
                        .with_children(vec![Node::new("wbs", "Create WBS", NodeKind::Activity)]),
                ],
            },
        ])
        .unwrap()
    }

    fn selected_store() -> (Store, u64) {
        let mut store = Store::new();
        let Some(Effect::FetchGuidance(ticket)) = store.dispatch(Action::SelectNode {
            node: Node::new("charter", "Project Charter", NodeKind::Document),
            phase_title: "Initiation".to_string(),
        }) else {
            panic!("expected FetchGuidance");
        };
        (store, ticket.generation)
    }

    #[test]
    fn test_render_tree_nests_children() {
        let text = render_tree(&small_tree());
        assert_eq!(
            text,
            "== Initiation ==\n  ▤ Project Charter [charter]\n\n== Planning ==\n  ▾ Scope [scope]\n    • Create WBS [wbs]\n"
        );
    }

    #[test]
    fn test_render_embedded_tree_lists_every_node() {
        let tree = ProcessTree::embedded().unwrap();
        let text = render_tree(&tree);
        for entry in tree.walk() {
            assert!(text.contains(&format!("[{}]", entry.node.id)));
        }
    }

    #[test]
    fn test_render_panel_states() {
        assert_eq!(render_panel(&Store::new()), "No step selected.\n");

        let (mut store, generation) = selected_store();
        assert!(render_panel(&store).contains("Loading guidance..."));

        store.dispatch(Action::GuidanceResolved {
            generation,
            result: Some(offline_guidance("Project Charter", "Initiation")),
        });
        let text = render_panel(&store);
        assert!(text.starts_with("Project Charter (Initiation)\n"));
        assert!(text.contains("  1. Review the inputs required for Project Charter\n"));
        assert!(text.contains("  4. Update the project documents\n"));
        assert!(text.contains("Tip:\n"));
        assert!(!text.contains("Chat:"));

        store.dispatch(Action::ClosePanel);
        assert!(render_panel(&store).contains("Panel closed."));
    }

    #[test]
    fn test_render_panel_without_guidance() {
        let (mut store, generation) = selected_store();
        store.dispatch(Action::GuidanceResolved { generation, result: None });
        assert!(render_panel(&store).contains("Guidance is unavailable"));
    }

    #[test]
    fn test_render_chat() {
        let (mut store, _) = selected_store();
        let Some(Effect::AskQuestion(q)) = store.dispatch(Action::SubmitQuestion("Who signs?".to_string())) else {
            panic!("expected AskQuestion");
        };
        let text = render_chat(store.chat());
        assert_eq!(text, "Chat:\n  User: Who signs?\n  Mentor is thinking...\n");

        store.dispatch(Action::AnswerResolved {
            epoch: q.epoch,
            text: "The sponsor.".to_string(),
        });
        assert_eq!(
            render_chat(store.chat()),
            "Chat:\n  User: Who signs?\n  Mentor: The sponsor.\n"
        );
    }
}
