//! Domain types for procflow
//!
//! - [`ProcessTree`], [`Phase`], [`Node`]: the static process flow
//! - [`GuidanceResult`], [`ChatTurn`]: advisory content shown for a selection

mod advice;
mod process;

pub use advice::{ChatRole, ChatTurn, GuidanceResult};
pub use process::{Node, NodeKind, NodeRef, Phase, PhaseStyle, ProcessError, ProcessTree, Walk};
