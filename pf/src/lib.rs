//! procflow - Predictive Process Flow Guide
//!
//! A static project-management process flow (phases, steps, nested
//! sub-steps) with advisory guidance for whichever step is selected and a
//! follow-up chat about it.
//!
//! # Modules
//!
//! - [`domain`] - Process tree and advisory value types
//! - [`guidance`] - Guidance Provider with the deterministic offline fallback
//! - [`llm`] - LLM client trait and Gemini/Anthropic/OpenAI implementations
//! - [`prompts`] - Handlebars prompt templates
//! - [`controller`] - Selection Controller, Chat Session, and the async runtime
//! - [`view`] - Plain-text rendering
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod guidance;
pub mod llm;
pub mod prompts;
pub mod view;

pub use config::Config;
pub use controller::{Action, Dashboard, DashboardError, Effect, SelectionStatus, Store};
pub use domain::{ChatTurn, GuidanceResult, Node, ProcessTree};
pub use guidance::GuidanceProvider;
