//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// procflow - predictive process flow with step-by-step guidance
#[derive(Debug, Parser)]
#[command(
    name = "pf",
    about = "Browse the predictive project-management process flow and get guidance for each step",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Never contact the AI backend
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the process flow
    Tree,

    /// Show guidance for a step
    Guide {
        /// Node id, as shown by `pf tree`
        #[arg(value_name = "NODE_ID")]
        node_id: String,
    },

    /// Ask a question about a step
    Ask {
        #[arg(value_name = "NODE_ID")]
        node_id: String,

        #[arg(value_name = "QUESTION")]
        question: String,
    },

    /// Interactive session
    Repl {
        /// Step to select on start
        #[arg(value_name = "NODE_ID")]
        node_id: Option<String>,
    },
}
