use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, eyre};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use procflow::cli::{Cli, Command};
use procflow::config::Config;
use procflow::controller::{Dashboard, SelectionStatus};
use procflow::domain::ProcessTree;
use procflow::guidance::GuidanceProvider;
use procflow::view;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("procflow")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    // Write to a log file so stdout stays clean for the REPL
    let log_file = fs::File::create(log_dir.join("procflow.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level from the config file first, so the full load below can log
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "procflow loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    let tree = Arc::new(ProcessTree::embedded().context("Failed to load the embedded process flow")?);
    let provider = if cli.offline {
        info!("--offline given, AI backend disabled");
        GuidanceProvider::offline(config.guidance.clone())
    } else {
        GuidanceProvider::from_config(&config)
    };
    let dashboard = Dashboard::new(tree, Arc::new(provider));

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Tree) | None => cmd_tree(&dashboard),
        Some(Command::Guide { node_id }) => cmd_guide(dashboard, &node_id).await,
        Some(Command::Ask { node_id, question }) => cmd_ask(dashboard, &node_id, &question).await,
        Some(Command::Repl { node_id }) => cmd_repl(dashboard, node_id.as_deref()).await,
    }
}

fn cmd_tree(dashboard: &Dashboard) -> Result<()> {
    print!("{}", view::render_tree(dashboard.tree()));
    Ok(())
}

async fn cmd_guide(mut dashboard: Dashboard, node_id: &str) -> Result<()> {
    debug!(%node_id, "cmd_guide: called");
    dashboard.select(node_id)?;
    dashboard.settle().await;
    print!("{}", view::render_panel(dashboard.state()));
    Ok(())
}

async fn cmd_ask(mut dashboard: Dashboard, node_id: &str, question: &str) -> Result<()> {
    debug!(%node_id, "cmd_ask: called");
    dashboard.select(node_id)?;
    dashboard.settle().await;

    if !dashboard.submit(question) {
        return Err(eyre!("Question is empty"));
    }
    dashboard.settle().await;
    print!("{}", view::render_panel(dashboard.state()));
    Ok(())
}

enum SlashResult {
    Continue,
    Quit,
}

async fn cmd_repl(mut dashboard: Dashboard, node_id: Option<&str>) -> Result<()> {
    print_welcome(&dashboard);

    if let Some(id) = node_id {
        select_and_show(&mut dashboard, id).await;
    }

    let mut rl = DefaultEditor::new().map_err(|e| eyre!("Failed to initialize readline: {}", e))?;

    loop {
        let prompt = match dashboard.state().selection().node_label() {
            Some(label) => format!("{} {} ", label.cyan(), ">".bright_green()),
            None => format!("{} ", ">".bright_green()),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(input) {
                    debug!(error = %e, "cmd_repl: failed to add history entry");
                }

                if input.starts_with('/') {
                    match handle_slash_command(&mut dashboard, input).await {
                        SlashResult::Continue => continue,
                        SlashResult::Quit => break,
                    }
                } else {
                    ask_and_show(&mut dashboard, input).await;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => return Err(eyre!("Readline error: {}", err)),
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn print_welcome(dashboard: &Dashboard) {
    println!();
    println!("{}", "Predictive Process Flow".bright_cyan().bold());
    if !dashboard.is_online() {
        println!("{}", "Offline mode: guidance comes from built-in templates.".dimmed());
    }
    println!(
        "Type {} to pick a step, {} for help, {} to quit",
        "/select <id>".yellow(),
        "/help".yellow(),
        "/quit".yellow()
    );
    println!();
}

fn print_help() {
    println!();
    println!("{}", "Available Commands:".bright_cyan());
    println!("  {:16} Select a step and show its guidance", "/select <id>".yellow());
    println!("  {:16} Close the guidance panel", "/close".yellow());
    println!("  {:16} Show the process flow", "/tree".yellow());
    println!("  {:16} Show this help", "/help".yellow());
    println!("  {:16} Exit", "/quit".yellow());
    println!();
    println!("Any other input is a question about the selected step.");
    println!();
}

async fn handle_slash_command(dashboard: &mut Dashboard, input: &str) -> SlashResult {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");

    match cmd {
        "/select" | "/s" => match parts.next() {
            Some(id) => select_and_show(dashboard, id).await,
            None => println!("{} Usage: /select <id>", "?".yellow()),
        },
        "/close" => {
            dashboard.close_panel();
            println!("{}", "Panel closed.".dimmed());
        }
        "/tree" | "/t" => print!("{}", view::render_tree(dashboard.tree())),
        "/help" | "/h" => print_help(),
        "/quit" | "/q" | "/exit" => return SlashResult::Quit,
        _ => {
            println!("{} Unknown command: {}", "?".yellow(), cmd);
            println!("Type {} for available commands", "/help".yellow());
        }
    }
    SlashResult::Continue
}

async fn select_and_show(dashboard: &mut Dashboard, id: &str) {
    if let Err(e) = dashboard.select(id) {
        println!("{} {}", "!".red(), e);
        return;
    }
    if dashboard.status() == SelectionStatus::Loading {
        println!("{}", "Loading guidance...".dimmed());
    }
    dashboard.settle().await;
    println!();
    print!("{}", view::render_panel(dashboard.state()));
    println!();
}

async fn ask_and_show(dashboard: &mut Dashboard, question: &str) {
    if dashboard.state().selection().node.is_none() {
        println!("{} Select a step first with {}", "!".red(), "/select <id>".yellow());
        return;
    }
    if !dashboard.submit(question) {
        return;
    }
    println!("{}", "Mentor is thinking...".dimmed());
    dashboard.settle().await;

    if let Some(turn) = dashboard.state().chat().turns().last() {
        println!("{} {}", "Mentor:".bright_blue(), turn.text);
        println!();
    }
}
