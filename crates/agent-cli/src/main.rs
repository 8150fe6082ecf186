use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use agent_core::{Session, ToolExecutor};
use agent_llm::{LLMProvider, OpenAIProvider};
use agent_loop::{run_agent_loop_with_config, AgentLoopConfig, LoopOutcome};
use agent_tools::{BuiltinToolExecutor, WorkingRoot};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;

mod config;
mod logging;
mod output;
mod prompts;

use config::{FileConfig, Overrides, Settings};
use logging::init_logging;

/// Exit status when the iteration limit is hit without a final answer.
const EXIT_EXHAUSTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "AI code assistant confined to a working directory")]
#[command(version)]
struct Cli {
    /// What to ask the assistant
    prompt: Vec<String>,

    /// Print token usage, tool arguments and tool results
    #[arg(long)]
    verbose: bool,

    /// Directory the tools are confined to
    #[arg(long, env = "AGENT_WORKING_DIR")]
    working_dir: Option<PathBuf>,

    /// Maximum number of model requests
    #[arg(long, env = "AGENT_MAX_ITERATIONS")]
    max_iterations: Option<usize>,

    /// Model name
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_BASE_URL")]
    base_url: Option<String>,

    /// API key (falls back to GEMINI_API_KEY)
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TOML file with [llm], [agent] and [sandbox] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    debug: bool,
}

fn print_usage() {
    println!("AI Code Assistant");
    println!();
    println!("Usage: agent-cli \"your prompt here\" [--verbose]");
    println!("Example: agent-cli \"How do I fix the calculator?\"");
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.prompt.is_empty() {
        print_usage();
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        api_key: cli
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok()),
        base_url: cli.base_url,
        model: cli.model,
        working_dir: cli.working_dir,
        max_iterations: cli.max_iterations,
    };
    let settings = Settings::resolve(overrides, file)?;

    let root = WorkingRoot::new(&settings.working_dir).with_context(|| {
        format!(
            "working directory {} is not usable",
            settings.working_dir.display()
        )
    })?;
    log::info!("Working root: {}", root.path().display());
    log::info!("Model: {} at {}", settings.model, settings.base_url);

    let tools: Arc<dyn ToolExecutor> = Arc::new(
        BuiltinToolExecutor::builder(root)
            .with_config(settings.sandbox.clone())
            .build(),
    );
    let llm: Arc<dyn LLMProvider> = Arc::new(
        OpenAIProvider::new(settings.api_key.clone())
            .with_base_url(settings.base_url.clone())
            .with_model(settings.model.clone()),
    );

    let user_prompt = cli.prompt.join(" ");
    if cli.verbose {
        println!("User prompt: {}", user_prompt);
    }

    let (event_tx, event_rx) = mpsc::channel(64);
    let printer = tokio::spawn(output::print_events(event_rx, cli.verbose));

    let mut session = Session::new(uuid::Uuid::new_v4().to_string());
    let outcome = run_agent_loop_with_config(
        &mut session,
        user_prompt,
        event_tx,
        llm,
        tools,
        AgentLoopConfig {
            max_iterations: settings.max_iterations,
            system_prompt: Some(settings.system_prompt),
        },
    )
    .await;

    // the loop owned the sender, so the printer drains and stops
    if let Err(e) = printer.await {
        log::warn!("event printer stopped abnormally: {}", e);
    }

    match outcome? {
        LoopOutcome::Done { text, .. } => {
            println!("{}", "Final response:".green());
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        LoopOutcome::Exhausted { iterations } => {
            println!("Maximum iterations ({}) reached.", iterations);
            Ok(ExitCode::from(EXIT_EXHAUSTED))
        }
    }
}
