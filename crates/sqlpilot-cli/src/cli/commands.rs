use super::args::*;
use sqlpilot_core::agent::Agent;
use sqlpilot_core::config::{self, AppConfig};
use sqlpilot_core::db::{SqlExecutor, SqliteExecutor};
use sqlpilot_core::errors::PipelineError;
use sqlpilot_core::pipeline::Pipeline;
use sqlpilot_core::providers::llm::{fake::ScriptedClient, openai::OpenAIClient, LlmClient};
use sqlpilot_core::report::console;
use sqlpilot_core::tools::{self, ToolContext};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const QUERY_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Ask(args) => cmd_ask(args).await,
        Command::Agent(args) => cmd_agent(args).await,
        Command::Tools(args) => cmd_tools(args).await,
        Command::Schema(args) => cmd_schema(args).await,
        Command::Init(args) => cmd_init(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

async fn cmd_ask(args: AskArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(code) => return Ok(code),
    };

    let question = read_question(args.question).await?;
    let client = build_client(args.provider.as_deref().unwrap_or(&cfg.provider), &cfg).await?;
    let executor = build_executor(&cfg, &args.db)?;
    let pipeline = Pipeline::new(client, executor, cfg.pipeline_settings());

    match pipeline.run(&question).await {
        Ok(outcome) => {
            console::print_outcome(&outcome, args.show_sql);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(failure_code(&e))
        }
    }
}

async fn cmd_agent(args: AgentArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(code) => return Ok(code),
    };

    let question = read_question(args.question).await?;
    let client = build_client(args.provider.as_deref().unwrap_or(&cfg.provider), &cfg).await?;
    let executor = build_executor(&cfg, &args.db)?;

    let mut settings = cfg.agent_settings();
    if let Some(max_steps) = args.max_steps {
        settings.max_steps = max_steps;
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let agent = Agent {
        client: client.clone(),
        tools: ToolContext { executor, client },
        settings,
        step_tx: Some(tx),
    };

    let handle = tokio::spawn(async move { agent.run(&question).await });
    while let Some(step) = rx.recv().await {
        console::print_step(&step);
    }

    match handle.await? {
        Ok(outcome) => {
            println!("{}", outcome.answer);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(failure_code(&e))
        }
    }
}

async fn cmd_tools(_args: ToolsArgs) -> anyhow::Result<i32> {
    println!("{}", serde_json::to_string_pretty(&tools::list_tools())?);
    Ok(exit_codes::OK)
}

async fn cmd_schema(args: SchemaArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(code) => return Ok(code),
    };
    let executor = build_executor(&cfg, &args.db)?;

    let tables = if args.table.is_empty() {
        None
    } else {
        Some(args.table.as_slice())
    };
    match executor.table_info(tables) {
        Ok(info) => {
            println!("{}", info);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(failure_code(&e))
        }
    }
}

async fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("note: {} already exists (skipped)", args.config.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.config.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    config::write_sample_config(&args.config)?;
    eprintln!("created {}", args.config.display());
    Ok(exit_codes::OK)
}

fn load_config(path: &Path) -> Result<AppConfig, i32> {
    config::load_config(path).map_err(|e| {
        eprintln!("{}", e);
        exit_codes::CONFIG_ERROR
    })
}

fn failure_code(e: &PipelineError) -> i32 {
    match e {
        PipelineError::Config(_) => exit_codes::CONFIG_ERROR,
        _ => exit_codes::QUERY_FAILED,
    }
}

async fn read_question(arg: Option<String>) -> anyhow::Result<String> {
    if let Some(q) = arg {
        return Ok(q);
    }
    eprint!("How can I help you?: ");
    let mut input = String::new();
    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
    reader.read_line(&mut input).await?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        anyhow::bail!("no question given");
    }
    Ok(trimmed)
}

async fn build_client(provider: &str, cfg: &AppConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    match provider {
        "openai" => {
            let key = match std::env::var("OPENAI_API_KEY") {
                Ok(k) => k,
                Err(_) => {
                    eprint!("OPENAI_API_KEY not set. Enter key: ");
                    let mut input = String::new();
                    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
                    reader.read_line(&mut input).await?;
                    let trimmed = input.trim().to_string();
                    if trimmed.is_empty() {
                        anyhow::bail!("OpenAI API key is required");
                    }
                    trimmed
                }
            };
            Ok(Arc::new(OpenAIClient::new(
                cfg.model.clone(),
                key,
                cfg.settings.temperature,
                cfg.settings.max_tokens,
            )))
        }
        // Offline echo client; useful for demos and CLI tests.
        "fake" => Ok(Arc::new(ScriptedClient::new(&cfg.model))),
        other => anyhow::bail!("unknown provider: {}", other),
    }
}

fn build_executor(
    cfg: &AppConfig,
    db_override: &Option<PathBuf>,
) -> anyhow::Result<Arc<dyn SqlExecutor>> {
    let path = db_override.as_ref().unwrap_or(&cfg.database);
    let executor = SqliteExecutor::open(path)?.with_busy_timeout(cfg.settings.busy_timeout_ms)?;
    Ok(Arc::new(executor))
}
