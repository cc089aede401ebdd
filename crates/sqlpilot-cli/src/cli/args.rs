use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlpilot",
    version,
    about = "Ask questions of a SQL database through an LLM-driven query pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// One-shot pipeline: question -> generate -> correct -> execute
    Ask(AskArgs),
    /// Interactive agent that may call database tools repeatedly
    Agent(AgentArgs),
    /// Print the tool descriptors the agent can invoke
    Tools(ToolsArgs),
    /// Print the schema blob used in the generation prompt
    Schema(SchemaArgs),
    /// Write a starter sqlpilot.yaml
    Init(InitArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(long, default_value = "sqlpilot.yaml")]
    pub config: PathBuf,

    /// Question text; read from stdin when omitted
    pub question: Option<String>,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Provider override: openai|fake
    #[arg(long)]
    pub provider: Option<String>,

    /// Echo the candidate and corrected SQL on stderr
    #[arg(long)]
    pub show_sql: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AgentArgs {
    #[arg(long, default_value = "sqlpilot.yaml")]
    pub config: PathBuf,

    /// Question text; read from stdin when omitted
    pub question: Option<String>,

    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub provider: Option<String>,

    /// Reasoning step budget override
    #[arg(long)]
    pub max_steps: Option<u32>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ToolsArgs {}

#[derive(clap::Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, default_value = "sqlpilot.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Restrict to the named tables
    #[arg(long)]
    pub table: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "sqlpilot.yaml")]
    pub config: PathBuf,
}
