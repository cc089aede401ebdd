use serde::{Deserialize, Serialize};

/// One LLM response, text passed through verbatim from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub provider: String,
    pub model: String,
}

/// Result of one SQL execution. Shape is whatever the driver returned;
/// no normalization beyond mapping driver values to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RowSet {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Audit trail of a single pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub question: String,
    pub candidate_sql: String,
    pub corrected_sql: String,
    pub rows: RowSet,
    pub duration_ms: u64,
}

/// Name + input signature of a callable the agent may invoke. Read-only,
/// enumerated once per connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStepKind {
    Thought,
    ToolCall,
    ToolResult,
    Answer,
}

/// One intermediate record emitted while the agent works a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub step_no: u32,
    pub kind: AgentStepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Target SQL variant. Only biases the prompt text; nothing in the pipeline
/// enforces the dialect on the generated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Sqlite,
    Mysql,
    Postgres,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "SQLite",
            Dialect::Mysql => "MySQL",
            Dialect::Postgres => "PostgreSQL",
        }
    }

    /// Dialect-specific guidance embedded into the generation prompt.
    pub fn instructions(&self) -> &'static str {
        match self {
            Dialect::Sqlite => {
                "Wrap each column name in double quotes (\") to denote them as delimited identifiers. \
                 Use date('now') for the current date."
            }
            Dialect::Mysql => {
                "Wrap each column name in backticks (`) to denote them as delimited identifiers. \
                 Use CURDATE() for the current date."
            }
            Dialect::Postgres => {
                "Wrap each column name in double quotes (\") to denote them as delimited identifiers. \
                 Use CURRENT_DATE for the current date."
            }
        }
    }
}
