use thiserror::Error;

/// Everything that can fail inside the pipeline. Nothing here is retried:
/// every error bubbles to the caller of the stage that raised it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A template referenced a placeholder that was not supplied.
    #[error("template error: missing placeholder `{0}`")]
    Template(String),

    /// The LLM service was unreachable or returned an unusable payload.
    #[error("llm call failed: {0}")]
    LlmCall(String),

    /// Execution failure from the database driver, message kept verbatim.
    #[error("database error: {0}")]
    Database(String),

    #[error("config error: {0}")]
    Config(String),

    /// Agent loop failures: malformed directive, unknown tool, step budget.
    #[error("agent error: {0}")]
    Agent(String),
}

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        PipelineError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::LlmCall(e.to_string())
    }
}
