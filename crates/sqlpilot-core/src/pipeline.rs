use crate::db::SqlExecutor;
use crate::errors::PipelineError;
use crate::model::{Completion, Dialect, PipelineOutcome};
use crate::prompt;
use crate::providers::llm::LlmClient;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub dialect: Dialect,
    /// Row cap suggested to the model via the prompt. Not enforced in code.
    pub top_k: u32,
    pub timeout_seconds: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            top_k: 5,
            timeout_seconds: 30,
        }
    }
}

/// The fixed linear composition: question -> generate -> correct -> execute.
/// No branching, no recovery between stages; whatever fails, fails the run.
pub struct Pipeline {
    pub client: Arc<dyn LlmClient>,
    pub executor: Arc<dyn SqlExecutor>,
    pub settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn LlmClient>,
        executor: Arc<dyn SqlExecutor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            client,
            executor,
            settings,
        }
    }

    /// First pass: render the generation prompt and return the model's text
    /// verbatim. No validation; the output may be fenced or wrapped in prose.
    pub async fn generate(
        &self,
        question: &str,
        table_info: &str,
    ) -> Result<String, PipelineError> {
        let top_k = self.settings.top_k.to_string();
        let rendered = prompt::render(
            prompt::GENERATION_TEMPLATE,
            &[
                ("dialect", self.settings.dialect.name()),
                ("dialect_instructions", self.settings.dialect.instructions()),
                ("top_k", &top_k),
                ("table_info", table_info),
                ("input", question),
            ],
        )?;
        let resp = self.call_llm(&rendered, None).await?;
        tracing::debug!(provider = resp.provider, "generated candidate query");
        Ok(resp.text)
    }

    /// Second pass: the candidate goes into the context slot unmodified, the
    /// question slot carries the correction instruction. Best-effort cleanup
    /// by the model, not a guarantee; bad SQL surfaces at execution time.
    pub async fn correct(&self, candidate: &str, question: &str) -> Result<String, PipelineError> {
        let instruction = prompt::correction_instruction(question);
        let rendered = prompt::render(
            prompt::CORRECTION_TEMPLATE,
            &[("context", candidate), ("question", &instruction)],
        )?;
        let resp = self.call_llm(&rendered, None).await?;
        tracing::debug!(provider = resp.provider, "corrected candidate query");
        Ok(resp.text)
    }

    pub async fn run(&self, question: &str) -> Result<PipelineOutcome, PipelineError> {
        let start = std::time::Instant::now();

        let table_info = self.executor.table_info(None)?;
        let candidate = self.generate(question, &table_info).await?;
        let corrected = self.correct(&candidate, question).await?;
        let rows = self.executor.execute(&corrected)?;

        Ok(PipelineOutcome {
            question: question.to_string(),
            candidate_sql: candidate,
            corrected_sql: corrected,
            rows,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    pub(crate) async fn call_llm(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<Completion, PipelineError> {
        let t = self.settings.timeout_seconds;
        let fut = self.client.complete(prompt, context);
        match timeout(Duration::from_secs(t), fut).await {
            Ok(resp) => resp,
            Err(_) => Err(PipelineError::LlmCall(format!(
                "llm call timed out after {}s",
                t
            ))),
        }
    }
}
