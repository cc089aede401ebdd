use crate::errors::PipelineError;
use crate::model::Completion;
use async_trait::async_trait;

/// Text-in, text-out completion service. The only capability the pipeline
/// needs from an LLM; everything else (chains, agents) is composed on top.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion call. `context` is folded into the request verbatim;
    /// the response text comes back untrimmed and unmodified.
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<Completion, PipelineError>;

    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;
