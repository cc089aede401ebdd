use crate::errors::PipelineError;
use crate::model::{AgentStep, AgentStepKind};
use crate::providers::llm::LlmClient;
use crate::tools::{self, ToolContext};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{timeout, Duration};

/// Loop phases. Idle -> Thinking -> (ToolCall <-> Thinking)* -> Responding -> Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Thinking,
    ToolCall,
    Responding,
    Done,
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Hard bound on reasoning iterations. Exhausting it is an error, not a
    /// silent stop.
    pub max_steps: u32,
    pub timeout_seconds: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 8,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
}

/// What the model must emit each round: a tool invocation or a final answer.
#[derive(Debug, Deserialize)]
struct Directive {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    args: Option<serde_json::Value>,
    #[serde(default)]
    final_answer: Option<String>,
}

/// Interactive agent: repeatedly asks the model for a JSON directive, runs
/// the chosen tool, feeds the observation back, and stops when the model
/// produces a final answer (or the step budget runs out).
pub struct Agent {
    pub client: Arc<dyn LlmClient>,
    pub tools: ToolContext,
    pub settings: AgentSettings,
    /// Optional live stream of step records; the full list is also returned.
    pub step_tx: Option<UnboundedSender<AgentStep>>,
}

impl Agent {
    pub async fn run(&self, question: &str) -> Result<AgentOutcome, PipelineError> {
        let descriptors = serde_json::to_string_pretty(&tools::list_tools())
            .map_err(|e| PipelineError::Agent(format!("tool descriptor encoding: {}", e)))?;

        let mut state = AgentState::Idle;
        tracing::debug!(?state, "agent received question");
        let mut transcript = String::new();
        let mut steps: Vec<AgentStep> = Vec::new();

        for step_no in 1..=self.settings.max_steps {
            state = AgentState::Thinking;
            tracing::debug!(step = step_no, ?state, "agent step");

            let prompt = self.build_prompt(question, &descriptors, &transcript);
            let resp = self.call_llm(&prompt).await?;
            let directive = parse_directive(&resp.text)?;

            if let Some(answer) = directive.final_answer {
                state = AgentState::Responding;
                tracing::debug!(step = step_no, ?state, "agent answering");
                self.emit(
                    &mut steps,
                    AgentStep {
                        step_no,
                        kind: AgentStepKind::Answer,
                        tool: None,
                        detail: json!({ "answer": answer }),
                    },
                );
                state = AgentState::Done;
                tracing::debug!(step = step_no, ?state, "agent done");
                return Ok(AgentOutcome { answer, steps });
            }

            let tool = directive.tool.ok_or_else(|| {
                PipelineError::Agent(
                    "directive names neither a tool nor a final answer".to_string(),
                )
            })?;
            let args = directive.args.unwrap_or_else(|| json!({}));

            state = AgentState::ToolCall;
            tracing::debug!(step = step_no, ?state, tool = %tool, "agent tool call");
            self.emit(
                &mut steps,
                AgentStep {
                    step_no,
                    kind: AgentStepKind::ToolCall,
                    tool: Some(tool.clone()),
                    detail: args.clone(),
                },
            );

            // Tool failures go back into the transcript as observations so
            // the model can change course; only llm-level failures abort.
            let observation = match tools::handle_call(&self.tools, &tool, &args).await {
                Ok(v) => v,
                Err(e @ PipelineError::LlmCall(_)) => return Err(e),
                Err(e) => json!({ "error": e.to_string() }),
            };

            self.emit(
                &mut steps,
                AgentStep {
                    step_no,
                    kind: AgentStepKind::ToolResult,
                    tool: Some(tool.clone()),
                    detail: observation.clone(),
                },
            );

            transcript.push_str(&format!(
                "Tool {} was called with {} and returned:\n{}\n\n",
                tool, args, observation
            ));
        }

        tracing::warn!(max_steps = self.settings.max_steps, "agent budget exhausted");
        Err(PipelineError::Agent(format!(
            "no final answer after {} steps",
            self.settings.max_steps
        )))
    }

    fn build_prompt(&self, question: &str, descriptors: &str, transcript: &str) -> String {
        format!(
            "You are a database assistant. Answer the user's question by querying the \
             database with the tools below.\n\n\
             Tools:\n{descriptors}\n\n\
             Question: {question}\n\n\
             {transcript}\
             Respond with a single JSON object and nothing else, either\n\
             {{\"tool\": \"<name>\", \"args\": {{...}}}} to call a tool, or\n\
             {{\"final_answer\": \"<answer>\"}} once you can answer the question.\n"
        )
    }

    async fn call_llm(&self, prompt: &str) -> Result<crate::model::Completion, PipelineError> {
        let t = self.settings.timeout_seconds;
        match timeout(Duration::from_secs(t), self.client.complete(prompt, None)).await {
            Ok(resp) => resp,
            Err(_) => Err(PipelineError::LlmCall(format!(
                "llm call timed out after {}s",
                t
            ))),
        }
    }

    fn emit(&self, steps: &mut Vec<AgentStep>, step: AgentStep) {
        if let Some(tx) = &self.step_tx {
            let _ = tx.send(step.clone());
        }
        steps.push(step);
    }
}

fn parse_directive(text: &str) -> Result<Directive, PipelineError> {
    let cleaned = strip_fences(text);
    serde_json::from_str(cleaned)
        .map_err(|e| PipelineError::Agent(format!("malformed directive ({}): {}", e, text)))
}

/// Models like to fence their JSON even when told not to. Tolerate it.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
