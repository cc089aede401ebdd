use super::LlmClient;
use crate::errors::PipelineError;
use crate::model::Completion;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic offline client. Replays a queue of canned responses in
/// order and records every call it saw; with an empty script it echoes the
/// prompt, which keeps the CLI usable without a network.
pub struct ScriptedClient {
    model: String,
    script: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub context: Option<String>,
}

impl ScriptedClient {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script<I, S>(model: &str, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new(model);
        {
            let mut script = client.script.lock().unwrap();
            script.extend(responses.into_iter().map(Into::into));
        }
        client
    }

    pub fn push_response(&self, text: &str) {
        self.script.lock().unwrap().push_back(text.to_string());
    }

    /// Everything `complete` has been asked so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<Completion, PipelineError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            context: context.map(|c| c.to_string()),
        });

        let text = match self.script.lock().unwrap().pop_front() {
            Some(canned) => canned,
            None => format!("echo from {} :: {}", self.model, prompt),
        };

        Ok(Completion {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
