use crate::db::SqlExecutor;
use crate::errors::PipelineError;
use crate::model::ToolDescriptor;
use crate::prompt;
use crate::providers::llm::LlmClient;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handles the tools operate on. One per connection; the descriptors
/// themselves are static.
pub struct ToolContext {
    pub executor: Arc<dyn SqlExecutor>,
    pub client: Arc<dyn LlmClient>,
}

/// The toolkit exposed to the agent (and to `sqlpilot tools` for display).
/// Everything except `execute_query` is read-only.
pub fn list_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "list_tables".to_string(),
            description: "List the tables available in the database.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDescriptor {
            name: "table_schema".to_string(),
            description: "Show the CREATE statements for the given tables (or all tables)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tables": { "type": "array", "items": { "type": "string" } }
                }
            }),
        },
        ToolDescriptor {
            name: "execute_query".to_string(),
            description: "Execute a SQL query and return the result rows.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: "check_query".to_string(),
            description: "Ask the model to rewrite a query as a single clean SQL statement."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "question": { "type": "string" }
                },
                "required": ["query"]
            }),
        },
    ]
}

pub async fn handle_call(
    ctx: &ToolContext,
    name: &str,
    args: &Value,
) -> Result<Value, PipelineError> {
    match name {
        "list_tables" => {
            let tables = ctx.executor.list_tables()?;
            Ok(json!({ "tables": tables }))
        }
        "table_schema" => {
            let tables: Option<Vec<String>> = args
                .get("tables")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| s.to_string())
                        .collect()
                });
            let info = ctx.executor.table_info(tables.as_deref())?;
            Ok(json!({ "table_info": info }))
        }
        "execute_query" => {
            let query = required_str(args, "query", name)?;
            let rows = ctx.executor.execute(query)?;
            serde_json::to_value(rows)
                .map_err(|e| PipelineError::Agent(format!("tool result encoding: {}", e)))
        }
        "check_query" => {
            let query = required_str(args, "query", name)?;
            let question = args
                .get("question")
                .and_then(|v| v.as_str())
                .unwrap_or("the user's request");
            let instruction = prompt::correction_instruction(question);
            let resp = ctx.client.complete(&instruction, Some(query)).await?;
            Ok(json!({ "query": resp.text }))
        }
        _ => Err(PipelineError::Agent(format!("unknown tool: {}", name))),
    }
}

fn required_str<'a>(args: &'a Value, key: &str, tool: &str) -> Result<&'a str, PipelineError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| PipelineError::Agent(format!("tool {}: missing argument `{}`", tool, key)))
}
