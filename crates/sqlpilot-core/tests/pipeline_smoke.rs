use sqlpilot_core::db::{SqlExecutor, SqliteExecutor};
use sqlpilot_core::errors::PipelineError;
use sqlpilot_core::model::RowSet;
use sqlpilot_core::pipeline::{Pipeline, PipelineSettings};
use sqlpilot_core::providers::llm::fake::ScriptedClient;
use std::sync::{Arc, Mutex};

/// Records every query it receives and replays a fixed response.
struct StubExecutor {
    queries: Mutex<Vec<String>>,
    rows: RowSet,
    fail_msg: Option<String>,
}

impl StubExecutor {
    fn returning(rows: RowSet) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            rows,
            fail_msg: None,
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            rows: RowSet::empty(),
            fail_msg: Some(msg.to_string()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl SqlExecutor for StubExecutor {
    fn execute(&self, sql: &str) -> Result<RowSet, PipelineError> {
        self.queries.lock().unwrap().push(sql.to_string());
        match &self.fail_msg {
            Some(msg) => Err(PipelineError::Database(msg.clone())),
            None => Ok(self.rows.clone()),
        }
    }

    fn list_tables(&self) -> Result<Vec<String>, PipelineError> {
        Ok(vec!["employees".to_string()])
    }

    fn table_info(&self, _tables: Option<&[String]>) -> Result<String, PipelineError> {
        Ok("CREATE TABLE employees (id INTEGER, name TEXT)".to_string())
    }
}

fn pipeline(client: Arc<ScriptedClient>, executor: Arc<StubExecutor>) -> Pipeline {
    Pipeline::new(client, executor, PipelineSettings::default())
}

#[tokio::test]
async fn scenario_a_count_query_flows_through() {
    let sql = "SELECT COUNT(*) FROM employees;";
    let client = Arc::new(ScriptedClient::with_script("stub", [sql, sql]));
    let executor = Arc::new(StubExecutor::returning(RowSet {
        columns: vec!["COUNT(*)".to_string()],
        rows: vec![vec![serde_json::json!(42)]],
    }));

    let p = pipeline(client.clone(), executor.clone());
    let outcome = p.run("How many employees are there?").await.unwrap();

    assert_eq!(outcome.candidate_sql, sql);
    assert_eq!(outcome.corrected_sql, sql);
    assert_eq!(outcome.rows.rows, vec![vec![serde_json::json!(42)]]);
    assert_eq!(executor.queries(), vec![sql.to_string()]);

    // The correction pass must see the generator output byte-for-byte in its
    // context slot.
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].prompt.contains(&format!("Context:\n{}", sql)));
    assert!(calls[1]
        .prompt
        .contains("How many employees are there?"));
}

#[tokio::test]
async fn scenario_b_fenced_candidate_is_cleaned_by_second_pass() {
    let fenced = "```sql\nSELECT * FROM t LIMIT 5;\n```";
    let clean = "SELECT * FROM t LIMIT 5;";
    let client = Arc::new(ScriptedClient::with_script("stub", [fenced, clean]));
    let executor = Arc::new(StubExecutor::returning(RowSet::empty()));

    let p = pipeline(client.clone(), executor.clone());
    let outcome = p.run("show me t").await.unwrap();

    // The fenced text is preserved in the audit trail, untouched.
    assert_eq!(outcome.candidate_sql, fenced);
    // Only the fence-free string ever reaches the executor.
    assert_eq!(executor.queries(), vec![clean.to_string()]);
    // And the context the corrector saw was still the raw fenced candidate.
    assert!(client.calls()[1].prompt.contains(fenced));
}

#[tokio::test]
async fn llm_text_passes_through_verbatim() {
    let odd = "  SELECT 1;  \nnote: untrimmed";
    let client = Arc::new(ScriptedClient::with_script("stub", [odd]));
    let executor = Arc::new(StubExecutor::returning(RowSet::empty()));

    let p = pipeline(client, executor);
    let candidate = p.generate("q", "CREATE TABLE t (a)").await.unwrap();
    assert_eq!(candidate, odd);
}

#[tokio::test]
async fn database_error_propagates_unchanged_without_retry() {
    let client = Arc::new(ScriptedClient::with_script(
        "stub",
        ["SELECT x FROM nope;", "SELECT x FROM nope;"],
    ));
    let executor = Arc::new(StubExecutor::failing("no such table: nope"));

    let p = pipeline(client, executor.clone());
    let err = p.run("anything in nope?").await.unwrap_err();

    match err {
        PipelineError::Database(msg) => assert_eq!(msg, "no such table: nope"),
        other => panic!("expected database error, got {other}"),
    }
    assert_eq!(executor.queries().len(), 1, "executor must not retry");
}

#[tokio::test]
async fn end_to_end_against_sqlite() {
    let executor = Arc::new(SqliteExecutor::open_in_memory().unwrap());
    executor
        .batch(
            "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO employees (name) VALUES ('ada'), ('grace'), ('edsger');",
        )
        .unwrap();

    let sql = "SELECT COUNT(*) FROM employees;";
    let client = Arc::new(ScriptedClient::with_script("stub", [sql, sql]));
    let p = Pipeline::new(client, executor, PipelineSettings::default());

    let outcome = p.run("How many employees are there?").await.unwrap();
    assert_eq!(outcome.rows.rows, vec![vec![serde_json::json!(3)]]);
}
