use crate::errors::PipelineError;
use crate::model::RowSet;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Executes SQL text against a database connection. The query arrives as-is
/// from the correction pass: no sanitization, no injection defense, no retry.
/// Whoever owns the connection decides what the LLM is allowed to reach.
pub trait SqlExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> Result<RowSet, PipelineError>;

    fn list_tables(&self) -> Result<Vec<String>, PipelineError>;

    /// Schema blob for the prompt: the CREATE statements of the selected
    /// (or all) user tables.
    fn table_info(&self, tables: Option<&[String]>) -> Result<String, PipelineError>;
}

#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, PipelineError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// How long the driver waits on a locked database before giving up.
    pub fn with_busy_timeout(self, ms: u64) -> Result<Self, PipelineError> {
        self.conn
            .lock()
            .unwrap()
            .busy_timeout(Duration::from_millis(ms))?;
        Ok(self)
    }

    /// Direct access for seeding test fixtures.
    pub fn batch(&self, sql: &str) -> Result<(), PipelineError> {
        self.conn.lock().unwrap().execute_batch(sql)?;
        Ok(())
    }
}

impl SqlExecutor for SqliteExecutor {
    fn execute(&self, sql: &str) -> Result<RowSet, PipelineError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let ncols = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut rec = Vec::with_capacity(ncols);
            for i in 0..ncols {
                rec.push(value_to_json(row.get_ref(i)?));
            }
            out.push(rec);
        }

        Ok(RowSet { columns, rows: out })
    }

    fn list_tables(&self) -> Result<Vec<String>, PipelineError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn table_info(&self, tables: Option<&[String]>) -> Result<String, PipelineError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name, sql FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let mut rows = stmt.query([])?;

        let mut found = Vec::new();
        let mut ddl = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let sql: Option<String> = row.get(1)?;
            if let Some(wanted) = tables {
                if !wanted.contains(&name) {
                    continue;
                }
            }
            found.push(name);
            if let Some(sql) = sql {
                ddl.push(sql);
            }
        }

        if let Some(wanted) = tables {
            for t in wanted {
                if !found.contains(t) {
                    return Err(PipelineError::Database(format!("no such table: {}", t)));
                }
            }
        }

        Ok(ddl.join("\n\n"))
    }
}

fn value_to_json(v: ValueRef<'_>) -> serde_json::Value {
    match v {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::json!(i),
        ValueRef::Real(f) => serde_json::json!(f),
        ValueRef::Text(t) => serde_json::json!(String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => serde_json::json!(format!("<blob {} bytes>", b.len())),
    }
}
