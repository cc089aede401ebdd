use crate::model::{AgentStep, AgentStepKind, PipelineOutcome, RowSet};

/// Plain aligned-column rendering on stdout. Rows only; diagnostics go to
/// stderr so piped output stays clean.
pub fn print_rows(rows: &RowSet) {
    if rows.columns.is_empty() && rows.rows.is_empty() {
        println!("(no rows)");
        return;
    }

    let mut widths: Vec<usize> = rows.columns.iter().map(|c| c.len()).collect();
    let rendered: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i >= widths.len() {
                widths.push(cell.len());
            } else if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    if !rows.columns.is_empty() {
        let header: Vec<String> = rows
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<w$}", c, w = widths[i]))
            .collect();
        println!("{}", header.join("  "));
    }
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<w$}", c, w = widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", line.join("  "));
    }
    eprintln!("{} row(s)", rows.rows.len());
}

pub fn print_outcome(outcome: &PipelineOutcome, show_sql: bool) {
    if show_sql {
        eprintln!("candidate: {}", outcome.candidate_sql.trim());
        eprintln!("corrected: {}", outcome.corrected_sql.trim());
    }
    print_rows(&outcome.rows);
    eprintln!("done in {}ms", outcome.duration_ms);
}

pub fn print_step(step: &AgentStep) {
    match step.kind {
        AgentStepKind::Thought => {
            eprintln!("[{}] thinking", step.step_no);
        }
        AgentStepKind::ToolCall => {
            eprintln!(
                "[{}] -> {} {}",
                step.step_no,
                step.tool.as_deref().unwrap_or("?"),
                step.detail
            );
        }
        AgentStepKind::ToolResult => {
            eprintln!(
                "[{}] <- {} {}",
                step.step_no,
                step.tool.as_deref().unwrap_or("?"),
                step.detail
            );
        }
        AgentStepKind::Answer => {
            eprintln!("[{}] answer ready", step.step_no);
        }
    }
}

pub fn print_steps(steps: &[AgentStep]) {
    for step in steps {
        print_step(step);
    }
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
