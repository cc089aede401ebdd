use crate::errors::PipelineError;

/// Generation prompt: dialect rules + schema + question. Rendered once per
/// pipeline invocation.
pub const GENERATION_TEMPLATE: &str = "\
You are a {dialect} expert. Given an input question, create a syntactically correct {dialect} query to run.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {top_k} results using the LIMIT clause as per {dialect}. You can order the results by a relevant column to return the most informative examples in the database.
Never query for all columns from a table. You must query only the columns that are needed to answer the question.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
{dialect_instructions}

Only use the following tables:
{table_info}

Question: {input}
";

/// Correction prompt: generic answer-from-context instructions. The context
/// slot carries the raw candidate SQL from the generation pass.
pub const CORRECTION_TEMPLATE: &str = "\
Answer the question using only the context below.

Context:
{context}

Question: {question}
";

/// Substitutes `{name}` placeholders from `vars`. A placeholder with no entry
/// in the mapping fails fast; by construction the output carries no
/// unresolved markers. A lone `{` with no closing brace is copied literally.
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, PipelineError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                let value = vars
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| PipelineError::Template(name.to_string()))?;
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// The instruction fed as `question` into the correction pass. Embeds the
/// original question plus the formatting contract: exactly one statement,
/// no fences, no prose. Contract only; nothing downstream verifies it.
pub fn correction_instruction(question: &str) -> String {
    format!(
        "Respond with the corrected SQL statement that answers the question \"{}\". \
         Return exactly one syntactically valid SQL statement. \
         Do not wrap it in code fences and do not add any explanation or other text.",
        question
    )
}
