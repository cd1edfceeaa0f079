use crate::db::DatabaseConnection;
use crate::logging::LogSink;
use crate::resource::list_files_with_extension;
use crate::{LoaderError, LoaderResult};
use std::fs;
use std::path::Path;

pub const SCRIPT_EXTENSION: &str = "sql";

// Runs the setup scripts of a resource directory before any data is loaded
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlScriptExecutor;

impl SqlScriptExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute_sql_scripts(
        &self,
        connection: &mut dyn DatabaseConnection,
        dir: &Path,
        log: &dyn LogSink,
    ) -> LoaderResult<usize> {
        let scripts = list_files_with_extension(dir, SCRIPT_EXTENSION)?;
        let mut executed = 0;

        for script in &scripts {
            let text = fs::read_to_string(script).map_err(|e| LoaderError::io(script, e))?;
            let statements = split_statements(&text);
            log.accept(&format!(
                "Executing {} ({} statements)",
                script.display(),
                statements.len()
            ));

            for (index, statement) in statements.iter().enumerate() {
                tracing::debug!(script = %script.display(), statement = index + 1, "{}", statement);
                connection
                    .execute(statement)
                    .map_err(|source| LoaderError::Statement {
                        script: script.clone(),
                        statement: index + 1,
                        source,
                    })?;
                executed += 1;
            }
        }

        Ok(executed)
    }
}

// Splits a script on semicolons that are outside quotes and comments.
// Comments are dropped; empty statements are skipped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                current.push(ch);
                // A doubled quote inside a literal is an escaped quote and keeps us inside
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == ch {
                        if chars.peek() == Some(&ch) {
                            current.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                current.push(' ');
            }
            ';' => {
                push_statement(&mut statements, &mut current);
            }
            _ => current.push(ch),
        }
    }

    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}
