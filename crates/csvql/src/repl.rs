//! Line-oriented SQL shell.
//!
//! Each input line is one statement. Results print as `Result: ` followed by
//! pretty JSON rows or a mutation count; failures print as `Error: <message>`.

use crate::{Database, Result, StatementResult};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Prompt shown before each line
pub const PROMPT: &str = "SQL> ";

/// Printed once when the shell starts
pub const BANNER: &str =
    "SQL Query Engine CLI. Enter your SQL commands, or type \"exit\" to quit.";

/// Printed when the shell stops
pub const FAREWELL: &str = "Exiting SQL CLI";

/// What to do with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    /// Blank line; prompt again
    Skip,
    /// `exit` was entered
    Exit,
    /// Statement succeeded; print to stdout
    Output(String),
    /// Statement failed; print to stderr
    Error(String),
}

/// Runs one line against `db`.
pub fn handle_line(db: &Database, line: &str) -> ReplAction {
    let statement = line.trim();
    if statement.is_empty() {
        return ReplAction::Skip;
    }
    if statement.eq_ignore_ascii_case("exit") {
        return ReplAction::Exit;
    }

    match render(db.execute(statement)) {
        Ok(text) => ReplAction::Output(text),
        Err(message) => ReplAction::Error(message),
    }
}

/// Formats a statement outcome for display.
pub fn render(result: Result<StatementResult>) -> std::result::Result<String, String> {
    match result {
        Ok(StatementResult::Rows(rows)) => serde_json::to_string_pretty(&rows)
            .map(|json| format!("Result: {}", json))
            .map_err(|e| format!("Error: {}", e)),
        Ok(StatementResult::Inserted { table, count }) => {
            Ok(format!("Result: inserted {} row(s) into {}", count, table))
        }
        Ok(StatementResult::Deleted { table, count }) => {
            Ok(format!("Result: deleted {} row(s) from {}", count, table))
        }
        Err(e) => Err(format!("Error: {}", e)),
    }
}

/// Reads statements from `input` until `exit` or end of input.
pub fn run<R, W, E>(db: &Database, input: R, out: &mut W, err: &mut E) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    writeln!(out, "{}", BANNER)?;
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match handle_line(db, &line) {
            ReplAction::Skip => {}
            ReplAction::Exit => break,
            ReplAction::Output(text) => writeln!(out, "{}", text)?,
            ReplAction::Error(message) => {
                debug!(%message, "statement failed");
                writeln!(err, "{}", message)?;
            }
        }
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }

    writeln!(out, "{}", FAREWELL)?;
    Ok(())
}
