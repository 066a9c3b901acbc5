//! Interactive question loop.
//!
//! Reads one question per line, asks the model, and prints the answer. JSON
//! answers are pretty-printed; anything else is printed as received.

use crate::error::QueryError;
use crate::llm::{explain, ClientFactory};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const WELCOME: &str = "Willkommen! Geben Sie Ihre Frage ein (oder 'exit' zum Beenden):";
pub const PROMPT: &str = "\nIhre Frage: ";
pub const FAREWELL: &str = "\nProgramm beendet. Auf Wiedersehen!";
pub const EMPTY_INPUT_WARNING: &str = "⚠ Bitte geben Sie eine gültige Frage ein.";
pub const ANSWER_HEADER: &str = "\nAntwort des Modells:\n";

const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Leave the loop.
    Exit,
    /// Nothing but whitespace was entered.
    Empty,
    /// A trimmed question for the model.
    Question(&'a str),
}

/// Classify a raw input line.
pub fn parse_command(line: &str) -> Command<'_> {
    let input = line.trim();
    if EXIT_KEYWORDS
        .iter()
        .any(|keyword| input.eq_ignore_ascii_case(keyword))
    {
        Command::Exit
    } else if input.is_empty() {
        Command::Empty
    } else {
        Command::Question(input)
    }
}

/// Turn a query result into the text shown to the user.
///
/// Replies that parse as JSON are re-indented with non-ASCII characters kept
/// as is; other replies and errors are returned unchanged.
pub fn render_response(result: &Result<String, QueryError>) -> String {
    match result {
        Ok(text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.clone()),
            Err(_) => text.clone(),
        },
        Err(e) => e.to_string(),
    }
}

/// Ask a single question and print the answer block.
pub async fn respond<W, F>(output: &mut W, factory: &F, model: &str, question: &str) -> Result<()>
where
    W: Write,
    F: ClientFactory,
{
    let result = explain(factory, model, question).await;
    writeln!(output, "{}", ANSWER_HEADER)?;
    writeln!(output, "{}", render_response(&result))?;
    Ok(())
}

/// Answer one question given on the command line.
pub async fn answer_once<W, F>(output: &mut W, factory: &F, model: &str, question: &str) -> Result<()>
where
    W: Write,
    F: ClientFactory,
{
    match parse_command(question) {
        Command::Exit => writeln!(output, "{}", FAREWELL)?,
        Command::Empty => writeln!(output, "{}", EMPTY_INPUT_WARNING)?,
        Command::Question(question) => respond(output, factory, model, question).await?,
    }
    Ok(())
}

/// Run the loop until the user exits or input ends.
pub async fn run<R, W, F>(input: R, output: &mut W, factory: &F, model: &str) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: ClientFactory,
{
    writeln!(output, "{}", WELCOME)?;
    let mut lines = input.lines();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            debug!("Input closed");
            writeln!(output)?;
            return Ok(());
        };

        match parse_command(&line) {
            Command::Exit => {
                writeln!(output, "{}", FAREWELL)?;
                return Ok(());
            }
            Command::Empty => {
                writeln!(output, "{}", EMPTY_INPUT_WARNING)?;
            }
            Command::Question(question) => {
                respond(output, factory, model, question).await?;
            }
        }
    }
}
