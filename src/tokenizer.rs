//! Line tokenizer for the shell read loop.
//!
//! Splits a raw input line into a verb plus arguments, honoring single and
//! double quote pairs. An unterminated quote extends to the end of the line
//! rather than failing; the translator relies on this when its resolved
//! command lines are re-tokenized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tokenized command line: the verb and its arguments in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub verb: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    /// The line was blank or whitespace-only.
    EmptyInput,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::EmptyInput => write!(f, "empty input"),
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenize a raw input line.
///
/// Leading/trailing whitespace is stripped before splitting. Splits happen on
/// whitespace outside quote pairs; quotes themselves are consumed. The verb's
/// case is preserved, matching is normalized downstream by the dispatcher.
pub fn tokenize(line: &str) -> Result<Token, TokenizeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(TokenizeError::EmptyInput);
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    // Set once a quote opens so that "" survives as an empty argument.
    let mut saw_quote = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                saw_quote = true;
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() || saw_quote {
                    parts.push(std::mem::take(&mut current));
                    saw_quote = false;
                }
            }
            None => current.push(ch),
        }
    }
    if !current.is_empty() || saw_quote {
        parts.push(current);
    }

    // A line of bare quotes yields an empty first part; the verb must be
    // non-empty for any accepted input.
    if parts[0].is_empty() {
        return Err(TokenizeError::EmptyInput);
    }

    let verb = parts.remove(0);
    Ok(Token { verb, args: parts })
}
