//! Interactive session loop.
//!
//! Owns the read -> translate -> dispatch -> report cycle: prompts, records
//! every non-blank line into history (before dispatch, so interrupts never
//! lose an entry), intercepts the `ai` verb for translation, and renders
//! results either as plain text or JSON lines. A Ctrl-C during a long
//! dispatch sets the shared interrupt flag; the command unwinds with an
//! `Interrupted` result and the loop keeps going.

use crate::dispatcher::{CommandResult, Dispatcher, ErrorKind};
use crate::history::{History, HistoryStore};
use crate::tokenizer::tokenize;
use crate::translator::{TranslationResult, Translator};
use anyhow::{Context, Result};
use std::io::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// What one input line produced. `result` is `None` for blank lines.
#[derive(Debug)]
pub struct LineOutcome {
    pub result: Option<CommandResult>,
    pub terminate: bool,
}

impl LineOutcome {
    fn skipped() -> Self {
        Self {
            result: None,
            terminate: false,
        }
    }
}

pub struct SessionOptions {
    /// Emit each result as one JSON object per line instead of plain text.
    pub json_output: bool,
}

pub struct Session {
    dispatcher: Dispatcher,
    translator: Translator,
    history: History,
    store: HistoryStore,
    interrupt: Arc<AtomicBool>,
    json_output: bool,
    user: String,
    host: String,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dispatcher: Dispatcher,
        translator: Translator,
        history: History,
        store: HistoryStore,
        interrupt: Arc<AtomicBool>,
        user: String,
        host: String,
        options: SessionOptions,
    ) -> Self {
        Self {
            dispatcher,
            translator,
            history,
            store,
            interrupt,
            json_output: options.json_output,
            user,
            host,
        }
    }

    /// Run until `exit`/`quit` or end of input. Returns the process exit code.
    pub async fn run(&mut self) -> Result<i32> {
        self.spawn_interrupt_watcher();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.print_prompt()?;
            let line = match lines.next_line().await.context("failed to read input")? {
                Some(line) => line,
                // EOF is a clean shutdown, same as `exit`.
                None => {
                    println!();
                    return Ok(0);
                }
            };
            let outcome = self.handle_line(&line).await?;
            if let Some(result) = &outcome.result {
                self.report(result);
            }
            if outcome.terminate {
                return Ok(0);
            }
        }
    }

    /// Process one raw input line through the full cycle. Public so tests can
    /// drive the session without a terminal.
    pub async fn handle_line(&mut self, line: &str) -> Result<LineOutcome> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(LineOutcome::skipped());
        }

        // Recorded before dispatch so an interrupted command still shows up.
        self.history.record(trimmed);
        if let Err(e) = self.store.append(trimmed).await {
            eprintln!("warning: {:#}", e);
        }
        self.interrupt.store(false, Ordering::Relaxed);

        let token = match tokenize(trimmed) {
            Ok(token) => token,
            Err(_) => return Ok(LineOutcome::skipped()),
        };

        if token.verb.eq_ignore_ascii_case("ai") {
            // The phrase is the raw remainder of the line, not the de-quoted
            // args: the quote-anchored patterns need the quotes intact.
            let phrase = trimmed
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or("");
            let result = self.handle_ai(phrase).await;
            return Ok(LineOutcome {
                result: Some(result),
                terminate: false,
            });
        }

        let outcome = self.dispatcher.dispatch(&token, &mut self.history);
        if token.verb.eq_ignore_ascii_case("history")
            && token.args.first().map(String::as_str) == Some("clear")
            && outcome.result.succeeded
        {
            if let Err(e) = self.store.clear().await {
                eprintln!("warning: {:#}", e);
            }
        }
        Ok(LineOutcome {
            result: Some(outcome.result),
            terminate: outcome.terminate,
        })
    }

    /// The `ai` verb: translate, then either run the resolved command or
    /// show suggestions without executing anything.
    async fn handle_ai(&mut self, phrase: &str) -> CommandResult {
        if phrase.is_empty() {
            return CommandResult::ok(Translator::help_text());
        }
        match self.translator.translate(phrase) {
            TranslationResult::Resolved { command_line } => {
                let resolved = match tokenize(&command_line) {
                    Ok(resolved) => resolved,
                    Err(_) => {
                        return CommandResult::fail(
                            ErrorKind::TranslationUnrecognized,
                            format!("ai: produced an empty command for '{}'", phrase),
                        );
                    }
                };
                let outcome = self.dispatcher.dispatch(&resolved, &mut self.history);
                let mut result = outcome.result;
                result.output = if result.output.is_empty() {
                    format!("-> {}", command_line)
                } else {
                    format!("-> {}\n{}", command_line, result.output)
                };
                result
            }
            TranslationResult::Ambiguous { suggestions } => {
                let mut lines = vec![format!("Not sure what '{}' means. Did you mean:", phrase)];
                for (i, suggestion) in suggestions.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, suggestion));
                }
                lines.push("Nothing was executed.".to_string());
                CommandResult::fail(ErrorKind::TranslationAmbiguous, lines.join("\n"))
            }
            TranslationResult::Unrecognized => CommandResult::fail(
                ErrorKind::TranslationUnrecognized,
                format!(
                    "Could not understand '{}'. Run 'ai' for example phrases.",
                    phrase
                ),
            ),
        }
    }

    fn print_prompt(&self) -> Result<()> {
        let cwd = self.dispatcher.cwd();
        let basename = cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| cwd.display().to_string());
        print!("{}@{}:{}$ ", self.user, self.host, basename);
        std::io::stdout().flush().context("failed to flush prompt")?;
        Ok(())
    }

    fn report(&self, result: &CommandResult) {
        if self.json_output {
            match serde_json::to_string(result) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("warning: failed to encode result: {}", e),
            }
            return;
        }
        if result.succeeded {
            if !result.output.is_empty() {
                println!("{}", result.output);
            }
        } else {
            eprintln!("{}", result.output);
        }
    }

    /// Each Ctrl-C only flags the in-flight command; the loop itself never
    /// exits on a signal.
    fn spawn_interrupt_watcher(&self) {
        let interrupt = self.interrupt.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                interrupt.store(true, Ordering::Relaxed);
            }
        });
    }

    /// Completion candidates for a partial input line: known verbs first,
    /// then matching history lines.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        self.history.complete(prefix, crate::dispatcher::KNOWN_VERBS)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_file(&self) -> &Path {
        self.store.path()
    }
}
