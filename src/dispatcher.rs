//! Command dispatcher.
//!
//! Maps a tokenized verb onto the filesystem or metrics capability, checks
//! arity first, and normalizes every outcome (including unknown verbs and
//! interrupts) into a `CommandResult`. Nothing escapes a dispatch cycle as a
//! panic or raw error. Relative paths resolve against the dispatcher's
//! tracked working directory.

use crate::fs_cap::{EntryKind, FileSystem, FsError};
use crate::history::History;
use crate::metrics::MetricsProvider;
use crate::tokenizer::Token;
use chrono::Local;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Uniform error classification surfaced in `CommandResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Arity,
    UnknownCommand,
    NotFound,
    PermissionDenied,
    AlreadyExists,
    NotEmpty,
    IsADirectory,
    NotADirectory,
    TranslationAmbiguous,
    TranslationUnrecognized,
    Interrupted,
    Io,
}

impl From<&FsError> for ErrorKind {
    fn from(err: &FsError) -> Self {
        match err {
            FsError::NotFound => ErrorKind::NotFound,
            FsError::PermissionDenied => ErrorKind::PermissionDenied,
            FsError::AlreadyExists => ErrorKind::AlreadyExists,
            FsError::NotEmpty => ErrorKind::NotEmpty,
            FsError::IsADirectory => ErrorKind::IsADirectory,
            FsError::NotADirectory => ErrorKind::NotADirectory,
            FsError::Io(_) => ErrorKind::Io,
        }
    }
}

/// The uniform result of one dispatch. Never partially populated: a failure
/// always carries an error kind and a one-line message in `output`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub succeeded: bool,
    pub output: String,
    pub error_kind: Option<ErrorKind>,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
            error_kind: None,
        }
    }

    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: message.into(),
            error_kind: Some(kind),
        }
    }
}

/// A dispatch result plus the loop-termination signal (`exit`/`quit`).
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub result: CommandResult,
    pub terminate: bool,
}

impl DispatchOutcome {
    fn of(result: CommandResult) -> Self {
        Self {
            result,
            terminate: false,
        }
    }
}

/// Every verb the dispatcher recognizes, for help and completions.
pub const KNOWN_VERBS: &[&str] = &[
    "ls", "cd", "pwd", "mkdir", "rm", "cp", "mv", "cat", "echo", "touch", "write", "cpu",
    "memory", "processes", "ps", "uptime", "df", "du", "find", "grep", "head", "tail",
    "clear", "history", "whoami", "date", "help", "exit", "quit", "ai",
];

/// ANSI clear-screen sequence emitted by the `clear` verb.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const DEFAULT_HEAD_TAIL_LINES: usize = 10;
const PROCESS_LIST_LIMIT: usize = 20;

const HELP_TEXT: &str = "\
Available commands:

File & directory operations:
  ls [path]              List files and directories
  cd [path]              Change directory (no argument: home)
  pwd                    Show current working directory
  mkdir <dir>...         Create directories
  rm <path>...           Remove files or directories
  cp <src> <dst>         Copy file or directory
  mv <src> <dst>         Move/rename file or directory
  cat <file>...          Display file contents
  touch <file>...        Create empty files
  write <file> <text>    Write text to a file
  echo <text>            Print text

System monitoring:
  cpu                    Show CPU usage
  memory                 Show memory usage
  processes, ps          Show running processes
  uptime                 Show system uptime
  df                     Show disk usage
  du [path]              Show directory size

Search & text:
  find <pattern> [path]  Find files by name substring
  grep <pattern> <file>  Search in file (substring match)
  head <file> [n]        Show first n lines (default 10)
  tail <file> [n]        Show last n lines (default 10)

Utilities:
  clear                  Clear screen
  history [n|clear]      Show or clear command history
  whoami                 Show current user
  date                   Show current date/time
  help                   Show this help
  exit, quit             Exit the shell

Natural language:
  ai <phrase>            Translate a phrase into a command and run it";

/// Executes resolved commands against the capability seams.
pub struct Dispatcher {
    fs: Box<dyn FileSystem>,
    metrics: Box<dyn MetricsProvider>,
    cwd: PathBuf,
    home: PathBuf,
    interrupt: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(
        fs: Box<dyn FileSystem>,
        metrics: Box<dyn MetricsProvider>,
        cwd: PathBuf,
        home: PathBuf,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fs,
            metrics,
            cwd,
            home,
            interrupt,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Execute one tokenized command. Exactly one capability call per
    /// recognized verb; every failure comes back as a structured result.
    pub fn dispatch(&mut self, token: &Token, history: &mut History) -> DispatchOutcome {
        let verb = token.verb.to_lowercase();
        let args = &token.args;

        let result = match verb.as_str() {
            "ls" => self.cmd_ls(args),
            "cd" => self.cmd_cd(args),
            "pwd" => CommandResult::ok(self.cwd.display().to_string()),
            "mkdir" => self.cmd_mkdir(args),
            "rm" => self.cmd_rm(args),
            "cp" => self.cmd_copy_move(args, "cp"),
            "mv" => self.cmd_copy_move(args, "mv"),
            "cat" => self.cmd_cat(args),
            "echo" => CommandResult::ok(args.join(" ")),
            "touch" => self.cmd_touch(args),
            "write" => self.cmd_write(args),
            "cpu" => CommandResult::ok(format!("CPU Usage: {:.1}%", self.metrics.cpu_percent())),
            "memory" => self.cmd_memory(),
            "processes" | "ps" => self.cmd_processes(),
            "uptime" => self.cmd_uptime(),
            "df" => self.cmd_df(),
            "du" => self.cmd_du(args),
            "find" => self.cmd_find(args),
            "grep" => self.cmd_grep(args),
            "head" => self.cmd_head_tail(args, "head"),
            "tail" => self.cmd_head_tail(args, "tail"),
            "clear" => CommandResult::ok(CLEAR_SCREEN),
            "history" => Self::cmd_history(args, history),
            "whoami" => CommandResult::ok(current_user()),
            "date" => CommandResult::ok(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            "help" => CommandResult::ok(HELP_TEXT),
            "exit" | "quit" => {
                return DispatchOutcome {
                    result: CommandResult::ok("Goodbye!"),
                    terminate: true,
                };
            }
            _ => CommandResult::fail(
                ErrorKind::UnknownCommand,
                format!("{}: command not found", token.verb),
            ),
        };

        DispatchOutcome::of(result)
    }

    // Path handling

    /// Resolve an argument against the tracked cwd, expanding `~` and
    /// collapsing `.`/`..` lexically.
    fn resolve(&self, raw: &str) -> PathBuf {
        let joined = if raw == "~" {
            self.home.clone()
        } else if let Some(rest) = raw.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.cwd.join(path)
            }
        };
        normalize_lexically(&joined)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    // File & directory verbs

    fn cmd_ls(&self, args: &[String]) -> CommandResult {
        let target = args.first().map(String::as_str).unwrap_or(".");
        let path = self.resolve(target);
        let mut entries = match self.fs.list(&path) {
            Ok(entries) => entries,
            Err(e) => return fs_fail("ls", target, e),
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let lines: Vec<String> = entries
            .into_iter()
            .map(|e| match e.kind {
                EntryKind::Dir => format!("d {:>10} {}/", e.size, e.name),
                EntryKind::File => format!("- {:>10} {}", e.size, e.name),
            })
            .collect();
        CommandResult::ok(lines.join("\n"))
    }

    fn cmd_cd(&mut self, args: &[String]) -> CommandResult {
        let target = args.first().map(String::as_str).unwrap_or("~");
        let path = self.resolve(target);
        match self.fs.metadata(&path) {
            Ok(meta) if meta.is_dir() => {
                self.cwd = path;
                CommandResult::ok("")
            }
            Ok(_) => CommandResult::fail(
                ErrorKind::NotADirectory,
                format!("cd: {}: Not a directory", target),
            ),
            Err(e) => fs_fail("cd", target, e),
        }
    }

    fn cmd_mkdir(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return arity_fail("mkdir", "mkdir <dir>...");
        }
        for raw in args {
            if let Err(e) = self.fs.make_dir(&self.resolve(raw)) {
                return fs_fail("mkdir", raw, e);
            }
        }
        CommandResult::ok("")
    }

    fn cmd_rm(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return arity_fail("rm", "rm <path>...");
        }
        for raw in args {
            if let Err(e) = self.fs.remove(&self.resolve(raw)) {
                return fs_fail("rm", raw, e);
            }
        }
        CommandResult::ok("")
    }

    fn cmd_copy_move(&self, args: &[String], verb: &str) -> CommandResult {
        if args.len() != 2 {
            return arity_fail(verb, &format!("{} <src> <dst>", verb));
        }
        let src = self.resolve(&args[0]);
        let dst = self.resolve(&args[1]);
        let outcome = if verb == "cp" {
            self.fs.copy(&src, &dst)
        } else {
            self.fs.rename(&src, &dst)
        };
        match outcome {
            Ok(()) => CommandResult::ok(""),
            Err(e) => fs_fail(verb, &args[0], e),
        }
    }

    fn cmd_cat(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return arity_fail("cat", "cat <file>...");
        }
        let mut output = Vec::new();
        for raw in args {
            match self.fs.read_to_string(&self.resolve(raw)) {
                Ok(content) => output.push(content),
                Err(e) => return fs_fail("cat", raw, e),
            }
        }
        CommandResult::ok(output.join("\n"))
    }

    fn cmd_touch(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return arity_fail("touch", "touch <file>...");
        }
        for raw in args {
            if let Err(e) = self.fs.create_empty(&self.resolve(raw)) {
                return fs_fail("touch", raw, e);
            }
        }
        CommandResult::ok("")
    }

    fn cmd_write(&self, args: &[String]) -> CommandResult {
        if args.len() < 2 {
            return arity_fail("write", "write <file> <text>");
        }
        let text = args[1..].join(" ");
        match self.fs.write_text(&self.resolve(&args[0]), &text) {
            Ok(()) => CommandResult::ok(""),
            Err(e) => fs_fail("write", &args[0], e),
        }
    }

    // Monitoring verbs. Percentages are fixed to one decimal so output is
    // comparable in tests.

    fn cmd_memory(&mut self) -> CommandResult {
        let stats = self.metrics.memory();
        let free = stats.total_bytes.saturating_sub(stats.used_bytes);
        CommandResult::ok(format!(
            "Memory Usage:\nTotal: {:.1} GB\nUsed: {:.1} GB ({:.1}%)\nFree: {:.1} GB",
            gigabytes(stats.total_bytes),
            gigabytes(stats.used_bytes),
            stats.percent,
            gigabytes(free),
        ))
    }

    fn cmd_processes(&mut self) -> CommandResult {
        let mut processes = self.metrics.processes();
        processes.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut lines = vec![format!("{:>6} {:<20} {:>6} {:>6}", "PID", "NAME", "CPU%", "MEM%")];
        for proc_ in processes.iter().take(PROCESS_LIST_LIMIT) {
            lines.push(format!(
                "{:>6} {:<20} {:>5.1}% {:>5.1}%",
                proc_.pid, proc_.name, proc_.cpu_percent, proc_.mem_percent
            ));
        }
        CommandResult::ok(lines.join("\n"))
    }

    fn cmd_uptime(&self) -> CommandResult {
        let secs = self.metrics.uptime().as_secs();
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let minutes = (secs % 3_600) / 60;
        CommandResult::ok(format!(
            "Uptime: {} days, {} hours, {} minutes",
            days, hours, minutes
        ))
    }

    fn cmd_df(&mut self) -> CommandResult {
        match self.metrics.disk_usage(&self.cwd) {
            Some(disk) => {
                let free = disk.total_bytes.saturating_sub(disk.used_bytes);
                CommandResult::ok(format!(
                    "Disk Usage:\nTotal: {:.1} GB\nUsed: {:.1} GB ({:.1}%)\nFree: {:.1} GB",
                    gigabytes(disk.total_bytes),
                    gigabytes(disk.used_bytes),
                    disk.percent,
                    gigabytes(free),
                ))
            }
            None => CommandResult::fail(ErrorKind::Io, "df: disk usage unavailable"),
        }
    }

    fn cmd_du(&self, args: &[String]) -> CommandResult {
        let target = args.first().map(String::as_str).unwrap_or(".");
        let path = self.resolve(target);
        let files = match self.fs.walk(&path) {
            Ok(files) => files,
            Err(e) => return fs_fail("du", target, e),
        };
        let mut total: u64 = 0;
        for file in files {
            if self.interrupted() {
                return CommandResult::fail(ErrorKind::Interrupted, "du: interrupted");
            }
            if let Ok(meta) = self.fs.metadata(&file) {
                total += meta.size;
            }
        }
        CommandResult::ok(format!(
            "{:.2} MB\t{}",
            total as f64 / (1024.0 * 1024.0),
            target
        ))
    }

    // Search & text verbs. Enumeration/read goes through the capability,
    // matching and slicing happen here.

    fn cmd_find(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return arity_fail("find", "find <pattern> [path]");
        }
        let pattern = &args[0];
        let target = args.get(1).map(String::as_str).unwrap_or(".");
        let files = match self.fs.walk(&self.resolve(target)) {
            Ok(files) => files,
            Err(e) => return fs_fail("find", target, e),
        };
        let mut matches = Vec::new();
        for file in files {
            if self.interrupted() {
                return CommandResult::fail(ErrorKind::Interrupted, "find: interrupted");
            }
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.contains(pattern.as_str()) {
                matches.push(file.display().to_string());
            }
        }
        if matches.is_empty() {
            CommandResult::ok(format!("No files found matching '{}'", pattern))
        } else {
            CommandResult::ok(matches.join("\n"))
        }
    }

    fn cmd_grep(&self, args: &[String]) -> CommandResult {
        if args.len() != 2 {
            return arity_fail("grep", "grep <pattern> <file>");
        }
        let pattern = &args[0];
        let file = &args[1];
        let content = match self.fs.read_to_string(&self.resolve(file)) {
            Ok(content) => content,
            Err(e) => return fs_fail("grep", file, e),
        };
        let mut matches = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if self.interrupted() {
                return CommandResult::fail(ErrorKind::Interrupted, "grep: interrupted");
            }
            // Substring match, not regex.
            if line.contains(pattern.as_str()) {
                matches.push(format!("{}:{}:{}", file, number + 1, line));
            }
        }
        if matches.is_empty() {
            CommandResult::ok(format!("No matches found for '{}'", pattern))
        } else {
            CommandResult::ok(matches.join("\n"))
        }
    }

    fn cmd_head_tail(&self, args: &[String], verb: &str) -> CommandResult {
        if args.is_empty() {
            return arity_fail(verb, &format!("{} <file> [lines]", verb));
        }
        let count = match args.get(1) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    return CommandResult::fail(
                        ErrorKind::Arity,
                        format!("{}: invalid line count '{}'", verb, raw),
                    );
                }
            },
            None => DEFAULT_HEAD_TAIL_LINES,
        };
        let content = match self.fs.read_to_string(&self.resolve(&args[0])) {
            Ok(content) => content,
            Err(e) => return fs_fail(verb, &args[0], e),
        };
        let lines: Vec<&str> = content.lines().collect();
        let selected: Vec<&str> = if verb == "head" {
            lines.iter().take(count).copied().collect()
        } else {
            let skip = lines.len().saturating_sub(count);
            lines.iter().skip(skip).copied().collect()
        };
        CommandResult::ok(selected.join("\n"))
    }

    // Utility verbs

    fn cmd_history(args: &[String], history: &mut History) -> CommandResult {
        match args.first().map(String::as_str) {
            Some("clear") => {
                history.clear();
                CommandResult::ok("")
            }
            Some(raw) => match raw.parse::<usize>() {
                Ok(count) => CommandResult::ok(render_history(history.tail(count))),
                Err(_) => CommandResult::fail(
                    ErrorKind::Arity,
                    format!("history: invalid argument '{}'", raw),
                ),
            },
            None => CommandResult::ok(render_history(history.entries())),
        }
    }
}

fn render_history<'a>(entries: impl Iterator<Item = &'a crate::history::HistoryEntry>) -> String {
    let lines: Vec<String> = entries
        .map(|e| format!("{:>5}  {}", e.sequence, e.raw_input))
        .collect();
    if lines.is_empty() {
        "No commands in history".to_string()
    } else {
        lines.join("\n")
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn arity_fail(verb: &str, usage: &str) -> CommandResult {
    CommandResult::fail(
        ErrorKind::Arity,
        format!("{}: missing operand (usage: {})", verb, usage),
    )
}

fn fs_fail(verb: &str, target: &str, err: FsError) -> CommandResult {
    CommandResult::fail(
        ErrorKind::from(&err),
        format!("{}: {}: {}", verb, target, err),
    )
}

fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

/// Collapse `.` and `..` components without touching the filesystem, so the
/// tracked cwd stays clean for fakes and prompts alike.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.is_absolute() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(if path.is_absolute() { "/" } else { "." })
    } else {
        out
    }
}
