//! Dispatcher behavior against a real (temporary) filesystem: the file and
//! directory verbs, path resolution relative to the tracked cwd, and the
//! history verb.

use nlshell::dispatcher::{DispatchOutcome, Dispatcher, ErrorKind};
use nlshell::fs_cap::LocalFileSystem;
use nlshell::history::History;
use nlshell::metrics::{DiskStats, MemoryStats, MetricsProvider, ProcessInfo};
use nlshell::tokenizer::tokenize;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct NullMetrics;

impl MetricsProvider for NullMetrics {
    fn cpu_percent(&mut self) -> f32 {
        0.0
    }

    fn memory(&mut self) -> MemoryStats {
        MemoryStats {
            used_bytes: 0,
            total_bytes: 0,
            percent: 0.0,
        }
    }

    fn processes(&mut self) -> Vec<ProcessInfo> {
        Vec::new()
    }

    fn uptime(&self) -> Duration {
        Duration::ZERO
    }

    fn disk_usage(&mut self, _path: &Path) -> Option<DiskStats> {
        None
    }
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    dispatcher: Dispatcher,
    history: History,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let dispatcher = Dispatcher::new(
            Box::new(LocalFileSystem::new()),
            Box::new(NullMetrics),
            root.clone(),
            root.clone(),
            Arc::new(AtomicBool::new(false)),
        );
        Self {
            _dir: dir,
            root,
            dispatcher,
            history: History::new(100),
        }
    }

    fn run(&mut self, line: &str) -> DispatchOutcome {
        self.dispatcher
            .dispatch(&tokenize(line).unwrap(), &mut self.history)
    }

    fn ok(&mut self, line: &str) -> String {
        let outcome = self.run(line);
        assert!(
            outcome.result.succeeded,
            "line {:?} failed: {}",
            line, outcome.result.output
        );
        outcome.result.output
    }
}

#[test]
fn test_mkdir_cd_pwd_roundtrip() {
    let mut fx = Fixture::new();
    fx.ok("mkdir work/inner");
    fx.ok("cd work/inner");
    assert_eq!(fx.ok("pwd"), fx.root.join("work/inner").display().to_string());
    fx.ok("cd ..");
    assert_eq!(fx.ok("pwd"), fx.root.join("work").display().to_string());
}

#[test]
fn test_cd_home_with_no_argument() {
    let mut fx = Fixture::new();
    fx.ok("mkdir sub");
    fx.ok("cd sub");
    fx.ok("cd");
    assert_eq!(fx.ok("pwd"), fx.root.display().to_string());
}

#[test]
fn test_touch_appears_once_in_listing() {
    let mut fx = Fixture::new();
    fx.ok("touch a.txt");
    let listing = fx.ok("ls");
    assert_eq!(listing.matches("a.txt").count(), 1);

    // Touching again neither errors nor duplicates.
    fx.ok("touch a.txt");
    let listing = fx.ok("ls");
    assert_eq!(listing.matches("a.txt").count(), 1);
}

#[test]
fn test_ls_marks_directories() {
    let mut fx = Fixture::new();
    fx.ok("mkdir sub");
    fx.ok("touch file.txt");
    let listing = fx.ok("ls");
    let lines: Vec<&str> = listing.lines().collect();
    assert!(lines.iter().any(|l| l.starts_with("- ") && l.ends_with("file.txt")));
    assert!(lines.iter().any(|l| l.starts_with("d ") && l.ends_with("sub/")));
}

#[test]
fn test_write_cat_head_tail() {
    let mut fx = Fixture::new();
    fx.ok("write lines.txt one");
    let body: String = (1..=30).map(|i| format!("row {}\n", i)).collect();
    std::fs::write(fx.root.join("lines.txt"), &body).unwrap();

    assert_eq!(fx.ok("head lines.txt").lines().count(), 10);
    assert_eq!(fx.ok("head lines.txt 2"), "row 1\nrow 2");
    assert_eq!(fx.ok("tail lines.txt 2"), "row 29\nrow 30");
}

#[test]
fn test_cp_file_into_directory() {
    let mut fx = Fixture::new();
    fx.ok("mkdir backup");
    fx.ok("write note.txt hello");
    fx.ok("cp note.txt backup");
    assert_eq!(
        std::fs::read_to_string(fx.root.join("backup/note.txt")).unwrap(),
        "hello"
    );
    // Source survives a copy.
    assert!(fx.root.join("note.txt").is_file());
}

#[test]
fn test_cp_directory_recursively() {
    let mut fx = Fixture::new();
    fx.ok("mkdir src/deep");
    fx.ok("write src/deep/f.txt data");
    fx.ok("cp src dst");
    assert_eq!(
        std::fs::read_to_string(fx.root.join("dst/deep/f.txt")).unwrap(),
        "data"
    );
}

#[test]
fn test_mv_renames_and_removes_source() {
    let mut fx = Fixture::new();
    fx.ok("write old.txt x");
    fx.ok("mv old.txt new.txt");
    assert!(!fx.root.join("old.txt").exists());
    assert!(fx.root.join("new.txt").is_file());
}

#[test]
fn test_rm_directory_tree() {
    let mut fx = Fixture::new();
    fx.ok("mkdir tree/deep");
    fx.ok("touch tree/deep/f.txt");
    fx.ok("rm tree");
    assert!(!fx.root.join("tree").exists());
}

#[test]
fn test_missing_file_errors_are_structured() {
    let mut fx = Fixture::new();
    let cases = [
        ("cat nope.txt", ErrorKind::NotFound),
        ("rm nope.txt", ErrorKind::NotFound),
        ("cd nope", ErrorKind::NotFound),
        ("cp nope.txt other.txt", ErrorKind::NotFound),
    ];
    for (line, expected) in cases {
        let outcome = fx.run(line);
        assert_eq!(outcome.result.error_kind, Some(expected), "line {:?}", line);
        assert!(!outcome.result.succeeded);
    }
}

#[test]
fn test_find_searches_nested_directories() {
    let mut fx = Fixture::new();
    fx.ok("mkdir a/b");
    fx.ok("touch a/b/report.txt");
    fx.ok("touch other.log");

    let output = fx.ok("find report");
    assert!(output.contains("report.txt"));
    assert_eq!(output.lines().count(), 1);

    assert_eq!(fx.ok("find zzz"), "No files found matching 'zzz'");
}

#[test]
fn test_grep_reports_file_and_line() {
    let mut fx = Fixture::new();
    std::fs::write(fx.root.join("app.log"), "boot\nerror one\nfine\nerror two\n").unwrap();
    let output = fx.ok("grep error app.log");
    assert_eq!(output, "app.log:2:error one\napp.log:4:error two");
}

#[test]
fn test_du_sums_file_sizes() {
    let mut fx = Fixture::new();
    std::fs::write(fx.root.join("x.bin"), vec![0u8; 1024 * 1024]).unwrap();
    let output = fx.ok("du");
    assert!(output.starts_with("1.00 MB"), "got {:?}", output);
}

#[test]
fn test_history_eviction_visible_through_verb() {
    let mut fx = Fixture::new();
    fx.history = History::new(3);
    for line in ["pwd", "ls", "date", "whoami", "echo hi"] {
        fx.history.record(line);
    }
    let output = fx.ok("history");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("date"));
    assert!(lines[2].ends_with("echo hi"));
}

#[test]
fn test_tilde_resolves_to_home() {
    let mut fx = Fixture::new();
    fx.ok("mkdir sub");
    fx.ok("cd sub");
    fx.ok("touch ~/at_home.txt");
    assert!(fx.root.join("at_home.txt").is_file());
}
