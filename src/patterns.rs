//! Pattern library for the natural-language translator.
//!
//! An ordered, immutable table of rules, each pairing a matcher regex with a
//! command template. Rules are built once at startup and evaluated in
//! ascending priority order; declaration order breaks ties. Matchers see the
//! normalized phrase (lowercased, whitespace collapsed) produced by the
//! translator.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;

/// Renders a matched rule into a concrete command line.
#[derive(Clone, Copy)]
pub enum CommandTemplate {
    /// Fixed command, no captures.
    Literal(&'static str),
    /// Built from the extracted captures.
    Build(fn(&[String]) -> String),
}

impl CommandTemplate {
    fn render(&self, captures: &[String]) -> String {
        match self {
            CommandTemplate::Literal(cmd) => (*cmd).to_string(),
            CommandTemplate::Build(build) => build(captures),
        }
    }
}

/// One translation rule. Immutable after construction.
pub struct PatternRule {
    pub name: &'static str,
    /// Lower tried first; ties resolved by declaration order.
    pub priority: i32,
    matcher: Regex,
    /// Keywords used for near-match ranking when no rule matches outright.
    pub keywords: &'static [&'static str],
    template: CommandTemplate,
    /// Usage-shaped command line shown as an ambiguous suggestion.
    pub hint: &'static str,
}

impl PatternRule {
    fn new(
        name: &'static str,
        priority: i32,
        pattern: &str,
        keywords: &'static [&'static str],
        template: CommandTemplate,
        hint: &'static str,
    ) -> Result<Self> {
        let matcher = Regex::new(pattern)
            .with_context(|| format!("pattern rule '{}' failed to compile", name))?;
        Ok(Self {
            name,
            priority,
            matcher,
            keywords,
            template,
            hint,
        })
    }

    /// Match against a normalized phrase, returning cleaned captures.
    pub fn try_match(&self, phrase: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(phrase)?;
        let extracted = (1..caps.len())
            .map(|i| {
                caps.get(i)
                    .map(|m| clean_capture(m.as_str()))
                    .unwrap_or_default()
            })
            .collect();
        Some(extracted)
    }

    /// Apply the command template to the extracted captures.
    pub fn render(&self, captures: &[String]) -> String {
        self.template.render(captures)
    }

    /// How many of this rule's keywords appear in the phrase.
    pub fn keyword_overlap(&self, words: &HashSet<&str>) -> usize {
        self.keywords.iter().filter(|k| words.contains(*k)).count()
    }
}

/// A captured fragment, trimmed of trailing punctuation and leading
/// stop-words ("the", "a").
fn clean_capture(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(['.', ',', '!', '?', ';', ':']);
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let mut start = 0;
    while start + 1 < words.len() && matches!(words[start], "the" | "a") {
        start += 1;
    }
    words[start..].join(" ")
}

fn arg(captures: &[String], index: usize) -> &str {
    captures.get(index).map(String::as_str).unwrap_or("")
}

fn tpl_grep(c: &[String]) -> String {
    format!("grep \"{}\" {}", arg(c, 0), arg(c, 1))
}

fn tpl_write(c: &[String]) -> String {
    format!("write {} \"{}\"", arg(c, 1), arg(c, 0))
}

fn tpl_cd(c: &[String]) -> String {
    format!("cd {}", arg(c, 0))
}

fn tpl_mkdir(c: &[String]) -> String {
    format!("mkdir {}", arg(c, 0))
}

fn tpl_touch(c: &[String]) -> String {
    format!("touch {}", arg(c, 0))
}

fn tpl_rm(c: &[String]) -> String {
    format!("rm {}", arg(c, 0))
}

fn tpl_cp(c: &[String]) -> String {
    format!("cp {} {}", arg(c, 0), arg(c, 1))
}

fn tpl_mv(c: &[String]) -> String {
    format!("mv {} {}", arg(c, 0), arg(c, 1))
}

fn tpl_cat(c: &[String]) -> String {
    format!("cat {}", arg(c, 0))
}

fn tpl_find(c: &[String]) -> String {
    format!("find {}", arg(c, 0))
}

fn tpl_ls(c: &[String]) -> String {
    let path = arg(c, 0);
    if path.is_empty() {
        "ls".to_string()
    } else {
        format!("ls {}", path)
    }
}

/// The process-wide rule table. Built at startup, read-only thereafter.
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    /// The built-in rule inventory.
    pub fn builtin() -> Result<Self> {
        use CommandTemplate::{Build, Literal};

        let mut rules = vec![
            // Quoted text search has to win before the file-name rules below.
            PatternRule::new(
                "search_text",
                10,
                r#"\b(?:search\s+for|find|grep)\s+"([^"]+)"\s+(?:in\s+)?(\S+)"#,
                &["search", "find", "grep", "text"],
                Build(tpl_grep),
                r#"grep "<text>" <file>"#,
            )?,
            PatternRule::new(
                "write_text",
                12,
                r#"\bwrite\s+"([^"]+)"\s+(?:to|in|into)\s+(?:the\s+)?(?:file\s+)?(\S+)"#,
                &["write", "text", "file"],
                Build(tpl_write),
                r#"write <file> "<text>""#,
            )?,
            // Monitoring phrases outrank the generic list/show rules so that
            // "show cpu usage" never turns into `ls cpu`.
            PatternRule::new(
                "cpu_usage",
                15,
                r"\bcpu\b",
                &["cpu", "usage", "processor"],
                Literal("cpu"),
                "cpu",
            )?,
            PatternRule::new(
                "memory_usage",
                16,
                r"\bmemory\b|\bram\b",
                &["memory", "ram", "usage"],
                Literal("memory"),
                "memory",
            )?,
            PatternRule::new(
                "running_processes",
                17,
                r"\bprocess(?:es)?\b|^ps\b",
                &["processes", "process", "running", "list"],
                Literal("ps"),
                "ps",
            )?,
            PatternRule::new(
                "system_info",
                18,
                r"\buptime\b|system\s+(?:info|status)",
                &["system", "status", "uptime", "info"],
                Literal("uptime"),
                "uptime",
            )?,
            PatternRule::new(
                "disk_usage",
                19,
                r"disk\s+(?:usage|space)|\bdf\b",
                &["disk", "space", "usage"],
                Literal("df"),
                "df",
            )?,
            PatternRule::new(
                "go_home",
                30,
                r"go\s+home|navigate\s+home|home\s+directory",
                &["go", "home", "directory"],
                Literal("cd"),
                "cd",
            )?,
            PatternRule::new(
                "go_up",
                31,
                r"go\s+(?:up|back)|parent\s+directory",
                &["go", "up", "back", "parent"],
                Literal("cd .."),
                "cd ..",
            )?,
            PatternRule::new(
                "current_directory",
                32,
                r"where\s+am\s+i|^(?:what\s+is\s+the\s+)?current\s+directory$|\bpwd\b",
                &["where", "current", "directory"],
                Literal("pwd"),
                "pwd",
            )?,
            PatternRule::new(
                "change_directory",
                35,
                r"\b(?:go\s+to|navigate\s+to|enter|cd)\s+(?:the\s+)?(\S+)",
                &["go", "navigate", "enter", "directory", "folder"],
                Build(tpl_cd),
                "cd <path>",
            )?,
            // Folder rules precede their file twins: "delete the folder x"
            // must not capture "folder" as a file name.
            PatternRule::new(
                "create_folder",
                40,
                r"\b(?:create|make|new)\s+(?:a\s+)?(?:folder|directory)\s+(?:named\s+|called\s+)?(\S+)",
                &["create", "make", "new", "folder", "directory"],
                Build(tpl_mkdir),
                "mkdir <dir>",
            )?,
            PatternRule::new(
                "create_file",
                41,
                r"\b(?:create|make|new)\s+(?:a\s+)?file\s+(?:named\s+|called\s+)?(\S+)",
                &["create", "make", "new", "file"],
                Build(tpl_touch),
                "touch <file>",
            )?,
            PatternRule::new(
                "delete_folder",
                42,
                r"\b(?:delete|remove)\s+(?:the\s+)?(?:folder|directory)\s+(?:named\s+|called\s+)?(\S+)",
                &["delete", "remove", "folder", "directory"],
                Build(tpl_rm),
                "rm <dir>",
            )?,
            PatternRule::new(
                "delete_file",
                43,
                r"\b(?:delete|remove|rm)\s+(?:the\s+)?(?:file\s+)?(?:named\s+|called\s+)?(\S+)",
                &["delete", "remove", "file"],
                Build(tpl_rm),
                "rm <path>",
            )?,
            PatternRule::new(
                "copy_file",
                45,
                r"\b(?:copy|cp)\s+(?:the\s+)?(?:file\s+)?(\S+)\s+(?:to\s+)?(\S+)",
                &["copy", "file"],
                Build(tpl_cp),
                "cp <src> <dst>",
            )?,
            PatternRule::new(
                "move_file",
                46,
                r"\b(?:move|mv|rename)\s+(?:the\s+)?(?:file\s+)?(\S+)\s+(?:to\s+)?(\S+)",
                &["move", "rename", "file"],
                Build(tpl_mv),
                "mv <src> <dst>",
            )?,
            PatternRule::new(
                "search_files",
                48,
                r"\b(?:find|search\s+for|locate)\s+(?:all\s+)?(?:the\s+)?(?:files?\s+)?(?:named\s+|called\s+|matching\s+)?(\S+)",
                &["find", "search", "locate", "files"],
                Build(tpl_find),
                "find <pattern>",
            )?,
            PatternRule::new(
                "read_file",
                50,
                r"\b(?:read|cat)\s+(?:the\s+)?(?:file\s+)?(?:named\s+|called\s+)?(\S+)",
                &["read", "file", "contents"],
                Build(tpl_cat),
                "cat <file>",
            )?,
            PatternRule::new(
                "show_contents",
                51,
                r"\bshow\s+(?:me\s+)?(?:the\s+)?contents\s+of\s+(?:the\s+)?(\S+)",
                &["show", "contents", "file"],
                Build(tpl_cat),
                "cat <file>",
            )?,
            PatternRule::new(
                "list_current",
                54,
                r"\b(?:list|show)\s+(?:the\s+)?files\s+in\s+(?:the\s+)?current\s+directory|^(?:list|show)\s+(?:all\s+)?files$|^ls$",
                &["list", "show", "files"],
                Literal("ls"),
                "ls",
            )?,
            PatternRule::new(
                "list_files",
                55,
                r"\b(?:list|show|ls)\s+(?:all\s+)?(?:the\s+)?(?:files\s+)?(?:in\s+)?(?:the\s+)?(\S+)",
                &["list", "show", "files", "directory"],
                Build(tpl_ls),
                "ls [path]",
            )?,
            PatternRule::new(
                "help",
                70,
                r"\bhelp\b|what\s+commands",
                &["help", "commands"],
                Literal("help"),
                "help",
            )?,
            PatternRule::new(
                "clear_screen",
                71,
                r"\bclear\b|^cls$",
                &["clear", "screen"],
                Literal("clear"),
                "clear",
            )?,
        ];

        // Stable sort: equal priorities keep declaration order.
        rules.sort_by_key(|r| r.priority);
        Ok(Self { rules })
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    fn first_match(phrase: &str) -> Option<(String, String)> {
        let set = rules();
        for rule in set.iter() {
            if let Some(caps) = rule.try_match(phrase) {
                return Some((rule.name.to_string(), rule.render(&caps)));
            }
        }
        None
    }

    #[test]
    fn test_priority_order_is_ascending() {
        let set = rules();
        let priorities: Vec<i32> = set.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_create_file_capture() {
        let (name, cmd) = first_match("create a file named test.txt").unwrap();
        assert_eq!(name, "create_file");
        assert_eq!(cmd, "touch test.txt");
    }

    #[test]
    fn test_folder_rule_wins_over_file_rule() {
        let (name, cmd) = first_match("delete the folder build").unwrap();
        assert_eq!(name, "delete_folder");
        assert_eq!(cmd, "rm build");
    }

    #[test]
    fn test_cpu_wins_over_list() {
        let (name, cmd) = first_match("show cpu usage").unwrap();
        assert_eq!(name, "cpu_usage");
        assert_eq!(cmd, "cpu");
    }

    #[test]
    fn test_quoted_search_text() {
        let (name, cmd) = first_match(r#"search for "error" in log.txt"#).unwrap();
        assert_eq!(name, "search_text");
        assert_eq!(cmd, r#"grep "error" log.txt"#);
    }

    #[test]
    fn test_find_anchor_words_skipped() {
        let (name, cmd) = first_match("find the file named config").unwrap();
        assert_eq!(name, "search_files");
        assert_eq!(cmd, "find config");
    }

    #[test]
    fn test_list_current_directory_phrase() {
        let (name, cmd) = first_match("list files in the current directory").unwrap();
        assert_eq!(name, "list_current");
        assert_eq!(cmd, "ls");
    }

    #[test]
    fn test_capture_trailing_punctuation_trimmed() {
        assert_eq!(clean_capture("test.txt."), "test.txt");
        assert_eq!(clean_capture("done!?"), "done");
    }

    #[test]
    fn test_capture_stop_words_stripped() {
        assert_eq!(clean_capture("the logs"), "logs");
        assert_eq!(clean_capture("a note"), "note");
        // A lone stop-word stays: it may genuinely be the argument.
        assert_eq!(clean_capture("the"), "the");
    }

    #[test]
    fn test_verb_alternations_respect_word_boundaries() {
        // "abcd" must not satisfy the `cd` alternation.
        let (name, cmd) = first_match("show abcd files").unwrap();
        assert_eq!(name, "list_files");
        assert_eq!(cmd, "ls abcd");
        // "confirm" must not satisfy `rm`.
        assert!(first_match("confirm things").is_none());
    }

    #[test]
    fn test_copy_with_to_anchor() {
        let (_, cmd) = first_match("copy a.txt to backup").unwrap();
        assert_eq!(cmd, "cp a.txt backup");
    }

    #[test]
    fn test_go_home() {
        let (name, cmd) = first_match("go to the home directory").unwrap();
        assert_eq!(name, "go_home");
        assert_eq!(cmd, "cd");
    }
}
