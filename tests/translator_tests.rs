//! End-to-end translation coverage: natural-language phrases through the
//! built-in rule table, checked against the exact command lines they
//! produce.

use nlshell::patterns::RuleSet;
use nlshell::translator::{TranslationResult, Translator};

fn translator() -> Translator {
    Translator::new(RuleSet::builtin().unwrap(), 3)
}

fn resolved(phrase: &str) -> String {
    match translator().translate(phrase) {
        TranslationResult::Resolved { command_line } => command_line,
        other => panic!("expected Resolved for {:?}, got {:?}", phrase, other),
    }
}

#[test]
fn test_file_operation_phrases() {
    let cases = [
        ("create a file named test.txt", "touch test.txt"),
        ("make a new file called notes.md", "touch notes.md"),
        ("make a folder called projects", "mkdir projects"),
        ("create directory named build", "mkdir build"),
        ("delete the file old.txt", "rm old.txt"),
        ("remove the folder build", "rm build"),
        ("read the file config.json", "cat config.json"),
        ("show me the contents of readme.md", "cat readme.md"),
        ("copy notes.txt to backup", "cp notes.txt backup"),
        ("move draft.txt to final.txt", "mv draft.txt final.txt"),
        ("rename a.txt to b.txt", "mv a.txt b.txt"),
    ];
    for (phrase, expected) in cases {
        assert_eq!(resolved(phrase), expected, "phrase {:?}", phrase);
    }
}

#[test]
fn test_navigation_phrases() {
    let cases = [
        ("go to the home directory", "cd"),
        ("go up", "cd .."),
        ("go back", "cd .."),
        ("where am i", "pwd"),
        ("go to the documents folder", "cd documents"),
        ("list files in the current directory", "ls"),
        ("list files in documents", "ls documents"),
        ("show all files", "ls"),
    ];
    for (phrase, expected) in cases {
        assert_eq!(resolved(phrase), expected, "phrase {:?}", phrase);
    }
}

#[test]
fn test_monitoring_phrases() {
    let cases = [
        ("show cpu usage", "cpu"),
        ("what is the memory usage", "memory"),
        ("how much ram is used", "memory"),
        ("list running processes", "ps"),
        ("show the uptime", "uptime"),
        ("show disk space", "df"),
    ];
    for (phrase, expected) in cases {
        assert_eq!(resolved(phrase), expected, "phrase {:?}", phrase);
    }
}

#[test]
fn test_search_phrases() {
    assert_eq!(resolved("find files named config"), "find config");
    assert_eq!(
        resolved(r#"search for "error" in app.log"#),
        r#"grep "error" app.log"#
    );
}

#[test]
fn test_case_and_punctuation_insensitive() {
    assert_eq!(resolved("Show CPU Usage!"), "cpu");
    assert_eq!(resolved("  CREATE   a file named  X.TXT  "), "touch x.txt");
}

#[test]
fn test_monitoring_beats_generic_show() {
    // "show" alone would satisfy the listing rules; monitoring rules have
    // to win when their nouns are present.
    assert_eq!(resolved("show processes"), "ps");
    assert_eq!(resolved("show memory"), "memory");
}

#[test]
fn test_unrecognized_phrase() {
    assert_eq!(
        translator().translate("transmogrify the widget"),
        TranslationResult::Unrecognized
    );
}

#[test]
fn test_ambiguous_phrase_yields_capped_ranked_suggestions() {
    match translator().translate("this file delete") {
        TranslationResult::Ambiguous { suggestions } => {
            assert!(!suggestions.is_empty() && suggestions.len() <= 3);
            assert_eq!(suggestions[0], "rm <path>");
        }
        other => panic!("expected Ambiguous, got {:?}", other),
    }
}

#[test]
fn test_translation_is_deterministic() {
    let t = translator();
    let first = t.translate("delete the file old.txt");
    for _ in 0..5 {
        assert_eq!(t.translate("delete the file old.txt"), first);
    }
}
