//! Natural-language phrase translator.
//!
//! Turns a free-text phrase into a concrete command line by evaluating the
//! pattern library in priority order. Purely functional: translation never
//! touches the filesystem or process tables; only the dispatcher executes,
//! and only after a `Resolved` result (an `Ambiguous` guess is shown, never
//! run).

use crate::patterns::RuleSet;
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of one translation attempt. Exactly one variant per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TranslationResult {
    /// A rule matched; the rendered command line is ready to dispatch.
    Resolved { command_line: String },
    /// No rule matched, but some share keywords with the phrase. Candidate
    /// command lines, best overlap first.
    Ambiguous { suggestions: Vec<String> },
    /// The phrase shares no keywords with any rule.
    Unrecognized,
}

pub struct Translator {
    rules: RuleSet,
    max_suggestions: usize,
}

impl Translator {
    pub fn new(rules: RuleSet, max_suggestions: usize) -> Self {
        Self {
            rules,
            max_suggestions: max_suggestions.max(1),
        }
    }

    /// Translate a phrase. First matching rule by priority wins; otherwise
    /// near matches (>= 1 shared keyword) are ranked by overlap count with
    /// rule priority breaking ties.
    pub fn translate(&self, phrase: &str) -> TranslationResult {
        let phrase = normalize(phrase);
        if phrase.is_empty() {
            return TranslationResult::Unrecognized;
        }

        for rule in self.rules.iter() {
            if let Some(captures) = rule.try_match(&phrase) {
                return TranslationResult::Resolved {
                    command_line: rule.render(&captures),
                };
            }
        }

        let words: HashSet<&str> = phrase.split(' ').collect();
        let mut near: Vec<(usize, usize, &str)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let overlap = rule.keyword_overlap(&words);
                (overlap > 0).then_some((overlap, index, rule.hint))
            })
            .collect();

        if near.is_empty() {
            return TranslationResult::Unrecognized;
        }

        // Best overlap first; the rule table's evaluation order (priority,
        // then declaration) breaks ties via the index.
        near.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut seen = HashSet::new();
        let suggestions: Vec<String> = near
            .into_iter()
            .map(|(_, _, hint)| hint.to_string())
            .filter(|hint| seen.insert(hint.clone()))
            .take(self.max_suggestions)
            .collect();

        TranslationResult::Ambiguous { suggestions }
    }

    /// Usage text for a bare `ai` invocation.
    pub fn help_text() -> &'static str {
        "\
Natural language commands - examples:

File operations:
  ai create a file named test.txt      -> touch test.txt
  ai make a folder called projects     -> mkdir projects
  ai delete the file old.txt           -> rm old.txt
  ai read the file config.json         -> cat config.json
  ai copy notes.txt to backup          -> cp notes.txt backup
  ai list files in documents           -> ls documents

Navigation:
  ai go to the home directory          -> cd
  ai go up                             -> cd ..
  ai where am i                        -> pwd

Search:
  ai find files named config           -> find config
  ai search for \"error\" in app.log     -> grep \"error\" app.log

System monitoring:
  ai show cpu usage                    -> cpu
  ai what is the memory usage          -> memory
  ai list running processes            -> ps

Usage: ai <phrase>. A resolved command runs immediately; when the phrase is
only close to known patterns, numbered suggestions are shown instead and
nothing is executed."
    }
}

/// Lowercase, collapse runs of whitespace, and trim trailing punctuation.
fn normalize(phrase: &str) -> String {
    let collapsed = phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_string()
}
