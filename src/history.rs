//! Session command history.
//!
//! `History` is the in-memory record: append-only, capped with oldest-first
//! eviction, sequence numbers monotonic across evictions. `HistoryStore`
//! persists entries as newline-delimited text in a per-user file
//! (~/.nlshell_history by default); a missing file at startup is an empty
//! history, not an error.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub raw_input: String,
    pub sequence: u64,
}

/// In-memory, append-only command history.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    next_sequence: u64,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
            next_sequence: 1,
        }
    }

    /// Append one entry, evicting the oldest past the cap. Returns the
    /// assigned sequence number.
    pub fn record(&mut self, raw_input: &str) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(HistoryEntry {
            raw_input: raw_input.to_string(),
            sequence,
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        sequence
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The most recent `count` entries, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &HistoryEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The only removal operation besides eviction.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Candidate completions for a partial input: known verbs first, then
    /// distinct history lines sharing the prefix, most recent first.
    pub fn complete(&self, prefix: &str, verbs: &[&str]) -> Vec<String> {
        let mut candidates: Vec<String> = verbs
            .iter()
            .filter(|v| v.starts_with(prefix) && !prefix.is_empty())
            .map(|v| v.to_string())
            .collect();
        for entry in self.entries.iter().rev() {
            if entry.raw_input.starts_with(prefix)
                && !prefix.is_empty()
                && !candidates.contains(&entry.raw_input)
            {
                candidates.push(entry.raw_input.clone());
            }
        }
        candidates
    }
}

/// Durable newline-delimited history log.
pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Default per-user location.
    pub fn default_path(home: &std::path::Path) -> PathBuf {
        home.join(".nlshell_history")
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load persisted lines. Missing file means empty history.
    pub async fn load(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read history file {}", self.path.display())
            }),
        }
    }

    /// Append one command line.
    pub async fn append(&self, line: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("failed to create history directory")?;
            }
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| {
                format!("failed to open history file {}", self.path.display())
            })?;
        file.write_all(format!("{}\n", line).as_bytes())
            .await
            .context("failed to append history entry")?;
        Ok(())
    }

    /// Truncate the persisted log (history clear).
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match fs::write(&self.path, "").await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to clear history file {}", self.path.display())
            }),
        }
    }
}
