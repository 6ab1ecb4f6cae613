//! nlshell - interactive shell with natural-language command translation
//!
//! Modules:
//! - tokenizer: Quote-aware splitting of raw input into verb + args
//! - patterns: Ordered regex pattern library for natural-language phrases
//! - translator: Phrase -> command-line translation (resolved/ambiguous)
//! - dispatcher: Verb execution against capability seams
//! - fs_cap: FileSystem capability trait and the local-disk implementation
//! - metrics: MetricsProvider capability trait backed by sysinfo
//! - history: Capped in-memory history plus the persistent history log
//! - config: YAML configuration with defaults
//! - session: The interactive read/translate/dispatch/report loop

pub mod config;
pub mod dispatcher;
pub mod fs_cap;
pub mod history;
pub mod metrics;
pub mod patterns;
pub mod session;
pub mod tokenizer;
pub mod translator;

// Re-export key types for convenience
pub use config::Config;

pub use dispatcher::{CommandResult, DispatchOutcome, Dispatcher, ErrorKind, KNOWN_VERBS};

pub use fs_cap::{Entry, EntryKind, FileSystem, FsError, LocalFileSystem, Metadata};

pub use history::{History, HistoryEntry, HistoryStore};

pub use metrics::{DiskStats, MemoryStats, MetricsProvider, ProcessInfo, SystemMetrics};

pub use patterns::{PatternRule, RuleSet};

pub use session::{LineOutcome, Session, SessionOptions};

pub use tokenizer::{tokenize, Token, TokenizeError};

pub use translator::{TranslationResult, Translator};
