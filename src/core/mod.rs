//! Core functionality module
//!
//! Contains remote query invocation, change record parsing, and interest matching

pub mod query;
pub mod records;
pub mod matcher;

// Re-export main types
pub use query::{effective_query, normalize_after, QueryTransport, SshTransport};
pub use records::{extract_changes, Change, FileEntry, Owner, PatchSet};
pub use matcher::{ChangeSummary, FileMatch, Interest, InterestMatcher, MatchResult, MatchResults, Spec};
