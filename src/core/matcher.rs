//! Interest matching
//!
//! For every selected interest the matcher runs one remote query, checks each
//! returned change's files against the interest's specs, and merges the hits
//! into a single result map keyed by change id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::query::{effective_query, QueryTransport};
use super::records::{extract_changes, Change, FileEntry, Owner};
use crate::error::Result;

/// A named rule: a server-side query plus the file specs to apply to its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub query: String,
    #[serde(default)]
    pub specs: Vec<Spec>,
}

/// Accepted type tags and path substrings for a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "path")]
    pub paths: Vec<String>,
}

impl Spec {
    pub fn new<T, P>(types: T, paths: P) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, file: &FileEntry) -> bool {
        let kind = file.normalized_type();
        if !self.types.iter().any(|t| *t == kind) {
            return false;
        }
        self.paths.iter().any(|p| file.file.contains(p.as_str()))
    }
}

/// A file that satisfied a spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&FileEntry> for FileMatch {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.file.clone(),
            kind: entry.normalized_type(),
        }
    }
}

/// Snapshot of the change fields shown in results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub id: String,
    pub url: String,
    pub subject: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl From<&Change> for ChangeSummary {
    fn from(change: &Change) -> Self {
        Self {
            id: change.id.clone(),
            url: change.url.clone(),
            subject: change.subject().to_string(),
            status: change.status.clone(),
            number: change.number_label(),
            patch_set: change.patch_set_label(),
            owner: change.owner.as_ref().and_then(Owner::display_name).map(str::to_string),
            project: change.project.clone(),
            branch: change.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub summary: ChangeSummary,
    pub matches: Vec<FileMatch>,
}

/// Results keyed by change id, in order of first match.
pub type MatchResults = IndexMap<String, MatchResult>;

pub struct InterestMatcher<T> {
    transport: T,
    after: Option<String>,
}

impl<T: QueryTransport> InterestMatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, after: None }
    }

    pub fn with_after<S: Into<String>>(mut self, after: Option<S>) -> Self {
        self.after = after.map(Into::into);
        self
    }

    /// Evaluate `interests` in order and merge their matches per change.
    ///
    /// The first transport or parse failure aborts the run.
    pub fn find<'a, I>(&self, interests: I) -> Result<MatchResults>
    where
        I: IntoIterator<Item = (&'a str, &'a Interest)>,
    {
        let mut results = MatchResults::new();

        for (name, interest) in interests {
            tracing::info!("processing interest = {}", name);
            let matches = self.handle_interest(interest)?;
            tracing::debug!("interest {} matched {} change(s)", name, matches.len());

            for (summary, file_matches) in matches {
                results
                    .entry(summary.id.clone())
                    .or_insert_with(|| MatchResult {
                        summary,
                        matches: Vec::new(),
                    })
                    .matches
                    .extend(file_matches);
            }
        }

        Ok(results)
    }

    /// Query the server for one interest and match its specs.
    ///
    /// Pairs come out spec by spec, then in server order.
    pub fn handle_interest(&self, interest: &Interest) -> Result<Vec<(ChangeSummary, Vec<FileMatch>)>> {
        let query = effective_query(&interest.query, self.after.as_deref());
        tracing::debug!("gerrit query = {}", query);

        let doc = self.transport.run_query(&query)?;
        let changes = extract_changes(&doc)?;

        Ok(match_specs(&interest.specs, &changes))
    }
}

/// Match every spec against every change, keeping non-empty hits.
pub fn match_specs(specs: &[Spec], changes: &[Change]) -> Vec<(ChangeSummary, Vec<FileMatch>)> {
    let mut matches = Vec::new();

    for spec in specs {
        for change in changes {
            let file_matches: Vec<FileMatch> = change
                .files()
                .iter()
                .filter(|file| spec.matches(file))
                .map(FileMatch::from)
                .collect();

            if !file_matches.is_empty() {
                matches.push((ChangeSummary::from(change), file_matches));
            }
        }
    }

    matches
}
