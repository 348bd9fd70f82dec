//! Change records as reported by `gerrit query --format JSON`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Record type of the trailing summary line the server appends.
const STATS_RECORD: &str = "stats";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: String,
    pub url: String,
    pub status: String,
    pub commit_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    // Numbers are strings on older servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_patch_set: Option<PatchSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSet {
    #[serde(default)]
    pub number: Option<Value>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Change {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.commit_message.lines().next().unwrap_or("")
    }

    /// Files in the current patch set; empty when it has none.
    pub fn files(&self) -> &[FileEntry] {
        self.current_patch_set
            .as_ref()
            .map(|ps| ps.files.as_slice())
            .unwrap_or(&[])
    }

    pub fn number_label(&self) -> Option<String> {
        self.number.as_ref().and_then(value_label)
    }

    pub fn patch_set_label(&self) -> Option<String> {
        self.current_patch_set
            .as_ref()
            .and_then(|ps| ps.number.as_ref())
            .and_then(value_label)
    }
}

impl Owner {
    /// Name, falling back to username, then email.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}

fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl FileEntry {
    pub fn normalized_type(&self) -> String {
        self.kind.to_lowercase()
    }
}

/// Parse line-delimited query output into changes.
///
/// Stats records and records without a current patch set are skipped.
/// Any line that is not JSON, or a change missing a required field, fails
/// the whole document.
pub fn extract_changes(doc: &str) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for (idx, line) in doc.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Value =
            serde_json::from_str(line).map_err(|source| Error::Parse { line: line_no, source })?;

        if record.get("type").and_then(Value::as_str) == Some(STATS_RECORD) {
            tracing::debug!("skipping stats record on line {}", line_no);
            continue;
        }

        if record.get("currentPatchSet").is_none() {
            tracing::debug!("skipping record without currentPatchSet on line {}", line_no);
            continue;
        }

        let change: Change = serde_json::from_value(record)
            .map_err(|source| Error::Parse { line: line_no, source })?;
        changes.push(change);
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change_line(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","url":"https://review/{id}","status":"NEW","commitMessage":"Subject {id}\n\nBody","currentPatchSet":{{"number":1,"files":[{{"file":"foo/bar.py","type":"ADDED"}}]}}}}"#
        )
    }

    #[test]
    fn test_extract_skips_stats_and_partial_records() {
        let doc = format!(
            "{}\n{}\n{}\n",
            r#"{"type":"stats","rowCount":2}"#,
            change_line("I1"),
            r#"{"id":"I2","url":"u","status":"NEW","commitMessage":"m"}"#,
        );

        let changes = extract_changes(&doc).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, "I1");
    }

    #[test]
    fn test_extract_rejects_invalid_json() {
        let doc = format!("{}\nnot json\n", change_line("I1"));

        match extract_changes(&doc) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_rejects_change_missing_required_field() {
        let doc = r#"{"id":"I1","currentPatchSet":{"files":[]}}"#;
        assert!(matches!(extract_changes(doc), Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn test_extract_empty_document() {
        assert!(extract_changes("").unwrap().is_empty());
        assert!(extract_changes("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_patch_set_without_files() {
        let doc = r#"{"id":"I1","url":"u","status":"NEW","commitMessage":"m","currentPatchSet":{"number":"3"}}"#;
        let changes = extract_changes(doc).unwrap();
        assert!(changes[0].files().is_empty());
    }

    #[test]
    fn test_subject_of_empty_message() {
        let doc = r#"{"id":"I1","url":"u","status":"NEW","commitMessage":"","currentPatchSet":{"files":[]}}"#;
        let changes = extract_changes(doc).unwrap();
        assert_eq!(changes[0].subject(), "");
    }

    #[test]
    fn test_number_labels_accept_strings_and_integers() {
        let doc = concat!(
            r#"{"id":"I1","url":"u","status":"NEW","commitMessage":"m","number":"17","currentPatchSet":{"number":2}}"#,
            "\n",
            r#"{"id":"I2","url":"u","status":"NEW","commitMessage":"m","number":18,"owner":{"name":"Ada"},"currentPatchSet":{}}"#,
        );
        let changes = extract_changes(doc).unwrap();

        assert_eq!(changes[0].number_label().as_deref(), Some("17"));
        assert_eq!(changes[0].patch_set_label().as_deref(), Some("2"));
        assert_eq!(changes[1].number_label().as_deref(), Some("18"));
        assert_eq!(changes[1].patch_set_label(), None);
        assert_eq!(changes[1].owner.as_ref().and_then(Owner::display_name), Some("Ada"));
    }

    #[test]
    fn test_subject_and_normalized_type() {
        let changes = extract_changes(&change_line("I9")).unwrap();
        let change = &changes[0];

        assert_eq!(change.subject(), "Subject I9");
        assert_eq!(change.files()[0].normalized_type(), "added");
    }
}
