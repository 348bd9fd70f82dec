//! Configuration management for interesting
//!
//! This module loads the interests file and provides the run settings
//! (default remote name, interests path, transport program) with their
//! environment overrides.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::query::DEFAULT_SSH_PROGRAM;
use crate::core::Interest;
use crate::error::{Error, Result};

pub const DEFAULT_REMOTE: &str = "gerrit";
pub const DEFAULT_INTERESTS_FILE: &str = "interests.yaml";

/// Interest definitions keyed by name, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestsFile {
    pub interests: IndexMap<String, Interest>,
}

impl InterestsFile {
    /// Load interests from a YAML file, or TOML when the extension is `.toml`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let file = match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&content)?,
            _ => Self::from_yaml_str(&content)?,
        };

        tracing::debug!("loaded {} interest(s) from {}", file.len(), path.display());
        Ok(file)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document is an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut file: Self = serde_yaml::from_str(content)?;
        file.lowercase_types();
        Ok(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut file: Self = toml::from_str(content)?;
        file.lowercase_types();
        Ok(file)
    }

    /// File type tags are compared lowercased, so spec tags must be too.
    fn lowercase_types(&mut self) {
        for (name, interest) in self.interests.iter_mut() {
            for spec in interest.specs.iter_mut() {
                for tag in spec.types.iter_mut() {
                    let lower = tag.to_lowercase();
                    if lower != *tag {
                        tracing::warn!("interest '{}': type '{}' read as '{}'", name, tag, lower);
                        *tag = lower;
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.interests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Interest> {
        self.interests.get(name)
    }

    /// Pick the interests to evaluate, keeping file order.
    ///
    /// An empty `names` selects everything. Unknown names are reported and
    /// otherwise ignored.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Vec<(&str, &Interest)> {
        if names.is_empty() {
            return self
                .interests
                .iter()
                .map(|(name, interest)| (name.as_str(), interest))
                .collect();
        }

        for name in names {
            if !self.interests.contains_key(name.as_ref()) {
                tracing::warn!("no interest named '{}'", name.as_ref());
            }
        }

        self.interests
            .iter()
            .filter(|(name, _)| names.iter().any(|n| n.as_ref() == name.as_str()))
            .map(|(name, interest)| (name.as_str(), interest))
            .collect()
    }

    /// Validate interest definitions
    pub fn validate(&self) -> Result<()> {
        for (name, interest) in &self.interests {
            if interest.query.trim().is_empty() {
                return Err(Error::Config(format!("interest '{}' has an empty query", name)));
            }

            for (idx, spec) in interest.specs.iter().enumerate() {
                if spec.types.is_empty() {
                    return Err(Error::Config(format!(
                        "interest '{}' spec {} has no types",
                        name, idx
                    )));
                }
                if spec.paths.is_empty() {
                    return Err(Error::Config(format!(
                        "interest '{}' spec {} has no paths",
                        name, idx
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Run settings that are not tied to a single invocation's arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Git remote name pointing at the review server
    pub remote: String,
    /// Path of the interests file
    pub interests_file: PathBuf,
    /// Program used to reach the review server
    pub ssh_program: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            interests_file: PathBuf::from(DEFAULT_INTERESTS_FILE),
            ssh_program: DEFAULT_SSH_PROGRAM.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(val) = std::env::var("INTERESTING_REMOTE") {
            if !val.is_empty() {
                settings.remote = val;
            }
        }

        if let Ok(val) = std::env::var("INTERESTING_INTERESTS") {
            if !val.is_empty() {
                settings.interests_file = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("INTERESTING_SSH") {
            if !val.is_empty() {
                settings.ssh_program = val;
            }
        }

        settings
    }
}
