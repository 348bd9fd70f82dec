//! Review server remote resolution.
//!
//! A remote name such as `gerrit` is looked up in the local git config and
//! the resulting `ssh://` URL is split into the pieces the transport needs.

use std::path::Path;
use std::process::Command;

use url::Url;

use crate::error::{Error, Result};

/// Where the review server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GerritRemote {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    pub project: String,
    pub url: String,
}

impl GerritRemote {
    /// Parse an `ssh://[user@]host[:port]/project[.git]` URL.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if !url.starts_with("ssh://") {
            return Err(Error::Config(format!(
                "only ssh:// repository urls are supported, got '{}'",
                url
            )));
        }

        let parsed = Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid remote url '{}': {}", url, e)))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config(format!("remote url '{}' has no host", url)))?
            .to_string();

        let user = match parsed.username() {
            "" => None,
            user => Some(user.to_string()),
        };

        let path = parsed.path().strip_prefix('/').unwrap_or(parsed.path());
        let project = path.strip_suffix(".git").unwrap_or(path).to_string();

        Ok(Self {
            user,
            host,
            port: parsed.port(),
            project,
            url: url.to_string(),
        })
    }
}

/// Look up `remote.<name>.url` in the git config of the current directory.
pub fn resolve_git_remote(name: &str) -> Result<String> {
    resolve_git_remote_in(name, Path::new("."))
}

/// Look up `remote.<name>.url` in the git config of `repo_dir`.
pub fn resolve_git_remote_in(name: &str, repo_dir: &Path) -> Result<String> {
    let key = format!("remote.{}.url", name);
    let output = Command::new("git")
        .args(["config", "--get", &key])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::Config(format!("failed to run git: {}", e)))?;

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || url.is_empty() {
        return Err(Error::Config(format!(
            "failed to resolve remote name \"{}\"",
            name
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_url() {
        let remote = GerritRemote::parse("ssh://user@host:29418/project.git").unwrap();

        assert_eq!(remote.user.as_deref(), Some("user"));
        assert_eq!(remote.host, "host");
        assert_eq!(remote.port, Some(29418));
        assert_eq!(remote.project, "project");
    }

    #[test]
    fn test_parse_minimal_url() {
        let remote = GerritRemote::parse("ssh://host/project").unwrap();

        assert_eq!(remote.user, None);
        assert_eq!(remote.host, "host");
        assert_eq!(remote.port, None);
        assert_eq!(remote.project, "project");
    }

    #[test]
    fn test_parse_nested_project() {
        let remote = GerritRemote::parse("ssh://review.example.org:29418/openstack/nova.git\n").unwrap();
        assert_eq!(remote.project, "openstack/nova");
        assert_eq!(remote.url, "ssh://review.example.org:29418/openstack/nova.git");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        let err = GerritRemote::parse("https://review.example.org/project").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = GerritRemote::parse("git@github.com:org/project.git").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn test_resolve_configured_remote() {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "--quiet"]);
        run_git(
            dir.path(),
            &["config", "remote.gerrit.url", "ssh://alice@review.example.org:29418/demo.git"],
        );

        let url = resolve_git_remote_in("gerrit", dir.path()).unwrap();
        assert_eq!(url, "ssh://alice@review.example.org:29418/demo.git");

        let remote = GerritRemote::parse(&url).unwrap();
        assert_eq!(remote.user.as_deref(), Some("alice"));
        assert_eq!(remote.project, "demo");
    }

    #[test]
    fn test_resolve_unknown_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_git_remote_in("no-such-remote", dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
