//! Remote query invocation
//!
//! Builds the effective query string for an interest and runs it against the
//! review server through a [`QueryTransport`]. The transport returns the raw
//! JSON-lines text; nothing is parsed here.

use std::process::Command;

use chrono::{NaiveDate, TimeDelta, Utc};

use crate::error::{Error, Result};
use crate::remote::GerritRemote;

/// Remote command that answers change queries.
pub const GERRIT_COMMAND: &str = "gerrit";

/// Default program used to reach the review server.
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Something that can run a change query on the review server.
///
/// Implementations are configured once with everything except the query.
pub trait QueryTransport {
    fn run_query(&self, query: &str) -> Result<String>;
}

impl<T: QueryTransport + ?Sized> QueryTransport for &T {
    fn run_query(&self, query: &str) -> Result<String> {
        (**self).run_query(query)
    }
}

/// Wrap `query` with an `after:` bound when one is given.
pub fn effective_query(query: &str, after: Option<&str>) -> String {
    match after {
        Some(after) => format!("({}) AND after:{}", query, after),
        None => query.to_string(),
    }
}

/// Turn relative shorthands ("7d", "2w", "1m") into an absolute date.
///
/// Any other value, including a shorthand reaching outside the calendar,
/// is handed to the server untouched.
pub fn normalize_after(after: &str) -> String {
    match relative_cutoff(after.trim()) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => after.to_string(),
    }
}

/// Today (UTC) minus `<count><unit>`, where unit is d, w or m (30 days).
fn relative_cutoff(s: &str) -> Option<NaiveDate> {
    let unit = s.chars().last()?;
    let days_per_unit: i64 = match unit.to_ascii_lowercase() {
        'd' => 1,
        'w' => 7,
        'm' => 30,
        _ => return None,
    };

    let count: u32 = s[..s.len() - unit.len_utf8()].parse().ok()?;
    let days = i64::from(count).checked_mul(days_per_unit)?;

    Utc::now()
        .date_naive()
        .checked_sub_signed(TimeDelta::try_days(days)?)
}

/// Runs `gerrit query` over ssh against a single server.
#[derive(Debug, Clone)]
pub struct SshTransport {
    program: String,
    user: Option<String>,
    host: String,
    port: Option<u16>,
}

impl SshTransport {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            program: DEFAULT_SSH_PROGRAM.to_string(),
            user: None,
            host: host.into(),
            port: None,
        }
    }

    pub fn from_remote(remote: &GerritRemote) -> Self {
        Self {
            program: DEFAULT_SSH_PROGRAM.to_string(),
            user: remote.user.clone(),
            host: remote.host.clone(),
            port: remote.port,
        }
    }

    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Arguments passed to the ssh program for `query`.
    pub fn command_args(&self, query: &str) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        let destination = match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        };
        args.push(destination);

        args.extend(
            [
                GERRIT_COMMAND,
                "query",
                "--current-patch-set",
                "--files",
                "--format",
                "JSON",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(query.to_string());

        args
    }
}

impl QueryTransport for SshTransport {
    fn run_query(&self, query: &str) -> Result<String> {
        let args = self.command_args(query);
        tracing::debug!("running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::Transport(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transport(format!(
                "{} query on {} failed ({}): {}",
                GERRIT_COMMAND,
                self.host,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
