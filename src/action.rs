//! Pipeline runner environment.
//!
//! Inputs arrive as `INPUT_<NAME>` variables, state saved by an earlier
//! phase as `STATE_<KEY>`, and outputs and state are appended to the files
//! named by `GITHUB_OUTPUT` and `GITHUB_STATE`.

use crate::error::{ReleaseError, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository identity and credential used to reach the hosting API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub api_url: String,
}

/// Snapshot of the process environment seen by a pipeline phase
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    vars: HashMap<String, String>,
}

impl ActionContext {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ActionContext {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Trimmed value of an input, `None` when unset or blank
    pub fn input(&self, name: &str) -> Option<String> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        let value = self.var(&key)?.trim();

        debug!(input = name, value, "action: read input");

        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Non-blank lines of a multi-line input
    pub fn multiline_input(&self, name: &str) -> Vec<String> {
        self.input(name)
            .map(|value| {
                value
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// State saved by an earlier phase under `key`
    pub fn state(&self, key: &str) -> Option<String> {
        let value = self.var(&format!("STATE_{}", key)).map(str::to_string);
        debug!(key, value = ?value, "action: read state");
        value
    }

    /// Whether the runner requested debug logging
    pub fn runner_debug(&self) -> bool {
        self.var("RUNNER_DEBUG") == Some("1")
    }

    pub fn output_file(&self) -> Option<PathBuf> {
        self.file_var("GITHUB_OUTPUT")
    }

    pub fn state_file(&self) -> Option<PathBuf> {
        self.file_var("GITHUB_STATE")
    }

    fn file_var(&self, key: &str) -> Option<PathBuf> {
        self.var(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Resolve repository identity and credential.
    ///
    /// # Errors
    /// [`ReleaseError::MissingConfiguration`] when `GITHUB_REPOSITORY` or
    /// `GITHUB_TOKEN` is absent, or the repository is not `owner/repo`.
    pub fn repository(&self) -> Result<RepositoryIdentity> {
        let repository = self
            .var("GITHUB_REPOSITORY")
            .ok_or_else(|| ReleaseError::missing("env var GITHUB_REPOSITORY not found"))?;

        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| {
                ReleaseError::missing(format!(
                    "env var GITHUB_REPOSITORY contains invalid repository value '{}'",
                    repository
                ))
            })?;

        let token = self
            .var("GITHUB_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ReleaseError::missing("env var GITHUB_TOKEN not found"))?;

        let api_url = self
            .var("GITHUB_API_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        debug!(owner, repo, %api_url, "action: resolved repository, token present");

        Ok(RepositoryIdentity {
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            api_url,
        })
    }
}

/// Appends `key=value` entries to a runner command file.
///
/// Without a file the entries are printed to stdout, which is how the tool
/// reports its outputs outside of a runner.
#[derive(Debug)]
pub struct CommandFile {
    path: Option<PathBuf>,
    delimiter: String,
}

impl CommandFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        CommandFile {
            path,
            delimiter: format!("ghadelimiter_{}", std::process::id()),
        }
    }

    /// Append a single entry
    pub fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let entry = self.format_entry(key, value)?;

        match &self.path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(entry.as_bytes())?;
            }
            None => print!("{}", entry),
        }

        Ok(())
    }

    fn format_entry(&self, key: &str, value: &str) -> Result<String> {
        if key.is_empty() || key.contains('=') || key.contains('\n') {
            return Err(ReleaseError::config(format!("invalid command file key '{}'", key)));
        }

        if !value.contains('\n') {
            return Ok(format!("{}={}\n", key, value));
        }

        if value.contains(&self.delimiter) {
            return Err(ReleaseError::config(format!(
                "value for '{}' contains the delimiter '{}'",
                key, self.delimiter
            )));
        }

        Ok(format!(
            "{key}<<{delim}\n{value}\n{delim}\n",
            key = key,
            delim = self.delimiter,
            value = value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(vars: &[(&str, &str)]) -> ActionContext {
        ActionContext::from_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_input_lookup() {
        let ctx = context(&[("INPUT_TAG-PREFIX", " release- "), ("INPUT_INIT-VERSION", "")]);
        assert_eq!(ctx.input("tag-prefix"), Some("release-".to_string()));
        assert_eq!(ctx.input("init-version"), None);
        assert_eq!(ctx.input("assets"), None);
    }

    #[test]
    fn test_multiline_input() {
        let ctx = context(&[("INPUT_ASSETS", "dist/*.tar.gz\n\n  target/release/app  \n")]);
        assert_eq!(
            ctx.multiline_input("assets"),
            vec!["dist/*.tar.gz".to_string(), "target/release/app".to_string()]
        );
    }

    #[test]
    fn test_state_lookup() {
        let ctx = context(&[("STATE_tag", "v1.0.0")]);
        assert_eq!(ctx.state("tag"), Some("v1.0.0".to_string()));
        assert_eq!(ctx.state("version"), None);
    }

    #[test]
    fn test_repository_identity() {
        let ctx = context(&[
            ("GITHUB_REPOSITORY", "octo/widgets"),
            ("GITHUB_TOKEN", "secret"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ]);
        let identity = ctx.repository().unwrap();
        assert_eq!(identity.owner, "octo");
        assert_eq!(identity.repo, "widgets");
        assert_eq!(identity.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_repository_default_api_url() {
        let ctx = context(&[("GITHUB_REPOSITORY", "octo/widgets"), ("GITHUB_TOKEN", "t")]);
        assert_eq!(ctx.repository().unwrap().api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_repository_missing() {
        let err = context(&[("GITHUB_TOKEN", "t")]).repository().unwrap_err();
        assert!(matches!(err, ReleaseError::MissingConfiguration(_)));

        let err = context(&[("GITHUB_REPOSITORY", "octo/widgets")])
            .repository()
            .unwrap_err();
        assert!(matches!(err, ReleaseError::MissingConfiguration(_)));
    }

    #[test]
    fn test_repository_malformed() {
        for value in ["widgets", "/widgets", "octo/", "a/b/c"] {
            let ctx = context(&[("GITHUB_REPOSITORY", value), ("GITHUB_TOKEN", "t")]);
            assert!(ctx.repository().is_err(), "expected error for '{}'", value);
        }
    }

    #[test]
    fn test_runner_debug() {
        assert!(context(&[("RUNNER_DEBUG", "1")]).runner_debug());
        assert!(!context(&[]).runner_debug());
    }

    #[test]
    fn test_command_file_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        let mut file = CommandFile::new(Some(path.clone()));

        file.write("tag", "v1.0.0").unwrap();
        file.write("released", "true").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "tag=v1.0.0\nreleased=true\n");
    }

    #[test]
    fn test_command_file_multiline_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        let mut file = CommandFile::new(Some(path.clone()));

        file.write("notes", "line one\nline two").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("notes<<ghadelimiter_"));
        assert!(content.contains("\nline one\nline two\n"));
    }

    #[test]
    fn test_command_file_rejects_bad_key() {
        let mut file = CommandFile::new(None);
        assert!(file.write("a=b", "x").is_err());
        assert!(file.write("", "x").is_err());
    }
}
