use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::parser::javadoc::TagKind;
use crate::report::OutcomeKind;

/// Link-check configuration, read from `doclink.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub severity: SeverityConfig,
    /// Tags whose references are checked.
    #[serde(default = "default_tags")]
    pub tags: Vec<TagKind>,
    /// Names whose failures are not reported. A trailing `*` matches any suffix.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_tags() -> Vec<TagKind> {
    vec![TagKind::Link, TagKind::LinkPlain, TagKind::Value, TagKind::See]
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            severity: SeverityConfig::default(),
            tags: default_tags(),
            ignore: Vec::new(),
        }
    }
}

impl CheckConfig {
    pub fn checks(&self, tag: TagKind) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == pattern,
        })
    }
}

/// Severity per failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    pub type_not_found: Severity,
    pub member_not_found: Severity,
    pub malformed: Severity,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            type_not_found: Severity::Error,
            member_not_found: Severity::Error,
            malformed: Severity::Warning,
        }
    }
}

impl SeverityConfig {
    /// `None` for outcomes that are not failures.
    pub fn for_outcome(&self, kind: OutcomeKind) -> Option<Severity> {
        match kind {
            OutcomeKind::TypeNotFound => Some(self.type_not_found),
            OutcomeKind::MemberNotFound => Some(self.member_not_found),
            OutcomeKind::Malformed => Some(self.malformed),
            OutcomeKind::Resolved | OutcomeKind::Literal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Default config file names, searched in order.
const CONFIG_FILENAMES: &[&str] = &[".doclink/config.toml", "doclink.toml"];

/// Find the config file for a project.
///
/// If `config_override` is provided, use that path directly.
/// Otherwise, search for config files in the project root.
pub fn find_config_path(project_root: &Path, config_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(override_path) = config_override {
        if override_path.exists() {
            return Some(override_path.to_path_buf());
        }
        return None;
    }

    CONFIG_FILENAMES
        .iter()
        .map(|filename| project_root.join(filename))
        .find(|path| path.exists())
}

pub fn load_config(path: &Path) -> Result<CheckConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(toml_str: &str) -> Result<CheckConfig> {
    let config: CheckConfig = toml::from_str(toml_str)?;
    Ok(config)
}

/// Load the project's config, or the defaults when it has none.
///
/// An explicit override that does not exist is an error.
pub fn load_or_default(project_root: &Path, config_override: Option<&Path>) -> Result<CheckConfig> {
    match find_config_path(project_root, config_override) {
        Some(path) => load_config(&path),
        None => {
            if let Some(missing) = config_override {
                bail!("config file {} does not exist", missing.display());
            }
            Ok(CheckConfig::default())
        }
    }
}
