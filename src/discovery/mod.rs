use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

/// Which files under the root take part in the universe.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Glob patterns to include (empty means every `.java` file).
    pub include: Vec<String>,
    /// Glob patterns to exclude.
    pub exclude: Vec<String>,
}

/// Build output and IDE directories never hold sources worth checking.
const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["target/", "build/", ".gradle/", ".idea/", "out/"];

fn is_java_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("java")
}

/// Find Java source files under `root`, respecting .gitignore. Sorted by path.
pub fn discover_files(root: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .parents(true);

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_EXCLUDE_PATTERNS {
        overrides
            .add(&format!("!{}", pattern))
            .context("invalid default exclude pattern")?;
    }
    for pattern in &config.exclude {
        overrides
            .add(&format!("!{}", pattern))
            .with_context(|| format!("invalid exclude pattern `{}`", pattern))?;
    }
    for pattern in &config.include {
        overrides
            .add(pattern)
            .with_context(|| format!("invalid include pattern `{}`", pattern))?;
    }
    builder.overrides(overrides.build().context("failed to build overrides")?);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.context("error reading directory entry")?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if is_java_source(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
