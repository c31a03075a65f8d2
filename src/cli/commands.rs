use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::output::{format_check_report, format_resolution, format_symbols};
use super::OutputFormat;
use crate::discovery::DiscoveryConfig;
use crate::linting::{self, config::load_or_default};
use crate::model::MemberId;
use crate::report::{outcome_for, Outcome};
use crate::workspace::Workspace;

/// Result of `doclink resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutput {
    pub link: String,
    pub context: String,
    pub outcome: Outcome,
}

/// One declared type as listed by `doclink symbols`.
#[derive(Debug, Clone, Serialize)]
pub struct TypeListing {
    pub qualified_name: String,
    pub kind: String,
    pub file: PathBuf,
    pub line: usize,
    pub members: Vec<MemberListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberListing {
    pub kind: &'static str,
    pub signature: String,
    pub line: usize,
}

/// Run the link check. Returns the rendered report and whether any error-level
/// diagnostic was found.
pub fn run_check(
    root: &Path,
    discovery: &DiscoveryConfig,
    config_override: Option<&Path>,
    format: &OutputFormat,
) -> Result<(String, bool)> {
    let config = load_or_default(root, config_override)?;
    let workspace = Workspace::load(root, discovery)?;
    let universe = workspace.snapshot();

    let report = linting::check_universe(&universe, &config);
    let output = format_check_report(&report, &workspace.failures(), root, format);
    Ok((output, report.has_errors()))
}

pub fn run_resolve(
    root: &Path,
    discovery: &DiscoveryConfig,
    file: &Path,
    context: Option<&str>,
    link: &str,
    format: &OutputFormat,
) -> Result<String> {
    let workspace = Workspace::load(root, discovery)?;
    let universe = workspace.snapshot();

    let file = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    let file = file.canonicalize().unwrap_or(file);

    let Some(unit) = universe.unit_by_path(&file) else {
        if let Some(failure) = workspace.failures().iter().find(|f| f.path == file) {
            bail!("{} was excluded: {}", file.display(), failure.reason);
        }
        bail!("{} is not a Java source in {}", file.display(), root.display());
    };

    let context_type = match context {
        Some(path) => {
            let segments: Vec<&str> = path.split('.').collect();
            unit.find_type_path(segments.as_slice())
                .with_context(|| format!("type `{}` is not declared in {}", path, file.display()))?
        }
        None => unit
            .top_level_types()
            .next()
            .map(|t| t.id)
            .with_context(|| format!("{} declares no types", file.display()))?,
    };

    let result = ResolveOutput {
        link: link.to_string(),
        context: unit.ty(context_type).qualified_name.clone(),
        outcome: outcome_for(link, context_type, unit, &universe),
    };
    Ok(format_resolution(&result, format))
}

pub fn run_symbols(root: &Path, discovery: &DiscoveryConfig, format: &OutputFormat) -> Result<String> {
    let workspace = Workspace::load(root, discovery)?;
    let universe = workspace.snapshot();

    let mut types = Vec::new();
    for unit in universe.units() {
        let file = unit.path().map(PathBuf::from).unwrap_or_default();
        for ty in unit.all_types() {
            let mut ids: Vec<MemberId> = ty.members.values().flatten().copied().collect();
            ids.sort();
            let members = ids
                .into_iter()
                .map(|id| {
                    let member = unit.member(id);
                    MemberListing {
                        kind: member.kind_str(),
                        signature: member.signature(),
                        line: member.line(),
                    }
                })
                .collect();
            types.push(TypeListing {
                qualified_name: ty.qualified_name.clone(),
                kind: ty.kind.to_string(),
                file: file.clone(),
                line: ty.line,
                members,
            });
        }
    }

    Ok(format_symbols(&types, root, format))
}
