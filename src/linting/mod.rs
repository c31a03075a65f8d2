pub mod config;

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::model::universe::Universe;
use crate::model::CompilationUnit;
use crate::parser::javadoc::{scan_tags, TagKind};
use crate::report::{outcome_for, Outcome, OutcomeKind};

pub use config::{CheckConfig, Severity};

/// A reference in a doc comment that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDiagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub tag: TagKind,
    pub argument: String,
    /// Qualified name of the type the comment belongs to.
    pub context: String,
    pub outcome: Outcome,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub units_checked: usize,
    pub tags_checked: usize,
    pub resolved: usize,
    pub literals: usize,
    pub diagnostics: Vec<LinkDiagnostic>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn merge(mut self, other: CheckReport) -> CheckReport {
        self.units_checked += other.units_checked;
        self.tags_checked += other.tags_checked;
        self.resolved += other.resolved;
        self.literals += other.literals;
        self.diagnostics.extend(other.diagnostics);
        self
    }
}

/// Check every doc comment of one unit against `universe`.
pub fn check_unit(unit: &CompilationUnit, universe: &Universe, config: &CheckConfig) -> CheckReport {
    let mut report = CheckReport {
        units_checked: 1,
        ..Default::default()
    };
    let file = unit.path().map(PathBuf::from).unwrap_or_default();

    for comment in unit.doc_comments() {
        let Some(context) = unit.find_type_path(comment.context.as_slice()) else {
            debug!(line = comment.line, "doc comment context not found; skipped");
            continue;
        };

        for tag in scan_tags(comment) {
            if !config.checks(tag.kind) {
                continue;
            }
            report.tags_checked += 1;

            let outcome = if tag.is_literal() {
                Outcome::literal(&tag.argument)
            } else {
                outcome_for(&tag.argument, context, unit, universe)
            };
            let Some(severity) = config.severity.for_outcome(outcome.kind) else {
                match outcome.kind {
                    OutcomeKind::Literal => report.literals += 1,
                    _ => report.resolved += 1,
                }
                continue;
            };
            if config.is_ignored(&tag.argument) || outcome.names.iter().any(|n| config.is_ignored(n)) {
                debug!(argument = %tag.argument, "failure ignored by config");
                continue;
            }

            report.diagnostics.push(LinkDiagnostic {
                file: file.clone(),
                line: tag.line,
                tag: tag.kind,
                argument: tag.argument,
                context: unit.ty(context).qualified_name.clone(),
                outcome,
                severity,
            });
        }
    }

    report
}

/// Check every unit of the universe in parallel. Diagnostics are ordered by file and line.
pub fn check_universe(universe: &Universe, config: &CheckConfig) -> CheckReport {
    let units: Vec<&CompilationUnit> = universe.units().collect();
    let mut report = units
        .par_iter()
        .map(|unit| check_unit(unit, universe, config))
        .reduce(CheckReport::default, CheckReport::merge);

    report
        .diagnostics
        .sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    report
}
