use std::path::Path;

use serde::Serialize;

use super::commands::{ResolveOutput, TypeListing};
use super::OutputFormat;
use crate::linting::{CheckReport, Severity};
use crate::workspace::LoadFailure;

fn to_relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Format any serializable value as JSON.
pub fn format_json<T: Serialize>(value: &T, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Compact => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Json | OutputFormat::Text => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
    }
}

pub fn format_check_report(
    report: &CheckReport,
    failures: &[LoadFailure],
    root: &Path,
    format: &OutputFormat,
) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Compact => {
            let value = serde_json::json!({
                "units_checked": report.units_checked,
                "tags_checked": report.tags_checked,
                "resolved": report.resolved,
                "literals": report.literals,
                "diagnostics": report.diagnostics,
                "excluded": failures,
            });
            format_json(&value, format)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for d in &report.diagnostics {
                output.push_str(&format!(
                    "{}:{}: {}: @{} `{}` in {}: {}\n",
                    to_relative(&d.file, root).display(),
                    d.line,
                    d.severity,
                    d.tag,
                    d.argument,
                    d.context,
                    d.outcome.message,
                ));
            }
            for f in failures {
                output.push_str(&format!(
                    "{}: excluded: {}\n",
                    to_relative(&f.path, root).display(),
                    f.reason
                ));
            }
            output.push_str(&format!(
                "Checked {} references in {} files: {} resolved, {} errors, {} warnings, {} info",
                report.tags_checked,
                report.units_checked,
                report.resolved,
                report.count(Severity::Error),
                report.count(Severity::Warning),
                report.count(Severity::Info),
            ));
            output
        }
    }
}

pub fn format_resolution(resolution: &ResolveOutput, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Compact => format_json(resolution, format),
        OutputFormat::Text => format!(
            "{} (in {}): {}",
            resolution.link, resolution.context, resolution.outcome
        ),
    }
}

pub fn format_symbols(types: &[TypeListing], root: &Path, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Compact => format_json(&types, format),
        OutputFormat::Text => {
            let mut output = String::new();
            for t in types {
                output.push_str(&format!(
                    "{:<11} {:<50} ({}:{})\n",
                    t.kind,
                    t.qualified_name,
                    to_relative(&t.file, root).display(),
                    t.line,
                ));
                for m in &t.members {
                    output.push_str(&format!("  {:<11} {}\n", m.kind, m.signature));
                }
            }
            output
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linting::LinkDiagnostic;
    use crate::parser::javadoc::TagKind;
    use crate::report::{Outcome, OutcomeKind};
    use std::path::PathBuf;

    fn report() -> CheckReport {
        CheckReport {
            units_checked: 2,
            tags_checked: 5,
            resolved: 3,
            literals: 1,
            diagnostics: vec![LinkDiagnostic {
                file: PathBuf::from("/proj/src/Foo2.java"),
                line: 7,
                tag: TagKind::See,
                argument: "LinkToSomethingNotFound".to_string(),
                context: "com.example.Foo2".to_string(),
                outcome: Outcome {
                    kind: OutcomeKind::TypeNotFound,
                    names: vec!["LinkToSomethingNotFound".to_string()],
                    message: "type `LinkToSomethingNotFound` not found".to_string(),
                },
                severity: Severity::Error,
            }],
        }
    }

    #[test]
    fn test_check_report_text() {
        let out = format_check_report(&report(), &[], Path::new("/proj"), &OutputFormat::Text);
        assert!(out.starts_with(
            "src/Foo2.java:7: error: @see `LinkToSomethingNotFound` in com.example.Foo2: type `LinkToSomethingNotFound` not found\n"
        ), "{}", out);
        assert!(out.ends_with("Checked 5 references in 2 files: 3 resolved, 1 errors, 0 warnings, 0 info"));
    }

    #[test]
    fn test_check_report_json() {
        let failures = vec![LoadFailure {
            path: PathBuf::from("/proj/src/Bad.java"),
            reason: "duplicate".to_string(),
        }];
        let out = format_check_report(&report(), &failures, Path::new("/proj"), &OutputFormat::Compact);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["diagnostics"][0]["outcome"]["kind"], "type_not_found");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][0]["tag"], "see");
        assert_eq!(value["excluded"][0]["reason"], "duplicate");
        assert!(!out.contains('\n'));
    }
}
