use serde::{Deserialize, Serialize};
use std::fmt;

use crate::link::{self, LinkError};
use crate::model::universe::Universe;
use crate::model::{CompilationUnit, TypeId};
use crate::resolver::{self, ResolutionResult};

/// Stable tag for each way a link can turn out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Resolved,
    TypeNotFound,
    MemberNotFound,
    Malformed,
    /// `@see "text"` or `@see <a href=...>`; never resolved.
    Literal,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Resolved => "resolved",
            OutcomeKind::TypeNotFound => "type_not_found",
            OutcomeKind::MemberNotFound => "member_not_found",
            OutcomeKind::Malformed => "malformed",
            OutcomeKind::Literal => "literal",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What hover text and diagnostics are built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// The names involved: the symbol for `resolved`, the attempted type for
    /// `type_not_found`, type then member for `member_not_found`, the raw text
    /// otherwise.
    pub names: Vec<String>,
    pub message: String,
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        self.kind == OutcomeKind::Resolved
    }

    pub fn literal(text: &str) -> Self {
        Outcome {
            kind: OutcomeKind::Literal,
            names: vec![text.to_string()],
            message: "literal reference, not resolved".to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

pub fn describe(result: &ResolutionResult) -> Outcome {
    match result {
        ResolutionResult::Resolved(symbol) => {
            let name = symbol.display_name();
            Outcome {
                kind: OutcomeKind::Resolved,
                message: format!("resolved to `{}`", name),
                names: vec![name],
            }
        }
        ResolutionResult::TypeNotFound { attempted } => Outcome {
            kind: OutcomeKind::TypeNotFound,
            names: vec![attempted.clone()],
            message: format!("type `{}` not found", attempted),
        },
        ResolutionResult::MemberNotFound { type_name, member } => Outcome {
            kind: OutcomeKind::MemberNotFound,
            names: vec![type_name.clone(), member.clone()],
            message: format!("member `{}` not found in `{}`", member, type_name),
        },
    }
}

pub fn describe_error(err: &LinkError) -> Outcome {
    match err {
        LinkError::MalformedReference { raw, reason } => Outcome {
            kind: OutcomeKind::Malformed,
            names: vec![raw.clone()],
            message: format!("link could not be parsed: {}", reason),
        },
    }
}

/// Parse, resolve and describe one link expression.
pub fn outcome_for(
    raw: &str,
    context_type: TypeId,
    context_unit: &CompilationUnit,
    universe: &Universe,
) -> Outcome {
    let resolved = link::parse(raw)
        .and_then(|reference| resolver::resolve(&reference, context_type, context_unit, universe));
    match resolved {
        Ok(result) => describe(&result),
        Err(err) => describe_error(&err),
    }
}
