//! Syntactic model handed to the symbol table builder, and the Java front end
//! that produces it from source text.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{ImportDecl, TypeKind};

pub mod java;
pub mod javadoc;

pub use java::JavaParser;

/// One parsed Java source file, before symbol table construction.
#[derive(Debug, Clone, Default)]
pub struct SourceUnit {
    pub path: Option<PathBuf>,
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeSyntax>,
    pub doc_comments: Vec<DocComment>,
}

#[derive(Debug, Clone)]
pub struct TypeSyntax {
    pub name: String,
    pub kind: TypeKind,
    pub line: usize,
    pub members: Vec<MemberSyntax>,
    pub nested: Vec<TypeSyntax>,
}

impl TypeSyntax {
    pub fn new(name: impl Into<String>, kind: TypeKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            members: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, type_text: &str) -> Self {
        self.members.push(MemberSyntax::Field {
            name: name.to_string(),
            type_text: type_text.to_string(),
            line: 0,
        });
        self
    }

    pub fn with_method(mut self, name: &str, parameter_types: &[&str]) -> Self {
        self.members.push(MemberSyntax::Method {
            name: name.to_string(),
            parameter_types: parameter_types.iter().map(|p| p.to_string()).collect(),
            is_constructor: false,
            line: 0,
        });
        self
    }

    pub fn with_nested(mut self, nested: TypeSyntax) -> Self {
        self.nested.push(nested);
        self
    }
}

#[derive(Debug, Clone)]
pub enum MemberSyntax {
    Field {
        name: String,
        type_text: String,
        line: usize,
    },
    Method {
        name: String,
        parameter_types: Vec<String>,
        is_constructor: bool,
        line: usize,
    },
}

/// What a doc comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Documented {
    Type(String),
    Field(String),
    Method(String),
}

/// A `/** ... */` comment together with the type whose scope its links resolve in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    /// Raw comment text including the delimiters.
    pub text: String,
    /// 1-based line of the comment opener.
    pub line: usize,
    /// Simple names from the top-level type down to the context type.
    pub context: Vec<String>,
    pub documents: Option<Documented>,
}
