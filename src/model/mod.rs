use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::parser::DocComment;

pub mod builder;
pub mod universe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

/// Index of a type declaration inside its compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// Index of a member declaration inside its compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An `import` declaration as written in the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path without the trailing `.*` of wildcard imports.
    pub path: String,
    pub is_wildcard: bool,
    pub is_static: bool,
}

impl ImportDecl {
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_wildcard: false,
            is_static: false,
        }
    }

    pub fn wildcard(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_wildcard: true,
            is_static: false,
        }
    }

    /// The simple name a single-type import brings into scope.
    pub fn bound_name(&self) -> Option<&str> {
        if self.is_wildcard {
            return None;
        }
        self.path.rsplit('.').next()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDecl {
    pub id: TypeId,
    pub simple_name: String,
    pub qualified_name: String,
    pub kind: TypeKind,
    /// Members by simple name; overloads keep declaration order.
    pub members: IndexMap<String, Vec<MemberId>>,
    pub nested: IndexMap<String, TypeId>,
    /// Lookup-only link to the enclosing type; the enclosing type owns this one.
    pub enclosing: Option<TypeId>,
    pub unit: UnitId,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub type_text: String,
    pub owner: TypeId,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDecl {
    pub name: String,
    /// Normalised parameter type text, compared literally during lookup.
    pub parameter_types: Vec<String>,
    pub is_constructor: bool,
    pub owner: TypeId,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
}

impl MemberDecl {
    pub fn name(&self) -> &str {
        match self {
            MemberDecl::Field(f) => &f.name,
            MemberDecl::Method(m) => &m.name,
        }
    }

    pub fn owner(&self) -> TypeId {
        match self {
            MemberDecl::Field(f) => f.owner,
            MemberDecl::Method(m) => m.owner,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            MemberDecl::Field(f) => f.line,
            MemberDecl::Method(m) => m.line,
        }
    }

    /// Parameter types for methods, `None` for fields.
    pub fn parameter_types(&self) -> Option<&[String]> {
        match self {
            MemberDecl::Field(_) => None,
            MemberDecl::Method(m) => Some(&m.parameter_types),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            MemberDecl::Field(_) => "field",
            MemberDecl::Method(m) if m.is_constructor => "constructor",
            MemberDecl::Method(_) => "method",
        }
    }

    /// `name` for fields, `name(p1, p2)` for methods.
    pub fn signature(&self) -> String {
        match self {
            MemberDecl::Field(f) => f.name.clone(),
            MemberDecl::Method(m) => format!("{}({})", m.name, m.parameter_types.join(", ")),
        }
    }
}

/// Symbol table for one Java source file.
///
/// Types and members live in per-unit arenas and refer to each other by id.
/// A unit is never mutated after [`builder::build`] returns it; reloading a
/// file produces a new unit.
#[derive(Debug, Clone, Serialize)]
pub struct CompilationUnit {
    pub(crate) id: UnitId,
    pub(crate) path: Option<PathBuf>,
    pub(crate) package: String,
    pub(crate) imports: Vec<ImportDecl>,
    pub(crate) top_level: Vec<TypeId>,
    pub(crate) types: Vec<TypeDecl>,
    pub(crate) members: Vec<MemberDecl>,
    #[serde(skip)]
    pub(crate) doc_comments: Vec<DocComment>,
}

impl CompilationUnit {
    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Package name; empty for the default package.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    pub fn doc_comments(&self) -> &[DocComment] {
        &self.doc_comments
    }

    /// Look up a type by id.
    ///
    /// Panics if `id` was not produced by this unit.
    pub fn ty(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    /// Look up a member by id.
    ///
    /// Panics if `id` was not produced by this unit.
    pub fn member(&self, id: MemberId) -> &MemberDecl {
        &self.members[id.0 as usize]
    }

    pub fn top_level_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.top_level.iter().map(|id| self.ty(*id))
    }

    /// Every type in the unit, outer types before the types they contain.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    pub fn top_level(&self, name: &str) -> Option<TypeId> {
        self.top_level
            .iter()
            .copied()
            .find(|id| self.ty(*id).simple_name == name)
    }

    /// Follow a chain of simple names from a top-level type through nested types.
    pub fn find_type_path<S: AsRef<str>>(&self, path: &[S]) -> Option<TypeId> {
        let (first, rest) = path.split_first()?;
        let mut current = self.top_level(first.as_ref())?;
        for segment in rest {
            current = *self.ty(current).nested.get(segment.as_ref())?;
        }
        Some(current)
    }

    /// Like [`CompilationUnit::ty`], but `None` for an id from another unit.
    pub fn get_ty(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.0 as usize)
    }

    /// The type itself followed by each enclosing type, innermost first.
    pub fn scope_chain(&self, id: TypeId) -> ScopeChain<'_> {
        ScopeChain {
            unit: self,
            next: Some(id),
        }
    }

    pub fn members_named<'a>(
        &'a self,
        ty: TypeId,
        name: &str,
    ) -> impl Iterator<Item = (MemberId, &'a MemberDecl)> + 'a {
        self.ty(ty)
            .members
            .get(name)
            .into_iter()
            .flatten()
            .map(move |id| (*id, self.member(*id)))
    }
}

/// Iterator over a type and its enclosing types.
pub struct ScopeChain<'a> {
    unit: &'a CompilationUnit,
    next: Option<TypeId>,
}

impl Iterator for ScopeChain<'_> {
    type Item = TypeId;

    fn next(&mut self) -> Option<TypeId> {
        let current = self.next?;
        self.next = self.unit.ty(current).enclosing;
        Some(current)
    }
}

/// Join a package (possibly empty) and a name.
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Canonical form of a type as written in source or in a link parameter list.
///
/// Whitespace runs collapse to one space and disappear next to `< > , [ ] .`,
/// so `Map<String, Integer>` and `Map<String,Integer>` compare equal.
pub fn normalize_type_text(text: &str) -> String {
    const TIGHT: &[char] = &['<', '>', ',', '[', ']', '.'];

    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_tight = out.chars().last().is_some_and(|p| TIGHT.contains(&p));
            if !prev_tight && !TIGHT.contains(&c) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}
