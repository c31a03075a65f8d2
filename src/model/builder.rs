use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use super::{
    normalize_type_text, qualify, CompilationUnit, FieldDecl, MemberDecl, MemberId, MethodDecl,
    TypeDecl, TypeId, UnitId,
};
use crate::parser::{MemberSyntax, SourceUnit, TypeSyntax};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two types with the same simple name at one nesting level.
    #[error("type `{name}` is declared more than once in {scope}")]
    DuplicateDeclaration { name: String, scope: String },
}

/// Build the immutable symbol table for one parsed source file.
pub fn build(source: &SourceUnit, id: UnitId) -> Result<CompilationUnit, BuildError> {
    let package = source.package.clone().unwrap_or_default();
    let mut builder = Builder {
        unit: id,
        types: Vec::new(),
        members: Vec::new(),
    };

    let mut top_level = Vec::with_capacity(source.types.len());
    let mut seen = HashSet::new();
    for syntax in &source.types {
        if !seen.insert(syntax.name.as_str()) {
            return Err(BuildError::DuplicateDeclaration {
                name: syntax.name.clone(),
                scope: if package.is_empty() {
                    "the default package".to_string()
                } else {
                    format!("package `{}`", package)
                },
            });
        }
        top_level.push(builder.add_type(syntax, None, &package)?);
    }

    debug!(
        unit = id.0,
        package = %package,
        types = builder.types.len(),
        members = builder.members.len(),
        "built symbol table"
    );

    Ok(CompilationUnit {
        id,
        path: source.path.clone(),
        package,
        imports: source.imports.clone(),
        top_level,
        types: builder.types,
        members: builder.members,
        doc_comments: source.doc_comments.clone(),
    })
}

struct Builder {
    unit: UnitId,
    types: Vec<TypeDecl>,
    members: Vec<MemberDecl>,
}

impl Builder {
    fn add_type(
        &mut self,
        syntax: &TypeSyntax,
        enclosing: Option<TypeId>,
        prefix: &str,
    ) -> Result<TypeId, BuildError> {
        let id = TypeId(self.types.len() as u32);
        let qualified_name = qualify(prefix, &syntax.name);
        self.types.push(TypeDecl {
            id,
            simple_name: syntax.name.clone(),
            qualified_name: qualified_name.clone(),
            kind: syntax.kind,
            members: IndexMap::new(),
            nested: IndexMap::new(),
            enclosing,
            unit: self.unit,
            line: syntax.line,
        });

        let mut members: IndexMap<String, Vec<MemberId>> = IndexMap::new();
        for member in &syntax.members {
            let member_id = MemberId(self.members.len() as u32);
            let decl = match member {
                MemberSyntax::Field {
                    name,
                    type_text,
                    line,
                } => MemberDecl::Field(FieldDecl {
                    name: name.clone(),
                    type_text: normalize_type_text(type_text),
                    owner: id,
                    line: *line,
                }),
                MemberSyntax::Method {
                    name,
                    parameter_types,
                    is_constructor,
                    line,
                } => MemberDecl::Method(MethodDecl {
                    name: name.clone(),
                    parameter_types: parameter_types
                        .iter()
                        .map(|p| normalize_type_text(p))
                        .collect(),
                    is_constructor: *is_constructor,
                    owner: id,
                    line: *line,
                }),
            };
            members
                .entry(decl.name().to_string())
                .or_default()
                .push(member_id);
            self.members.push(decl);
        }

        let mut nested = IndexMap::new();
        for inner in &syntax.nested {
            if nested.contains_key(&inner.name) {
                return Err(BuildError::DuplicateDeclaration {
                    name: inner.name.clone(),
                    scope: format!("type `{}`", qualified_name),
                });
            }
            let inner_id = self.add_type(inner, Some(id), &qualified_name)?;
            nested.insert(inner.name.clone(), inner_id);
        }

        let decl = &mut self.types[id.0 as usize];
        decl.members = members;
        decl.nested = nested;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    fn javadoc_source() -> SourceUnit {
        SourceUnit {
            package: Some("com.example".to_string()),
            types: vec![TypeSyntax::new("TestJavadoc", TypeKind::Class, 3)
                .with_field("mySimpleString", "String")
                .with_method("foo", &[])
                .with_method("foo", &["int"])
                .with_method("foo", &["Map<String,  Integer>"])
                .with_nested(
                    TypeSyntax::new("Inner", TypeKind::Class, 10)
                        .with_field("test", "String")
                        .with_nested(TypeSyntax::new("Deeper", TypeKind::Interface, 12)),
                )],
            ..Default::default()
        }
    }

    #[test]
    fn test_nested_types_are_not_flattened() {
        let unit = build(&javadoc_source(), UnitId(1)).unwrap();

        assert_eq!(unit.top_level_types().count(), 1);
        assert!(unit.top_level("Inner").is_none());

        let inner = unit.find_type_path(&["TestJavadoc", "Inner"]).unwrap();
        assert_eq!(unit.ty(inner).qualified_name, "com.example.TestJavadoc.Inner");

        let deeper = unit
            .find_type_path(&["TestJavadoc", "Inner", "Deeper"])
            .unwrap();
        let chain: Vec<_> = unit
            .scope_chain(deeper)
            .map(|id| unit.ty(id).simple_name.clone())
            .collect();
        assert_eq!(chain, vec!["Deeper", "Inner", "TestJavadoc"]);
    }

    #[test]
    fn test_overloads_keep_declaration_order() {
        let unit = build(&javadoc_source(), UnitId(1)).unwrap();
        let outer = unit.top_level("TestJavadoc").unwrap();

        let overloads: Vec<_> = unit
            .members_named(outer, "foo")
            .map(|(_, m)| m.signature())
            .collect();
        assert_eq!(
            overloads,
            vec!["foo()", "foo(int)", "foo(Map<String,Integer>)"]
        );
    }

    #[test]
    fn test_members_point_back_to_owner() {
        let unit = build(&javadoc_source(), UnitId(7)).unwrap();
        let inner = unit.find_type_path(&["TestJavadoc", "Inner"]).unwrap();
        let (_, field) = unit.members_named(inner, "test").next().unwrap();
        assert_eq!(field.owner(), inner);
        assert_eq!(unit.ty(inner).unit, UnitId(7));
    }

    #[test]
    fn test_duplicate_top_level_type() {
        let source = SourceUnit {
            package: Some("com.example".to_string()),
            types: vec![
                TypeSyntax::new("Foo", TypeKind::Class, 1),
                TypeSyntax::new("Foo", TypeKind::Interface, 5),
            ],
            ..Default::default()
        };
        let err = build(&source, UnitId(1)).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateDeclaration {
                name: "Foo".to_string(),
                scope: "package `com.example`".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_nested_type() {
        let source = SourceUnit {
            types: vec![TypeSyntax::new("Outer", TypeKind::Class, 1)
                .with_nested(TypeSyntax::new("Inner", TypeKind::Class, 2))
                .with_nested(TypeSyntax::new("Inner", TypeKind::Class, 3))],
            ..Default::default()
        };
        let err = build(&source, UnitId(1)).unwrap_err();
        assert!(err.to_string().contains("`Inner`"), "{}", err);
        assert!(err.to_string().contains("type `Outer`"), "{}", err);
    }

    #[test]
    fn test_same_name_at_different_levels_is_allowed() {
        let source = SourceUnit {
            types: vec![
                TypeSyntax::new("A", TypeKind::Class, 1)
                    .with_nested(TypeSyntax::new("Node", TypeKind::Class, 2)),
                TypeSyntax::new("B", TypeKind::Class, 3)
                    .with_nested(TypeSyntax::new("Node", TypeKind::Class, 4)),
            ],
            ..Default::default()
        };
        let unit = build(&source, UnitId(1)).unwrap();
        assert_eq!(unit.package(), "");
        assert!(unit.find_type_path(&["A", "Node"]).is_some());
        assert!(unit.find_type_path(&["B", "Node"]).is_some());
    }
}
