use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tree_sitter::{Node, Parser};

use super::{DocComment, Documented, MemberSyntax, SourceUnit, TypeSyntax};
use crate::model::{ImportDecl, TypeKind};

#[derive(Default)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn create_parser() -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .context("failed to set Java parser language")?;
        Ok(parser)
    }

    /// Parse a Java source file into declarations and doc comments.
    ///
    /// Syntax errors are tolerated: whatever tree-sitter recovered is extracted.
    pub fn parse(&self, source: &str, path: Option<&Path>) -> Result<SourceUnit> {
        let mut parser = Self::create_parser()?;
        let tree = parser
            .parse(source, None)
            .context("tree-sitter failed to parse Java")?;

        let root = tree.root_node();
        if root.has_error() {
            debug!(path = ?path, "Java source has syntax errors");
        }

        let mut extractor = Extractor::new(source);
        let types = extractor.visit_program(root);

        Ok(SourceUnit {
            path: path.map(Path::to_path_buf),
            package: extractor.package,
            imports: extractor.imports,
            types,
            doc_comments: extractor.doc_comments,
        })
    }
}

fn type_kind(node_kind: &str) -> Option<TypeKind> {
    match node_kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        "annotation_type_declaration" => Some(TypeKind::Annotation),
        _ => None,
    }
}

fn is_comment(node: Node) -> bool {
    matches!(node.kind(), "block_comment" | "line_comment")
}

/// Walks a Java tree-sitter CST and collects declarations and doc comments.
struct Extractor<'a> {
    source: &'a str,
    package: Option<String>,
    imports: Vec<ImportDecl>,
    doc_comments: Vec<DocComment>,
    /// Names of the types being visited, outermost first.
    type_stack: Vec<String>,
}

impl<'a> Extractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            package: None,
            imports: Vec::new(),
            doc_comments: Vec::new(),
            type_stack: Vec::new(),
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn line(node: Node) -> usize {
        node.start_position().row + 1
    }

    fn name_of(&self, node: Node) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| self.node_text(n).to_string())
    }

    fn visit_program(&mut self, root: Node) -> Vec<TypeSyntax> {
        let mut types = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => self.extract_package(child),
                "import_declaration" => self.extract_import(child),
                "block_comment" => self.note_doc_comment(child),
                kind => {
                    if let Some(kind) = type_kind(kind) {
                        types.extend(self.extract_type(child, kind));
                    }
                }
            }
        }
        types
    }

    fn extract_package(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "scoped_identifier" | "identifier") {
                self.package = Some(self.node_text(child).to_string());
            }
        }
    }

    fn extract_import(&mut self, node: Node) {
        let mut path = String::new();
        let mut is_static = false;
        let mut is_wildcard = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "scoped_identifier" | "identifier" => {
                    path = self.node_text(child).to_string();
                }
                "static" => is_static = true,
                "asterisk" => is_wildcard = true,
                _ => {}
            }
        }

        if path.is_empty() {
            return;
        }
        self.imports.push(ImportDecl {
            path,
            is_wildcard,
            is_static,
        });
    }

    fn extract_type(&mut self, node: Node, kind: TypeKind) -> Option<TypeSyntax> {
        let name = self.name_of(node)?;
        let mut ty = TypeSyntax::new(name.clone(), kind, Self::line(node));

        self.type_stack.push(name);
        if kind == TypeKind::Record {
            if let Some(components) = node.child_by_field_name("parameters") {
                self.extract_record_components(components, &mut ty);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_body(body, &mut ty);
        }
        self.type_stack.pop();

        Some(ty)
    }

    fn visit_body(&mut self, body: Node, ty: &mut TypeSyntax) {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "block_comment" => self.note_doc_comment(child),
                "field_declaration" | "constant_declaration" => self.extract_fields(child, ty),
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.extract_method(child, ty, false)
                }
                "constructor_declaration" => self.extract_method(child, ty, true),
                "enum_constant" => self.extract_enum_constant(child, ty),
                // Members declared after the constants of an enum.
                "enum_body_declarations" => self.visit_body(child, ty),
                kind => {
                    if let Some(kind) = type_kind(kind) {
                        ty.nested.extend(self.extract_type(child, kind));
                    }
                }
            }
        }
    }

    fn extract_fields(&mut self, node: Node, ty: &mut TypeSyntax) {
        let type_text = node
            .child_by_field_name("type")
            .map(|t| self.node_text(t))
            .unwrap_or_default();

        // `int x, y[];` declares two fields
        let mut cursor = node.walk();
        for declarator in node.children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = self.name_of(declarator) else {
                continue;
            };
            let mut field_type = type_text.to_string();
            if let Some(dims) = declarator.child_by_field_name("dimensions") {
                field_type.push_str(self.node_text(dims));
            }
            ty.members.push(MemberSyntax::Field {
                name,
                type_text: field_type,
                line: Self::line(declarator),
            });
        }
    }

    fn extract_method(&mut self, node: Node, ty: &mut TypeSyntax, is_constructor: bool) {
        let Some(name) = self.name_of(node) else {
            return;
        };
        let parameter_types = node
            .child_by_field_name("parameters")
            .map(|params| self.parameter_types(params))
            .unwrap_or_default();

        ty.members.push(MemberSyntax::Method {
            name,
            parameter_types,
            is_constructor,
            line: Self::line(node),
        });
    }

    fn extract_enum_constant(&mut self, node: Node, ty: &mut TypeSyntax) {
        if let Some(name) = self.name_of(node) {
            ty.members.push(MemberSyntax::Field {
                name,
                type_text: ty.name.clone(),
                line: Self::line(node),
            });
        }
    }

    /// Record components become a field plus an accessor method each.
    fn extract_record_components(&mut self, components: Node, ty: &mut TypeSyntax) {
        let mut cursor = components.walk();
        for component in components.named_children(&mut cursor) {
            if component.kind() != "formal_parameter" {
                continue;
            }
            let (Some(name), Some(type_node)) = (
                self.name_of(component),
                component.child_by_field_name("type"),
            ) else {
                continue;
            };
            let line = Self::line(component);
            ty.members.push(MemberSyntax::Field {
                name: name.clone(),
                type_text: self.node_text(type_node).to_string(),
                line,
            });
            ty.members.push(MemberSyntax::Method {
                name,
                parameter_types: Vec::new(),
                is_constructor: false,
                line,
            });
        }
    }

    fn parameter_types(&self, params: Node) -> Vec<String> {
        let mut types = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    if let Some(type_node) = param.child_by_field_name("type") {
                        let mut text = self.node_text(type_node).to_string();
                        // `String args[]`
                        if let Some(dims) = param.child_by_field_name("dimensions") {
                            text.push_str(self.node_text(dims));
                        }
                        types.push(text);
                    }
                }
                "spread_parameter" => {
                    if let Some(element) = self.spread_element_type(param) {
                        types.push(format!("{}...", element));
                    }
                }
                // receiver parameters (`Foo this`) are not part of the signature
                _ => {}
            }
        }
        types
    }

    fn spread_element_type(&self, param: Node) -> Option<&'a str> {
        let mut cursor = param.walk();
        let element = param.named_children(&mut cursor).find(|child| {
            !is_comment(*child)
                && !matches!(
                    child.kind(),
                    "modifiers" | "variable_declarator" | "marker_annotation" | "annotation"
                )
        });
        element.map(|e| self.node_text(e))
    }

    fn note_doc_comment(&mut self, node: Node) {
        let text = self.node_text(node);
        if !text.starts_with("/**") || text == "/**/" {
            return;
        }

        let documents = self.documented_declaration(node);
        let mut context = self.type_stack.clone();
        if let Some(Documented::Type(name)) = &documents {
            context.push(name.clone());
        }
        if context.is_empty() {
            debug!(line = Self::line(node), "doc comment outside any type; skipped");
            return;
        }

        self.doc_comments.push(DocComment {
            text: text.to_string(),
            line: Self::line(node),
            context,
            documents,
        });
    }

    /// The declaration a doc comment precedes, skipping other comments.
    fn documented_declaration(&self, comment: Node) -> Option<Documented> {
        let mut next = comment.next_named_sibling();
        while let Some(node) = next {
            if !is_comment(node) {
                break;
            }
            next = node.next_named_sibling();
        }
        let node = next?;

        match node.kind() {
            "method_declaration"
            | "constructor_declaration"
            | "annotation_type_element_declaration" => self.name_of(node).map(Documented::Method),
            "field_declaration" | "constant_declaration" => {
                let mut cursor = node.walk();
                let first = node
                    .children(&mut cursor)
                    .find(|c| c.kind() == "variable_declarator");
                first
                    .and_then(|d| self.name_of(d))
                    .map(Documented::Field)
            }
            "enum_constant" => self.name_of(node).map(Documented::Field),
            kind if type_kind(kind).is_some() => self.name_of(node).map(Documented::Type),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_java(source: &str) -> SourceUnit {
        JavaParser::new()
            .parse(source, Some(Path::new("Test.java")))
            .unwrap()
    }

    fn member_names(ty: &TypeSyntax) -> Vec<String> {
        ty.members
            .iter()
            .map(|m| match m {
                MemberSyntax::Field { name, .. } => name.clone(),
                MemberSyntax::Method {
                    name,
                    parameter_types,
                    ..
                } => format!("{}({})", name, parameter_types.join(",")),
            })
            .collect()
    }

    #[test]
    fn test_package_and_imports() {
        let unit = parse_java(
            r#"
package com.example;

import java.util.List;
import java.util.*;
import static java.util.Collections.emptyList;
import org.apache.commons.lang3.text.WordUtils;

public class TestJavadoc {}
"#,
        );
        assert_eq!(unit.package.as_deref(), Some("com.example"));
        assert_eq!(
            unit.imports,
            vec![
                ImportDecl::single("java.util.List"),
                ImportDecl::wildcard("java.util"),
                ImportDecl {
                    path: "java.util.Collections.emptyList".to_string(),
                    is_wildcard: false,
                    is_static: true,
                },
                ImportDecl::single("org.apache.commons.lang3.text.WordUtils"),
            ]
        );
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].name, "TestJavadoc");
        assert_eq!(unit.path.as_deref(), Some(Path::new("Test.java")));
    }

    #[test]
    fn test_members_and_parameter_types() {
        let unit = parse_java(
            r#"
public class Foo2 {
    public static final String mySimpleString = "x";
    private int a, b[];

    public Foo2() {}
    public Foo2(int size) {}

    public void newMethodBeingLinkedToo() {}
    void generic(Map<String, Integer> map, final List<? extends Number> nums) {}
    void arrays(String[] names, int matrix[][]) {}
    void varargs(String format, Object... args) {}
}
"#,
        );
        let foo2 = &unit.types[0];
        assert_eq!(
            member_names(foo2),
            vec![
                "mySimpleString",
                "a",
                "b",
                "Foo2()",
                "Foo2(int)",
                "newMethodBeingLinkedToo()",
                "generic(Map<String, Integer>,List<? extends Number>)",
                "arrays(String[],int[][])",
                "varargs(String,Object...)",
            ]
        );
        match &foo2.members[2] {
            MemberSyntax::Field { type_text, .. } => assert_eq!(type_text, "int[]"),
            other => panic!("expected field, got {:?}", other),
        }
        match &foo2.members[3] {
            MemberSyntax::Method { is_constructor, .. } => assert!(is_constructor),
            other => panic!("expected constructor, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_types_and_kinds() {
        let unit = parse_java(
            r#"
public class TestJavadoc {
    public class Inner {
        String test;
        interface Deeper {}
    }
    enum Color { RED, GREEN; void paint() {} }
    record Point(int x, int y) {}
    @interface Marker { String value(); }
}
"#,
        );
        let outer = &unit.types[0];
        let nested: Vec<_> = outer
            .nested
            .iter()
            .map(|t| (t.name.as_str(), t.kind))
            .collect();
        assert_eq!(
            nested,
            vec![
                ("Inner", TypeKind::Class),
                ("Color", TypeKind::Enum),
                ("Point", TypeKind::Record),
                ("Marker", TypeKind::Annotation),
            ]
        );

        let inner = &outer.nested[0];
        assert_eq!(member_names(inner), vec!["test"]);
        assert_eq!(inner.nested[0].name, "Deeper");
        assert_eq!(inner.nested[0].kind, TypeKind::Interface);

        assert_eq!(member_names(&outer.nested[1]), vec!["RED", "GREEN", "paint()"]);
        assert_eq!(member_names(&outer.nested[2]), vec!["x", "x()", "y", "y()"]);
        assert_eq!(member_names(&outer.nested[3]), vec!["value()"]);
    }

    #[test]
    fn test_doc_comment_context() {
        let unit = parse_java(
            r#"
/* license header */
package com.example;

/**
 * Top level {@link Inner}.
 */
public class TestJavadoc {
    /** The value {@value}. */
    public static final String mySimpleString = "hello";

    /**
     * Inner docs {@link #test}.
     */
    public class Inner {
        /** Field docs. */
        String test;
    }

    /** Method docs {@link #mySimpleString}. */
    // stray line comment
    public void run() {}
}
"#,
        );
        let summary: Vec<_> = unit
            .doc_comments
            .iter()
            .map(|c| (c.context.join("."), c.documents.clone(), c.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                (
                    "TestJavadoc".to_string(),
                    Some(Documented::Type("TestJavadoc".to_string())),
                    5
                ),
                (
                    "TestJavadoc".to_string(),
                    Some(Documented::Field("mySimpleString".to_string())),
                    9
                ),
                (
                    "TestJavadoc.Inner".to_string(),
                    Some(Documented::Type("Inner".to_string())),
                    12
                ),
                (
                    "TestJavadoc.Inner".to_string(),
                    Some(Documented::Field("test".to_string())),
                    16
                ),
                (
                    "TestJavadoc".to_string(),
                    Some(Documented::Method("run".to_string())),
                    20
                ),
            ]
        );
    }

    #[test]
    fn test_plain_block_comments_are_not_doc_comments() {
        let unit = parse_java(
            r#"
public class Foo {
    /* not javadoc {@link Missing} */
    void a() {}
    /**/
    void b() {}
}
"#,
        );
        assert!(unit.doc_comments.is_empty());
    }

    #[test]
    fn test_syntax_errors_are_tolerated() {
        let unit = parse_java(
            r#"
public class Broken {
    void ok() {}
    int = ;
}
"#,
        );
        assert!(unit.types.iter().all(|t| t.name == "Broken"));
    }

    #[test]
    fn test_default_package() {
        let unit = parse_java("class Lonely {}");
        assert_eq!(unit.package, None);
        assert_eq!(unit.types[0].name, "Lonely");
    }
}
