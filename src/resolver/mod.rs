use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::link::{LinkError, LinkReference};
use crate::model::universe::Universe;
use crate::model::{CompilationUnit, MemberId, TypeId, TypeKind, UnitId};

pub mod member;
pub mod scope;

use scope::TypeTarget;

/// Handle to a resolved symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Symbol {
    Type(TypeSymbol),
    Member(MemberSymbol),
    /// A type outside the universe, known only by name.
    External(ExternalSymbol),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSymbol {
    pub unit: UnitId,
    pub id: TypeId,
    pub qualified_name: String,
    pub type_kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSymbol {
    pub unit: UnitId,
    pub id: MemberId,
    /// Qualified name of the declaring type.
    pub owner: String,
    pub signature: String,
    pub member_kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalSymbol {
    pub qualified_name: String,
    /// Member text from the link, carried unverified.
    pub member: Option<String>,
}

impl Symbol {
    pub(crate) fn for_type(unit: &CompilationUnit, id: TypeId) -> Self {
        let ty = unit.ty(id);
        Symbol::Type(TypeSymbol {
            unit: unit.id(),
            id,
            qualified_name: ty.qualified_name.clone(),
            type_kind: ty.kind,
        })
    }

    pub(crate) fn for_member(unit: &CompilationUnit, id: MemberId) -> Self {
        let member = unit.member(id);
        Symbol::Member(MemberSymbol {
            unit: unit.id(),
            id,
            owner: unit.ty(member.owner()).qualified_name.clone(),
            signature: member.signature(),
            member_kind: member.kind_str(),
        })
    }

    /// `pkg.Type`, `pkg.Type#member(params)`.
    pub fn display_name(&self) -> String {
        match self {
            Symbol::Type(t) => t.qualified_name.clone(),
            Symbol::Member(m) => format!("{}#{}", m.owner, m.signature),
            Symbol::External(e) => match &e.member {
                Some(member) => format!("{}#{}", e.qualified_name, member),
                None => e.qualified_name.clone(),
            },
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved(Symbol),
    TypeNotFound { attempted: String },
    MemberNotFound { type_name: String, member: String },
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            ResolutionResult::Resolved(symbol) => Some(symbol),
            _ => None,
        }
    }
}

/// Resolve a parsed link in the scope of `context_type`, declared in `context_unit`.
///
/// "Not found" outcomes are values of [`ResolutionResult`]; the only error is a
/// reference that names neither a type nor a member. A `context_type` that
/// `context_unit` does not declare leaves nothing to resolve against and
/// yields `TypeNotFound`.
pub fn resolve(
    reference: &LinkReference,
    context_type: TypeId,
    context_unit: &CompilationUnit,
    universe: &Universe,
) -> Result<ResolutionResult, LinkError> {
    if reference.type_part.is_none() && reference.member_part.is_none() {
        return Err(LinkError::malformed(
            &reference.raw_text,
            "reference names neither a type nor a member",
        ));
    }
    let Some(context) = context_unit.get_ty(context_type) else {
        debug!(reference = %reference.raw_text, "context type not declared in unit");
        return Ok(ResolutionResult::TypeNotFound {
            attempted: reference
                .type_part
                .clone()
                .unwrap_or_else(|| reference.raw_text.clone()),
        });
    };

    let target = match &reference.type_part {
        None => TypeTarget::Declared(context_unit, context_type),
        Some(name) => {
            match scope::resolve_type(name, context_type, context_unit, universe) {
                Some(target) => target,
                None => {
                    debug!(
                        reference = %reference.raw_text,
                        context = %context.qualified_name,
                        "type not found"
                    );
                    return Ok(ResolutionResult::TypeNotFound {
                        attempted: name.clone(),
                    });
                }
            }
        }
    };

    let result = match &reference.member_part {
        None => ResolutionResult::Resolved(target.into_symbol()),
        Some(member) => member::resolve_member(&target, member),
    };
    debug!(reference = %reference.raw_text, resolved = result.is_resolved(), "resolved link");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::parse;
    use crate::model::builder::build;
    use crate::model::{ImportDecl, TypeKind};
    use crate::parser::{SourceUnit, TypeSyntax};

    fn foo2_unit() -> CompilationUnit {
        let source = SourceUnit {
            package: Some("com.example.other".to_string()),
            types: vec![TypeSyntax::new("Foo2", TypeKind::Class, 1)
                .with_method("newMethodBeingLinkedToo", &[])
                .with_method("overloaded", &["int"])
                .with_method("overloaded", &["String", "int"])
                .with_field("count", "int")],
            ..Default::default()
        };
        build(&source, UnitId(1)).unwrap()
    }

    fn resolve_in(raw: &str, unit: &CompilationUnit, universe: &Universe) -> ResolutionResult {
        let context = unit.top_level_types().next().unwrap().id;
        resolve(&parse(raw).unwrap(), context, unit, universe).unwrap()
    }

    #[test]
    fn test_context_type_from_other_unit() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        let result = resolve(&parse("#overloaded").unwrap(), TypeId(99), &unit, &universe).unwrap();
        assert_eq!(
            result,
            ResolutionResult::TypeNotFound {
                attempted: "#overloaded".to_string()
            }
        );
    }

    #[test]
    fn test_self_method_link() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        let result = resolve_in("#newMethodBeingLinkedToo", &unit, &universe);
        assert_eq!(
            result.symbol().map(|s| s.display_name()).as_deref(),
            Some("com.example.other.Foo2#newMethodBeingLinkedToo()")
        );
    }

    #[test]
    fn test_invisible_type_is_not_found() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        assert_eq!(
            resolve_in("Foo#linkedFromFoo2()", &unit, &universe),
            ResolutionResult::TypeNotFound {
                attempted: "Foo".to_string()
            }
        );
        assert_eq!(
            resolve_in("LinkToSomethingNotFound", &unit, &universe),
            ResolutionResult::TypeNotFound {
                attempted: "LinkToSomethingNotFound".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_parameter_list_selects_overload() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);

        let result = resolve_in("#overloaded(String, int)", &unit, &universe);
        assert_eq!(
            result.symbol().unwrap().display_name(),
            "com.example.other.Foo2#overloaded(String, int)"
        );

        let result = resolve_in("#overloaded(int)", &unit, &universe);
        assert_eq!(
            result.symbol().unwrap().display_name(),
            "com.example.other.Foo2#overloaded(int)"
        );

        assert_eq!(
            resolve_in("#overloaded(long)", &unit, &universe),
            ResolutionResult::MemberNotFound {
                type_name: "com.example.other.Foo2".to_string(),
                member: "overloaded(long)".to_string(),
            }
        );
    }

    #[test]
    fn test_without_parameters_first_overload_wins() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        let result = resolve_in("#overloaded", &unit, &universe);
        assert_eq!(
            result.symbol().unwrap().display_name(),
            "com.example.other.Foo2#overloaded(int)"
        );
    }

    #[test]
    fn test_field_never_matches_parameter_list() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        assert!(resolve_in("#count", &unit, &universe).is_resolved());
        assert!(!resolve_in("#count()", &unit, &universe).is_resolved());
    }

    #[test]
    fn test_missing_member() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        assert_eq!(
            resolve_in("#nothingHere", &unit, &universe),
            ResolutionResult::MemberNotFound {
                type_name: "com.example.other.Foo2".to_string(),
                member: "nothingHere".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_reference_is_malformed() {
        let unit = foo2_unit();
        let universe = Universe::from_units(vec![unit.clone()]);
        let reference = LinkReference {
            raw_text: String::new(),
            type_part: None,
            member_part: None,
            label: None,
        };
        let err = resolve(&reference, TypeId(0), &unit, &universe).unwrap_err();
        assert!(matches!(err, LinkError::MalformedReference { .. }));
    }

    #[test]
    fn test_imported_external_type_is_opaque() {
        let source = SourceUnit {
            package: Some("com.example".to_string()),
            imports: vec![ImportDecl::single("org.apache.commons.lang3.text.WordUtils")],
            types: vec![TypeSyntax::new("TestJavadoc", TypeKind::Class, 1)],
            ..Default::default()
        };
        let unit = build(&source, UnitId(1)).unwrap();
        let universe = Universe::from_units(vec![unit.clone()]);

        assert_eq!(
            resolve_in("WordUtils", &unit, &universe),
            ResolutionResult::Resolved(Symbol::External(ExternalSymbol {
                qualified_name: "org.apache.commons.lang3.text.WordUtils".to_string(),
                member: None,
            }))
        );

        let result = resolve_in("WordUtils#wrap(String, int)", &unit, &universe);
        assert_eq!(
            result.symbol().unwrap().display_name(),
            "org.apache.commons.lang3.text.WordUtils#wrap(String, int)"
        );
    }
}
