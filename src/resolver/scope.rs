//! Type-name lookup along the Java scope chain.
//!
//! Order for the first segment of a name, first match wins:
//! 1. nested types of the context type and each enclosing type, then the
//!    unit's top-level types;
//! 2. single-type imports, and single static imports that name a known
//!    nested type;
//! 3. on-demand (`.*`) imports;
//! 4. other units of the same package.
//!
//! Remaining segments walk nested types. A dotted name that fails scope
//! lookup is finally tried as a fully qualified name.

use tracing::trace;

use super::Symbol;
use crate::model::universe::Universe;
use crate::model::{CompilationUnit, TypeId};

/// Where a type name led.
#[derive(Debug, Clone)]
pub enum TypeTarget<'u> {
    Declared(&'u CompilationUnit, TypeId),
    /// Imported from outside the universe.
    External(String),
}

impl TypeTarget<'_> {
    pub fn into_symbol(self) -> Symbol {
        match self {
            TypeTarget::Declared(unit, id) => Symbol::for_type(unit, id),
            TypeTarget::External(qualified_name) => {
                Symbol::External(super::ExternalSymbol {
                    qualified_name,
                    member: None,
                })
            }
        }
    }

    fn nested(self, name: &str) -> Option<Self> {
        match self {
            TypeTarget::Declared(unit, id) => unit
                .ty(id)
                .nested
                .get(name)
                .map(|inner| TypeTarget::Declared(unit, *inner)),
            TypeTarget::External(outer) => Some(TypeTarget::External(format!("{}.{}", outer, name))),
        }
    }
}

pub fn resolve_type<'u>(
    name: &str,
    context_type: TypeId,
    context_unit: &'u CompilationUnit,
    universe: &'u Universe,
) -> Option<TypeTarget<'u>> {
    let mut segments = name.split('.');
    let first = segments.next()?;
    let rest: Vec<&str> = segments.collect();

    if let Some(head) = lookup_simple(first, context_type, context_unit, universe) {
        let found = rest
            .iter()
            .try_fold(head, |target, segment| target.nested(segment));
        if found.is_some() {
            return found;
        }
    }

    if !rest.is_empty() {
        if let Some((unit, id)) = universe.lookup_qualified(name) {
            trace!(type_name = name, "resolved as fully qualified name");
            return Some(TypeTarget::Declared(unit, id));
        }
    }
    None
}

fn lookup_simple<'u>(
    name: &str,
    context_type: TypeId,
    context_unit: &'u CompilationUnit,
    universe: &'u Universe,
) -> Option<TypeTarget<'u>> {
    if let Some(found) = lookup_lexical(name, context_type, context_unit) {
        trace!(type_name = name, "found in lexical scope");
        return Some(found);
    }
    if let Some(found) = lookup_single_import(name, context_unit, universe) {
        trace!(type_name = name, "found through single-type import");
        return Some(found);
    }
    if let Some(found) = lookup_wildcard_import(name, context_unit, universe) {
        trace!(type_name = name, "found through on-demand import");
        return Some(found);
    }
    if let Some(found) = lookup_same_package(name, context_unit, universe) {
        trace!(type_name = name, "found in same package");
        return Some(found);
    }
    None
}

fn lookup_lexical<'u>(
    name: &str,
    context_type: TypeId,
    unit: &'u CompilationUnit,
) -> Option<TypeTarget<'u>> {
    unit.scope_chain(context_type)
        .find_map(|ty| unit.ty(ty).nested.get(name).copied())
        .or_else(|| unit.top_level(name))
        .map(|id| TypeTarget::Declared(unit, id))
}

fn lookup_single_import<'u>(
    name: &str,
    unit: &CompilationUnit,
    universe: &'u Universe,
) -> Option<TypeTarget<'u>> {
    unit.imports()
        .iter()
        .filter(|i| i.bound_name() == Some(name))
        .find_map(|import| match universe.lookup_qualified(&import.path) {
            Some((declaring, id)) => Some(TypeTarget::Declared(declaring, id)),
            // A static import outside the universe may name a method or field.
            None if import.is_static => None,
            None => Some(TypeTarget::External(import.path.clone())),
        })
}

fn lookup_wildcard_import<'u>(
    name: &str,
    unit: &CompilationUnit,
    universe: &'u Universe,
) -> Option<TypeTarget<'u>> {
    unit.imports()
        .iter()
        .filter(|i| i.is_wildcard)
        .find_map(|import| {
            // `import pkg.*` (never static)
            if !import.is_static {
                let in_package = universe
                    .units_in_package(&import.path)
                    .find_map(|u| u.top_level(name).map(|id| TypeTarget::Declared(u, id)));
                if in_package.is_some() {
                    return in_package;
                }
            }
            // `import pkg.Outer.*` and `import static pkg.Outer.*`
            let (declaring, outer) = universe.lookup_qualified(&import.path)?;
            declaring
                .ty(outer)
                .nested
                .get(name)
                .map(|id| TypeTarget::Declared(declaring, *id))
        })
}

fn lookup_same_package<'u>(
    name: &str,
    unit: &CompilationUnit,
    universe: &'u Universe,
) -> Option<TypeTarget<'u>> {
    universe
        .units_in_package(unit.package())
        .filter(|u| u.id() != unit.id())
        .find_map(|u| u.top_level(name).map(|id| TypeTarget::Declared(u, id)))
}
