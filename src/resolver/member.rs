use super::scope::TypeTarget;
use super::{ExternalSymbol, ResolutionResult, Symbol};
use crate::link::MemberPart;

/// Find `member` among the members declared directly on `target`.
///
/// With a parameter list only an overload whose normalised parameter types
/// equal the list matches; without one the first declaration of that name
/// wins. Members of external types cannot be checked and are accepted as written.
pub fn resolve_member(target: &TypeTarget<'_>, member: &MemberPart) -> ResolutionResult {
    let (unit, ty) = match target {
        TypeTarget::Declared(unit, ty) => (*unit, *ty),
        TypeTarget::External(qualified_name) => {
            return ResolutionResult::Resolved(Symbol::External(ExternalSymbol {
                qualified_name: qualified_name.clone(),
                member: Some(member.to_string()),
            }));
        }
    };

    let mut candidates = unit.members_named(ty, &member.name);
    let found = match &member.parameters {
        None => candidates.next(),
        Some(params) => {
            candidates.find(|(_, decl)| decl.parameter_types() == Some(params.as_slice()))
        }
    };

    match found {
        Some((id, _)) => ResolutionResult::Resolved(Symbol::for_member(unit, id)),
        None => ResolutionResult::MemberNotFound {
            type_name: unit.ty(ty).qualified_name.clone(),
            member: member.to_string(),
        },
    }
}
