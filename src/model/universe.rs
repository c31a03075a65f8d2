use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use super::{CompilationUnit, TypeId, UnitId};

/// The set of compilation units visible to resolution.
///
/// A universe is an immutable snapshot: [`Universe::with_unit`] and
/// [`Universe::without_unit`] return a new universe that shares the unchanged
/// units with the old one.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    units: BTreeMap<UnitId, Arc<CompilationUnit>>,
    by_qualified_name: HashMap<String, (UnitId, TypeId)>,
    by_package: HashMap<String, Vec<UnitId>>,
}

impl Universe {
    pub fn from_units(units: impl IntoIterator<Item = CompilationUnit>) -> Self {
        let units = units
            .into_iter()
            .map(|unit| (unit.id(), Arc::new(unit)))
            .collect();
        Self::index(units)
    }

    /// A copy of this universe with `unit` added, replacing any unit with the same id.
    pub fn with_unit(&self, unit: CompilationUnit) -> Self {
        let mut units = self.units.clone();
        units.insert(unit.id(), Arc::new(unit));
        Self::index(units)
    }

    pub fn without_unit(&self, id: UnitId) -> Self {
        let mut units = self.units.clone();
        units.remove(&id);
        Self::index(units)
    }

    fn index(units: BTreeMap<UnitId, Arc<CompilationUnit>>) -> Self {
        let mut by_qualified_name: HashMap<String, (UnitId, TypeId)> = HashMap::new();
        let mut by_package: HashMap<String, Vec<UnitId>> = HashMap::new();

        for unit in units.values() {
            by_package
                .entry(unit.package().to_string())
                .or_default()
                .push(unit.id());

            for ty in unit.all_types() {
                match by_qualified_name.get(&ty.qualified_name) {
                    Some((first, _)) => {
                        warn!(
                            type_name = %ty.qualified_name,
                            kept = first.0,
                            ignored = unit.id().0,
                            "type declared in more than one unit; keeping the first"
                        );
                    }
                    None => {
                        by_qualified_name.insert(ty.qualified_name.clone(), (unit.id(), ty.id));
                    }
                }
            }
        }

        Self {
            units,
            by_qualified_name,
            by_package,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.get(&id).map(|u| u.as_ref())
    }

    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.values().map(|u| u.as_ref())
    }

    pub fn unit_by_path(&self, path: &Path) -> Option<&CompilationUnit> {
        self.units().find(|u| u.path() == Some(path))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Find a declared type (top-level or nested) by its fully qualified name.
    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<(&CompilationUnit, TypeId)> {
        let (unit, ty) = self.by_qualified_name.get(qualified_name)?;
        Some((self.unit(*unit)?, *ty))
    }

    pub fn units_in_package<'a>(
        &'a self,
        package: &str,
    ) -> impl Iterator<Item = &'a CompilationUnit> + 'a {
        self.by_package
            .get(package)
            .into_iter()
            .flatten()
            .filter_map(|id| self.unit(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::build;
    use crate::model::TypeKind;
    use crate::parser::{SourceUnit, TypeSyntax};

    fn unit(id: u64, package: &str, types: &[&str]) -> CompilationUnit {
        let source = SourceUnit {
            package: Some(package.to_string()),
            types: types
                .iter()
                .map(|name| TypeSyntax::new(*name, TypeKind::Class, 1))
                .collect(),
            ..Default::default()
        };
        build(&source, UnitId(id)).unwrap()
    }

    #[test]
    fn test_lookup_by_qualified_name_and_package() {
        let universe = Universe::from_units(vec![
            unit(1, "com.example", &["Foo"]),
            unit(2, "com.example", &["Bar"]),
            unit(3, "com.other", &["Baz"]),
        ]);

        let (found, ty) = universe.lookup_qualified("com.other.Baz").unwrap();
        assert_eq!(found.id(), UnitId(3));
        assert_eq!(found.ty(ty).simple_name, "Baz");

        let ids: Vec<_> = universe
            .units_in_package("com.example")
            .map(|u| u.id())
            .collect();
        assert_eq!(ids, vec![UnitId(1), UnitId(2)]);
        assert_eq!(universe.units_in_package("missing").count(), 0);
    }

    #[test]
    fn test_with_unit_leaves_old_snapshot_untouched() {
        let old = Universe::from_units(vec![unit(1, "com.example", &["Foo"])]);
        let new = old.with_unit(unit(1, "com.example", &["Renamed"]));

        assert!(old.lookup_qualified("com.example.Foo").is_some());
        assert!(old.lookup_qualified("com.example.Renamed").is_none());
        assert!(new.lookup_qualified("com.example.Foo").is_none());
        assert!(new.lookup_qualified("com.example.Renamed").is_some());
        assert_eq!(new.len(), 1);
    }

    #[test]
    fn test_duplicate_qualified_name_keeps_first_unit() {
        let universe = Universe::from_units(vec![
            unit(2, "com.example", &["Foo"]),
            unit(1, "com.example", &["Foo"]),
        ]);
        let (found, _) = universe.lookup_qualified("com.example.Foo").unwrap();
        assert_eq!(found.id(), UnitId(1));
    }

    #[test]
    fn test_without_unit() {
        let universe = Universe::from_units(vec![unit(1, "a", &["A"]), unit(2, "b", &["B"])]);
        let smaller = universe.without_unit(UnitId(1));
        assert_eq!(smaller.len(), 1);
        assert_eq!(smaller.units_in_package("a").count(), 0);
        assert!(smaller.lookup_qualified("b.B").is_some());
    }
}
