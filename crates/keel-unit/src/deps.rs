//! Inter-unit dependency tracking for incremental builds
//!
//! No unit may depend on a unit whose source is virtual. Without that rule a
//! macro expansion that produces virtual source B referencing persistent A
//! makes "A depends on B", and every rebuild of A regenerates B, which
//! triggers a rebuild of A again.

use crate::Session;
use indexmap::IndexSet;
use keel_ast::{DeclId, DeclTable, Declaration, SourceFile};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::trace;

static NO_DECLS: LazyLock<IndexSet<DeclId>> = LazyLock::new(IndexSet::new);

/// Edges out of one unit: what it refers to and what it introduces
///
/// Both sets stay unallocated until the first edge is actually recorded.
#[derive(Debug, Default, Clone)]
pub struct DependencyTracker {
    depends: Option<IndexSet<DeclId>>,
    defined: Option<IndexSet<DeclId>>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that code in `unit` refers to `target`
    ///
    /// The tracking flag is read from the session on every call. Returns
    /// whether a new edge was recorded.
    pub fn register_dependency(
        &mut self,
        session: &Session,
        unit: &SourceFile,
        target: &Declaration,
    ) -> bool {
        if !session.tracks_dependencies() {
            return false;
        }
        if !unit.exists() || unit.is_virtual() {
            trace!(unit = %unit, target = %target.name, "dependency from virtual unit ignored");
            return false;
        }
        if target.is_from_virtual_source() {
            trace!(unit = %unit, target = %target.name, "dependency on virtual unit ignored");
            return false;
        }
        self.depends
            .get_or_insert_with(IndexSet::new)
            .insert(target.id)
    }

    /// Record that `unit` introduces `decl`; ignored for virtual or absent units
    pub fn register_definition(&mut self, unit: &SourceFile, decl: DeclId) -> bool {
        if !unit.exists() || unit.is_virtual() {
            return false;
        }
        self.defined.get_or_insert_with(IndexSet::new).insert(decl)
    }

    /// Declarations this unit depends on, in registration order
    pub fn dependencies(&self) -> &IndexSet<DeclId> {
        self.depends.as_ref().unwrap_or(&*NO_DECLS)
    }

    /// Declarations this unit introduces, in registration order
    pub fn defined(&self) -> &IndexSet<DeclId> {
        self.defined.as_ref().unwrap_or(&*NO_DECLS)
    }

    /// Whether any storage has been allocated for edges
    pub fn is_allocated(&self) -> bool {
        self.depends.is_some() || self.defined.is_some()
    }

    pub fn report(&self, unit: &SourceFile, decls: &DeclTable) -> DependencyReport {
        let names = |ids: &IndexSet<DeclId>| -> Vec<String> {
            ids.iter()
                .filter_map(|id| decls.name_of(*id).map(str::to_string))
                .collect()
        };
        DependencyReport {
            source: unit.to_string(),
            dependencies: names(self.dependencies()),
            defined: names(self.defined()),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.depends = None;
        self.defined = None;
    }
}

/// Serializable summary consumed by incremental-build tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub source: String,
    pub dependencies: Vec<String>,
    pub defined: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use keel_ast::DeclKind;

    fn tracking() -> Session {
        Session::new(Settings {
            track_dependencies: true,
            ..Settings::default()
        })
    }

    fn decl(table: &mut DeclTable, name: &str, source: &SourceFile) -> Declaration {
        let id = table.declare(name, DeclKind::Method, source.clone()).unwrap();
        table.get(id).unwrap().clone()
    }

    #[test]
    fn disabled_tracking_records_nothing() {
        let session = Session::default();
        let a = SourceFile::new("A.scala", "");
        let b = SourceFile::new("B.scala", "");
        let mut table = DeclTable::new();
        let foo = decl(&mut table, "B.foo", &b);

        let mut tracker = DependencyTracker::new();
        assert!(!tracker.register_dependency(&session, &a, &foo));
        assert!(tracker.dependencies().is_empty());
        assert!(!tracker.is_allocated());
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let session = tracking();
        let a = SourceFile::new("A.scala", "");
        let b = SourceFile::new("B.scala", "");
        let mut table = DeclTable::new();
        let foo = decl(&mut table, "B.foo", &b);

        let mut tracker = DependencyTracker::new();
        assert!(tracker.register_dependency(&session, &a, &foo));
        assert!(!tracker.register_dependency(&session, &a, &foo));
        assert_eq!(tracker.dependencies().len(), 1);
        assert!(tracker.dependencies().contains(&foo.id));
    }

    #[test]
    fn virtual_endpoints_are_excluded() {
        let session = tracking();
        let persistent = SourceFile::new("A.scala", "");
        let generated = SourceFile::virtual_file("<macro>", "");
        let mut table = DeclTable::new();
        let on_persistent = decl(&mut table, "A.foo", &persistent);
        let on_virtual = decl(&mut table, "gen.bar", &generated);

        let mut from_virtual = DependencyTracker::new();
        assert!(!from_virtual.register_dependency(&session, &generated, &on_persistent));
        assert!(from_virtual.dependencies().is_empty());

        let mut into_virtual = DependencyTracker::new();
        assert!(!into_virtual.register_dependency(&session, &persistent, &on_virtual));
        assert!(into_virtual.dependencies().is_empty());
    }

    #[test]
    fn definitions_only_for_persistent_units() {
        let mut tracker = DependencyTracker::new();
        assert!(!tracker.register_definition(&SourceFile::virtual_file("<macro>", ""), DeclId(0)));
        assert!(!tracker.register_definition(&SourceFile::absent(), DeclId(0)));
        assert!(tracker.defined().is_empty());

        assert!(tracker.register_definition(&SourceFile::new("A.scala", ""), DeclId(0)));
        assert_eq!(tracker.defined().len(), 1);
    }

    #[test]
    fn report_names_edges() {
        let session = tracking();
        let a = SourceFile::new("A.scala", "");
        let b = SourceFile::new("B.scala", "");
        let mut table = DeclTable::new();
        let own = decl(&mut table, "A.main", &a);
        let foo = decl(&mut table, "B.foo", &b);

        let mut tracker = DependencyTracker::new();
        tracker.register_definition(&a, own.id);
        tracker.register_dependency(&session, &a, &foo);

        let report = tracker.report(&a, &table);
        assert_eq!(report.source, "A.scala");
        assert_eq!(report.dependencies, vec!["B.foo".to_string()]);
        assert_eq!(report.defined, vec!["A.main".to_string()]);
    }
}
