//! The compilation unit record
//!
//! One [`CompilationUnit`] is created per source before any phase runs and
//! is handed from phase to phase. Each field has a single owning phase:
//!
//! | Phase   | Writes |
//! |---------|--------|
//! | parser  | body, tree arena, first XML position |
//! | namer   | synthetic definitions, dependencies, defined declarations |
//! | typer   | computation cache, checked features, post-typer checks |
//! | backend | backend artifacts, post-unit checks |
//!
//! There is no internal locking. A unit must be confined to one worker at a
//! time; distinct units share nothing mutable.

use crate::fresh::guard_fresh_name;
use crate::{
    CheckPoint, CheckQueue, CheckRunner, ComputationCache, DeferredCheck, DependencyReport,
    DependencyTracker, Diagnostics, Feature, FreshNameCreator, Session, Severity,
    SyntheticDefinitions, TermName, TypeName, UnitError,
};
use indexmap::IndexSet;
use keel_ast::{DeclId, DeclTable, Declaration, Node, NodeId, Position, SourceFile, Span, TreeArena};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// The unit that stands for "no unit"
///
/// It is bound to the absent source, never exists, and only ever hands out
/// shared references, so nothing can mutate it.
pub static NO_COMPILATION_UNIT: LazyLock<CompilationUnit> =
    LazyLock::new(|| CompilationUnit::new(Session::global(), SourceFile::absent()));

/// An intermediate-representation class produced by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrClass {
    pub name: String,
    /// Declaration the class was generated for, if any
    pub decl: Option<DeclId>,
    pub code: Vec<u8>,
}

impl IrClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl: None,
            code: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct CompilationUnit {
    source: SourceFile,
    session: Arc<Session>,
    fresh: FreshNameCreator,
    trees: TreeArena,
    body: Option<NodeId>,
    synthetics: SyntheticDefinitions,
    cache: ComputationCache,
    deps: DependencyTracker,
    checks: CheckQueue,
    checked_features: HashSet<Feature>,
    first_xml_pos: Option<Position>,
    target_pos: Option<Span>,
    artifacts: IndexSet<IrClass>,
    diagnostics: Diagnostics,
}

impl CompilationUnit {
    pub fn new(session: Arc<Session>, source: SourceFile) -> Self {
        Self::with_fresh_names(session, source, FreshNameCreator::new())
    }

    /// Build a unit that mints names from an existing creator
    pub fn with_fresh_names(
        session: Arc<Session>,
        source: SourceFile,
        fresh: FreshNameCreator,
    ) -> Self {
        Self {
            source,
            session,
            fresh,
            trees: TreeArena::new(),
            body: None,
            synthetics: SyntheticDefinitions::new(),
            cache: ComputationCache::new(),
            deps: DependencyTracker::new(),
            checks: CheckQueue::new(),
            checked_features: HashSet::new(),
            first_xml_pos: None,
            target_pos: None,
            artifacts: IndexSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The shared "no unit" value
    pub fn none() -> &'static CompilationUnit {
        &NO_COMPILATION_UNIT
    }

    pub fn exists(&self) -> bool {
        self.source.exists()
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_java(&self) -> bool {
        self.source.is_java()
    }

    pub fn is_virtual(&self) -> bool {
        self.source.is_virtual()
    }

    /// Source text in `span`; empty for empty or inverted spans
    pub fn source_text(&self, span: Span) -> &str {
        self.source.text(span)
    }

    pub fn position(&self, offset: usize) -> Position {
        self.source.position(offset)
    }

    /// Position of the start of `node`, or [`Position::NONE`] if it is not in this unit
    pub fn node_position(&self, node: NodeId) -> Position {
        self.trees
            .get(node)
            .map_or(Position::NONE, |n| self.position(n.span.start))
    }

    // --- parser ---

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    pub fn body_node(&self) -> Option<&Node> {
        self.body.and_then(|id| self.trees.get(id))
    }

    /// Install a new root; the parser sets it first, later phases may swap in a rewritten root
    pub fn set_body(&mut self, root: NodeId) -> Option<NodeId> {
        self.body.replace(root)
    }

    pub fn trees(&self) -> &TreeArena {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut TreeArena {
        &mut self.trees
    }

    pub fn first_xml_position(&self) -> Option<Position> {
        self.first_xml_pos
    }

    /// Remember where the first XML literal was seen
    ///
    /// Only the first call has an effect; returns whether it did.
    pub fn note_xml_literal(&mut self, pos: Position) -> bool {
        if self.first_xml_pos.is_some() {
            return false;
        }
        self.first_xml_pos = Some(pos);
        true
    }

    // --- fresh names ---

    pub fn fresh_term_name(&mut self, prefix: &str) -> TermName {
        guard_fresh_name(&self.session, &self.source, prefix);
        self.fresh.fresh_term_name(prefix)
    }

    pub fn fresh_type_name(&mut self, prefix: &str) -> TypeName {
        guard_fresh_name(&self.session, &self.source, prefix);
        self.fresh.fresh_type_name(prefix)
    }

    pub fn fresh_names(&self) -> &FreshNameCreator {
        &self.fresh
    }

    /// The unit's creator without the typer-phase warning
    pub fn fresh_names_mut(&mut self) -> &mut FreshNameCreator {
        &mut self.fresh
    }

    // --- namer ---

    pub fn synthetics(&self) -> &SyntheticDefinitions {
        &self.synthetics
    }

    pub fn synthetics_mut(&mut self) -> &mut SyntheticDefinitions {
        &mut self.synthetics
    }

    /// Record that this unit refers to `target`; see [`DependencyTracker::register_dependency`]
    pub fn register_dependency(&mut self, target: &Declaration) -> bool {
        self.deps
            .register_dependency(&self.session, &self.source, target)
    }

    pub fn register_definition(&mut self, decl: DeclId) -> bool {
        self.deps.register_definition(&self.source, decl)
    }

    pub fn dependencies(&self) -> &IndexSet<DeclId> {
        self.deps.dependencies()
    }

    pub fn defined_declarations(&self) -> &IndexSet<DeclId> {
        self.deps.defined()
    }

    pub fn dependency_report(&self, decls: &DeclTable) -> DependencyReport {
        self.deps.report(&self.source, decls)
    }

    // --- typer ---

    pub fn computation_cache(&self) -> &ComputationCache {
        &self.cache
    }

    pub fn computation_cache_mut(&mut self) -> &mut ComputationCache {
        &mut self.cache
    }

    pub fn checked_features(&self) -> &HashSet<Feature> {
        &self.checked_features
    }

    pub fn checked_features_mut(&mut self) -> &mut HashSet<Feature> {
        &mut self.checked_features
    }

    /// Sub-range type checking is narrowed to, if any
    pub fn target_position(&self) -> Option<Span> {
        self.target_pos
    }

    pub fn set_target_position(&mut self, target: Option<Span>) {
        self.target_pos = target;
    }

    /// Whether `span` is inside the checked range (always, when no range is set)
    pub fn targets(&self, span: Span) -> bool {
        self.target_pos.map_or(true, |target| target.contains(span))
    }

    // --- backend ---

    pub fn backend_artifacts(&self) -> &IndexSet<IrClass> {
        &self.artifacts
    }

    /// Append a generated class; returns false if an identical one is already present
    pub fn add_artifact(&mut self, class: IrClass) -> bool {
        self.artifacts.insert(class)
    }

    // --- deferred checks ---

    pub fn add_post_unit_check(&mut self, check: DeferredCheck) {
        self.checks.push_post_unit(check);
    }

    pub fn add_post_typer_check(&mut self, check: DeferredCheck) {
        self.checks.push_post_typer(check);
    }

    pub fn checks(&self) -> &CheckQueue {
        &self.checks
    }

    /// Run every check queued for `checkpoint`, oldest first, and remove it
    ///
    /// Checks queued for the same checkpoint while draining run in the same
    /// drain. The first failure stops the drain: the failing check is
    /// consumed and the ones not yet run stay queued in order.
    pub fn run_checks(
        &mut self,
        checkpoint: CheckPoint,
        runner: &mut dyn CheckRunner,
    ) -> Result<usize, UnitError> {
        let mut ran = 0;
        loop {
            let batch = self.checks.take(checkpoint);
            if batch.is_empty() {
                break;
            }
            let mut pending = batch.into_iter();
            while let Some(check) = pending.next() {
                if let Err(source) = runner.run(self, &check) {
                    self.checks.requeue_front(checkpoint, pending.collect());
                    return Err(UnitError::CheckFailed {
                        unit: self.to_string(),
                        source,
                    });
                }
                ran += 1;
            }
        }
        debug!(unit = %self, ?checkpoint, ran, "deferred checks drained");
        Ok(ran)
    }

    // --- diagnostics ---

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn error(&mut self, pos: Position, message: impl Into<String>) {
        self.diagnostics.report(Severity::Error, pos, message);
    }

    pub fn warning(&mut self, pos: Position, message: impl Into<String>) {
        self.diagnostics.report(Severity::Warning, pos, message);
    }

    pub fn echo(&mut self, pos: Position, message: impl Into<String>) {
        self.diagnostics.report(Severity::Info, pos, message);
    }

    /// Release every cache once the pipeline is done with the unit
    ///
    /// The source and fresh-name counters survive, so names minted after a
    /// clear still do not collide with earlier ones.
    pub fn clear(&mut self) {
        self.trees.clear();
        self.body = None;
        self.synthetics.clear();
        self.cache.clear();
        self.deps.clear();
        self.checks.clear();
        self.checked_features.clear();
        self.first_xml_pos = None;
        self.target_pos = None;
        self.artifacts.clear();
        self.diagnostics.clear();
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}
