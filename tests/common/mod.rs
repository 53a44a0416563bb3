//! A toy line-oriented pipeline driven through every phase
//!
//! One statement per line:
//!
//! - `def NAME` defines `NAME`
//! - `case NAME` defines `NAME` plus a compiler-generated `NAME.apply`
//! - `use NAME` refers to `NAME`
//! - `feature NAME` uses a language feature
//! - `assert WORD` queues a host validation that holds only for `true`
//! - `<xml/>` is an XML literal

#![allow(dead_code)]

use keel::ast::{DeclId, DeclKind, DeclTable, Node, NodeId, NodeKind, SourceFile, Span};
use keel::driver::{CompilerPhase, Driver, PhaseError};
use keel::unit::{
    CheckFailure, CheckRunner, CompilationUnit, DeferredCheck, Feature, IrClass, Phase, Session,
    Settings, StandardChecks,
};
use std::sync::Arc;

/// Install a test subscriber; `RUST_LOG=keel_unit=trace` shows the unit's logging
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn session(track_dependencies: bool) -> Arc<Session> {
    Session::shared(Settings {
        track_dependencies,
        ..Settings::default()
    })
}

/// Pre-enter every top-level definition, the way a symbol loader would
pub fn declare_all(sources: &[SourceFile]) -> Arc<DeclTable> {
    let mut decls = DeclTable::new();
    for source in sources {
        for line in source.content().lines() {
            match line.trim().split_once(' ') {
                Some(("def", name)) => {
                    decls.declare(name, DeclKind::Method, source.clone()).unwrap();
                }
                Some(("case", name)) => {
                    decls.declare(name, DeclKind::Class, source.clone()).unwrap();
                    decls
                        .declare(format!("{name}.apply"), DeclKind::Method, source.clone())
                        .unwrap();
                }
                _ => {}
            }
        }
    }
    Arc::new(decls)
}

/// A driver with all four phases registered
pub fn pipeline(session: Arc<Session>, decls: &Arc<DeclTable>, leak_synthetics: bool) -> Driver {
    let mut driver = Driver::new(session);
    driver
        .add_phase(LineParser)
        .add_phase(Namer {
            decls: Arc::clone(decls),
        })
        .add_phase(Typer { leak_synthetics })
        .add_phase(Backend {
            decls: Arc::clone(decls),
        });
    driver
}

fn statement(text: &str) -> Result<Option<NodeKind>, PhaseError> {
    if text.is_empty() {
        return Ok(None);
    }
    if text == "<xml/>" {
        return Ok(Some(NodeKind::XmlLiteral));
    }
    let kind = match text.split_once(' ') {
        Some(("def", name)) => NodeKind::DefDef { name: name.into() },
        Some(("case", name)) => NodeKind::ClassDef { name: name.into() },
        Some(("use", name)) => NodeKind::Ident { name: name.into() },
        Some(("feature", name)) => NodeKind::Import {
            path: format!("language.{name}"),
        },
        Some(("assert", value)) => NodeKind::Literal {
            value: value.into(),
        },
        _ => return Err(PhaseError::new(format!("cannot parse `{text}`"))),
    };
    Ok(Some(kind))
}

/// Top-level statements of the unit's body
fn statements(unit: &CompilationUnit) -> Vec<(NodeId, Node)> {
    let Some(root) = unit.body() else {
        return Vec::new();
    };
    unit.trees()
        .children(root)
        .iter()
        .filter_map(|id| unit.trees().get(*id).map(|n| (*id, n.clone())))
        .collect()
}

pub struct LineParser;

impl CompilerPhase for LineParser {
    fn phase(&self) -> Phase {
        Phase::Parser
    }

    fn run(&mut self, unit: &mut CompilationUnit) -> Result<(), PhaseError> {
        let source = unit.source().clone();
        let mut children = Vec::new();
        let mut offset = 0;
        for line in source.content().split_inclusive('\n') {
            let text = line.trim_end();
            let span = Span::new(offset, offset + text.len());
            offset += line.len();

            let Some(kind) = statement(text)? else {
                continue;
            };
            if kind == NodeKind::XmlLiteral {
                let pos = unit.position(span.start);
                unit.note_xml_literal(pos);
            }
            children.push(unit.trees_mut().alloc(Node::new(kind, span)));
        }

        let root = Node::new(NodeKind::Block, Span::new(0, source.len())).with_children(children);
        let root = unit.trees_mut().alloc(root);
        unit.set_body(root);
        Ok(())
    }
}

pub struct Namer {
    pub decls: Arc<DeclTable>,
}

impl CompilerPhase for Namer {
    fn phase(&self) -> Phase {
        Phase::Namer
    }

    fn run(&mut self, unit: &mut CompilationUnit) -> Result<(), PhaseError> {
        for (id, node) in statements(unit) {
            match node.kind {
                NodeKind::DefDef { name } => {
                    if let Some(decl) = self.decls.get_by_name(&name) {
                        unit.register_definition(decl.id);
                    }
                }
                NodeKind::ClassDef { name } => {
                    if let Some(decl) = self.decls.get_by_name(&name) {
                        unit.register_definition(decl.id);
                    }
                    let apply = format!("{name}.apply");
                    if let Some(decl) = self.decls.get_by_name(&apply) {
                        let tree = unit
                            .trees_mut()
                            .alloc(Node::new(NodeKind::Synthetic { name: apply }, node.span));
                        unit.synthetics_mut().put(decl.id, tree);
                    }
                }
                NodeKind::Ident { name } => match self.decls.get_by_name(&name) {
                    Some(target) => {
                        unit.register_dependency(target);
                    }
                    None => {
                        let pos = unit.node_position(id);
                        unit.error(pos, format!("not found: {name}"));
                    }
                },
                _ => {}
            }
        }
        Ok(())
    }
}

/// Moves staged synthetics into the tree and memoizes what it checked
pub struct Typer {
    /// Leave staged synthetics behind
    pub leak_synthetics: bool,
}

impl CompilerPhase for Typer {
    fn phase(&self) -> Phase {
        Phase::Typer
    }

    fn run(&mut self, unit: &mut CompilationUnit) -> Result<(), PhaseError> {
        let Some(root) = unit.body() else {
            return Ok(());
        };
        unit.add_post_typer_check(DeferredCheck::SyntheticsDrained);

        if !self.leak_synthetics {
            let staged: Vec<DeclId> = unit.synthetics().keys().collect();
            for decl in staged {
                if let Some(tree) = unit.synthetics_mut().remove(decl) {
                    if let Some(body) = unit.trees_mut().get_mut(root) {
                        body.children.push(tree);
                    }
                    unit.computation_cache_mut().put(tree, tree);
                }
            }
        }

        for (id, node) in statements(unit) {
            if !unit.targets(node.span) {
                continue;
            }
            if let NodeKind::Import { path } = &node.kind {
                if let Some(name) = path.strip_prefix("language.") {
                    let pos = unit.node_position(id);
                    unit.add_post_unit_check(DeferredCheck::FeatureEnabled {
                        feature: Feature::new(name),
                        pos,
                    });
                }
            }
            unit.computation_cache_mut().put(id, id);
        }
        unit.computation_cache_mut().put(root, root);
        Ok(())
    }
}

/// Emits one class per definition, including re-homed synthetics
pub struct Backend {
    pub decls: Arc<DeclTable>,
}

impl CompilerPhase for Backend {
    fn phase(&self) -> Phase {
        Phase::Backend
    }

    fn run(&mut self, unit: &mut CompilationUnit) -> Result<(), PhaseError> {
        let Some(root) = unit.body() else {
            return Ok(());
        };
        for (id, node) in statements(unit) {
            if let NodeKind::Literal { value } = node.kind {
                unit.add_post_unit_check(DeferredCheck::Validate {
                    code: ASSERT.into(),
                    node: Some(id),
                    message: value,
                });
                continue;
            }
            let Some(name) = node.kind.defined_name().map(str::to_owned) else {
                continue;
            };
            let decl = self.decls.get_by_name(&name).map(|d| d.id);
            unit.add_artifact(IrClass {
                code: name.as_bytes().to_vec(),
                decl,
                name,
            });
        }
        unit.add_post_unit_check(DeferredCheck::Computed { node: root });
        Ok(())
    }
}

const ASSERT: &str = "assert";

/// Host runner that evaluates `assert` validations and defers the rest
#[derive(Default)]
pub struct HostChecks {
    pub standard: StandardChecks,
}

impl CheckRunner for HostChecks {
    fn run(
        &mut self,
        unit: &mut CompilationUnit,
        check: &DeferredCheck,
    ) -> Result<(), CheckFailure> {
        match check {
            DeferredCheck::Validate { code, message, .. } if code == ASSERT => {
                if message == "true" {
                    Ok(())
                } else {
                    Err(CheckFailure::Failed {
                        check: code.clone(),
                        message: format!("`{message}` does not hold"),
                    })
                }
            }
            _ => self.standard.run(unit, check),
        }
    }
}
