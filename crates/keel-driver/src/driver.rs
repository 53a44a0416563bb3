//! Phase driver
//!
//! Creates one unit per source and advances every live unit through the
//! registered phases, phase by phase. Deferred checks are drained at the
//! two checkpoints: post-typer right after the typer phase, post-unit once
//! every phase is done.

use crate::{DriverError, PhaseError};
use keel_ast::SourceFile;
use keel_unit::{CheckPoint, CheckRunner, CompilationUnit, Phase, Session, StandardChecks};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One stage of the pipeline
pub trait CompilerPhase {
    /// Which phase this is; the driver orders phases by it
    fn phase(&self) -> Phase;

    fn run(&mut self, unit: &mut CompilationUnit) -> Result<(), PhaseError>;
}

/// A unit that was dropped from the run
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: String,
    pub phase: Phase,
    pub error: DriverError,
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Units that made it through every phase
    pub units: Vec<CompilationUnit>,
    pub failures: Vec<UnitFailure>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn unit(&self, path: &str) -> Option<&CompilationUnit> {
        self.units.iter().find(|u| u.to_string() == path)
    }
}

pub struct Driver {
    session: Arc<Session>,
    phases: Vec<Box<dyn CompilerPhase>>,
    checks: Box<dyn CheckRunner>,
}

impl Driver {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            phases: Vec::new(),
            checks: Box::new(StandardChecks::new()),
        }
    }

    /// Replace the runner used at checkpoints
    pub fn with_check_runner(mut self, runner: impl CheckRunner + 'static) -> Self {
        self.checks = Box::new(runner);
        self
    }

    pub fn add_phase(&mut self, phase: impl CompilerPhase + 'static) -> &mut Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Read every path from disk and run the pipeline over them
    pub fn run_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<RunReport, DriverError> {
        let sources = paths
            .iter()
            .map(SourceFile::read)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.run(sources))
    }

    pub fn run(&mut self, sources: impl IntoIterator<Item = SourceFile>) -> RunReport {
        let Driver {
            session,
            phases,
            checks,
        } = self;
        phases.sort_by_key(|p| p.phase());

        let mut live: Vec<CompilationUnit> = sources
            .into_iter()
            .map(|source| CompilationUnit::new(Arc::clone(session), source))
            .collect();
        let mut failures = Vec::new();

        for phase in phases.iter_mut() {
            let id = phase.phase();
            session.enter_phase(id);
            info!(phase = %id, units = live.len(), "entering phase");

            live = live
                .into_iter()
                .filter_map(|mut unit| match advance(&mut **phase, &mut **checks, &mut unit) {
                    Ok(()) => Some(unit),
                    Err(error) => {
                        warn!(unit = %unit, phase = %id, %error, "unit dropped");
                        failures.push(UnitFailure {
                            unit: unit.to_string(),
                            phase: id,
                            error,
                        });
                        None
                    }
                })
                .collect();
        }

        session.enter_phase(Phase::Terminal);
        live.retain_mut(|unit| match finish(&mut **checks, unit) {
            Ok(()) => true,
            Err(error) => {
                warn!(unit = %unit, %error, "unit dropped");
                failures.push(UnitFailure {
                    unit: unit.to_string(),
                    phase: Phase::Terminal,
                    error,
                });
                false
            }
        });

        info!(units = live.len(), failures = failures.len(), "run finished");
        RunReport {
            units: live,
            failures,
        }
    }
}

fn advance(
    phase: &mut dyn CompilerPhase,
    checks: &mut dyn CheckRunner,
    unit: &mut CompilationUnit,
) -> Result<(), DriverError> {
    let id = phase.phase();
    phase.run(unit).map_err(|source| DriverError::Phase {
        phase: id,
        unit: unit.to_string(),
        source,
    })?;

    if id == Phase::Parser && unit.exists() && unit.body().is_none() {
        return Err(DriverError::MissingBody {
            unit: unit.to_string(),
        });
    }
    if id == Phase::Typer {
        unit.run_checks(CheckPoint::PostTyper, checks)?;
    }
    debug!(unit = %unit, phase = %id, "phase done");
    Ok(())
}

/// Drain whatever is left once every phase is done
///
/// Post-typer checks still queued here belong to a pipeline with no typer
/// phase; they run before the post-unit checks.
fn finish(checks: &mut dyn CheckRunner, unit: &mut CompilationUnit) -> Result<(), DriverError> {
    unit.run_checks(CheckPoint::PostTyper, checks)?;
    unit.run_checks(CheckPoint::PostUnit, checks)?;
    Ok(())
}
