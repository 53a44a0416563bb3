//! Compiler-wide configuration and phase state
//!
//! A [`Session`] is owned by the driver and shared with every unit as
//! `Arc<Session>`. Units read it; they never write it.

use crate::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, LazyLock};

/// User-facing compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Record inter-unit dependency edges for incremental builds
    pub track_dependencies: bool,
    /// Warn when unit-scoped fresh names are minted during type checking
    pub fresh_name_guard: bool,
    /// Maximum number of stack frames dumped with a misuse warning
    pub stack_dump_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track_dependencies: false,
            fresh_name_guard: true,
            stack_dump_depth: 8,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, UnitError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Pipeline phases in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Init,
    Parser,
    Namer,
    Typer,
    Backend,
    Terminal,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Init,
        Phase::Parser,
        Phase::Namer,
        Phase::Typer,
        Phase::Backend,
        Phase::Terminal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Parser => "parser",
            Phase::Namer => "namer",
            Phase::Typer => "typer",
            Phase::Backend => "backend",
            Phase::Terminal => "terminal",
        }
    }

    fn from_index(index: u8) -> Phase {
        Phase::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(Phase::Terminal)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, read-mostly state of one compiler run
#[derive(Debug)]
pub struct Session {
    track_dependencies: AtomicBool,
    fresh_name_guard: bool,
    stack_dump_depth: usize,
    phase: AtomicU8,
}

static GLOBAL: LazyLock<Arc<Session>> = LazyLock::new(|| Arc::new(Session::default()));

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            track_dependencies: AtomicBool::new(settings.track_dependencies),
            fresh_name_guard: settings.fresh_name_guard,
            stack_dump_depth: settings.stack_dump_depth,
            phase: AtomicU8::new(Phase::Init as u8),
        }
    }

    pub fn shared(settings: Settings) -> Arc<Self> {
        Arc::new(Self::new(settings))
    }

    /// Default session for code that has no run of its own (e.g. the absent unit)
    pub fn global() -> Arc<Session> {
        Arc::clone(&GLOBAL)
    }

    pub fn tracks_dependencies(&self) -> bool {
        self.track_dependencies.load(Ordering::Relaxed)
    }

    pub fn set_track_dependencies(&self, enabled: bool) {
        self.track_dependencies.store(enabled, Ordering::Relaxed);
    }

    pub fn fresh_name_guard(&self) -> bool {
        self.fresh_name_guard
    }

    pub fn stack_dump_depth(&self) -> usize {
        self.stack_dump_depth
    }

    pub fn phase(&self) -> Phase {
        Phase::from_index(self.phase.load(Ordering::Relaxed))
    }

    /// Make `phase` the active phase, returning the previous one
    pub fn enter_phase(&self, phase: Phase) -> Phase {
        Phase::from_index(self.phase.swap(phase as u8, Ordering::Relaxed))
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> Settings {
        Settings {
            track_dependencies: self.tracks_dependencies(),
            fresh_name_guard: self.fresh_name_guard,
            stack_dump_depth: self.stack_dump_depth,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
