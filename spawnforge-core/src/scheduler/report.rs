//! Assembly reports

use crate::error::SetupError;
use serde::Serialize;
use spawnforge_types::{AssemblyId, InstanceId};

/// How an assembly ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyOutcome {
    Complete,
    /// The instance left the scene before assembly finished
    Cancelled,
}

/// One bind invocation (or missing bind operation) and its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindRecord {
    pub behavior: &'static str,
    pub config_type: &'static str,
    /// Name of the configuration object
    pub config: String,
    /// Slot of the configuration object in the request
    pub slot: usize,
    pub result: Result<(), SetupError>,
}

impl BindRecord {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of one assembly, handed back when it completes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub id: AssemblyId,
    pub template: String,
    pub instance: Option<InstanceId>,
    pub outcome: AssemblyOutcome,
    /// Behavior types processed, in order
    pub processed: Vec<&'static str>,
    pub bindings: Vec<BindRecord>,
    pub skipped_null_slots: Vec<usize>,
    pub synthesized_controller: bool,
    /// Every suspension, including the one after instantiation
    pub suspensions: usize,
    /// Suspensions between behavior batches
    pub invoke_suspensions: usize,
    pub driver_created: bool,
    /// Name of the animation controller assigned during finalization
    pub visual_override: Option<String>,
}

impl AssemblyReport {
    pub(crate) fn new(id: AssemblyId, template: impl Into<String>) -> Self {
        Self {
            id,
            template: template.into(),
            instance: None,
            outcome: AssemblyOutcome::Complete,
            processed: Vec::new(),
            bindings: Vec::new(),
            skipped_null_slots: Vec::new(),
            synthesized_controller: false,
            suspensions: 0,
            invoke_suspensions: 0,
            driver_created: false,
            visual_override: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == AssemblyOutcome::Complete
    }

    /// Bind records for one behavior type
    pub fn bindings_for<'a>(&'a self, behavior: &'a str) -> impl Iterator<Item = &'a BindRecord> {
        self.bindings.iter().filter(move |b| b.behavior == behavior)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BindRecord> {
        self.bindings.iter().filter(|b| !b.is_ok())
    }

    /// `(behavior, config type, succeeded)` for every bind, in order
    pub fn bind_outcomes(&self) -> Vec<(&'static str, &'static str, bool)> {
        self.bindings
            .iter()
            .map(|b| (b.behavior, b.config_type, b.is_ok()))
            .collect()
    }
}

/// What one scheduler tick did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// Tasks stepped this tick
    pub stepped: usize,
    /// Tasks that yielded and remain in flight
    pub yielded: usize,
    pub completed: Vec<AssemblyReport>,
}
