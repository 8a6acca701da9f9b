//! Time-sliced assembly scheduling
//!
//! Each request becomes an [`AssemblyTask`] that the host advances by
//! calling [`AssemblyScheduler::tick`] once per frame. A task moves through
//!
//! ```text
//! Created → Instantiated → Enumerating → (Invoking ⇄ Yielded) → Finalizing → Complete
//! ```
//!
//! and suspends in exactly two places: once right after instantiation, and
//! after every batch of `batch_size` behaviors (the last, possibly partial,
//! batch included). Finalization never suspends. Tasks in flight at the
//! same time are stepped in submission order and never share an instance.

mod report;
mod task;

pub use report::{AssemblyOutcome, AssemblyReport, BindRecord, TickReport};
pub use task::{AssemblyCursor, AssemblyPhase, AssemblyTask, Step};

use crate::capability::CapabilityIndex;
use crate::config::ConfigurationSet;
use crate::controller::ControllerRule;
use crate::diagnostics::DiagnosticsSink;
use crate::instance::Scene;
use crate::template::ActorTemplate;
use spawnforge_types::{AnimationController, AssemblyId, Placement};
use std::fmt;
use std::sync::Arc;
use task::StepContext;

/// Behaviors processed between two suspensions
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    /// Controller to synthesize when a request asks for one
    pub controller: Option<ControllerRule>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            controller: Some(ControllerRule::player()),
        }
    }
}

/// One request to assemble an actor
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub template: Arc<ActorTemplate>,
    pub configs: ConfigurationSet,
    pub visual_override: Option<AnimationController>,
    pub placement: Placement,
}

impl AssemblyRequest {
    pub fn new(template: Arc<ActorTemplate>, configs: ConfigurationSet) -> Self {
        Self {
            template,
            configs,
            visual_override: None,
            placement: Placement::ORIGIN,
        }
    }

    pub fn with_visual_override(mut self, controller: AnimationController) -> Self {
        self.visual_override = Some(controller);
        self
    }

    pub fn at(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// Drives in-flight assemblies, one step per task per tick
pub struct AssemblyScheduler {
    index: Arc<CapabilityIndex>,
    sink: Arc<dyn DiagnosticsSink>,
    config: SchedulerConfig,
    tasks: Vec<AssemblyTask>,
    ticks: u64,
}

impl AssemblyScheduler {
    pub fn new(
        index: Arc<CapabilityIndex>,
        sink: Arc<dyn DiagnosticsSink>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            index,
            sink,
            config,
            tasks: Vec::new(),
            ticks: 0,
        }
    }

    /// Scheduler with a private index and default settings
    pub fn with_sink(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self::new(
            Arc::new(CapabilityIndex::new()),
            sink,
            SchedulerConfig::default(),
        )
    }

    pub fn index(&self) -> &Arc<CapabilityIndex> {
        &self.index
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.sink
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Queue a new assembly; nothing runs until the next tick
    pub fn begin_assembly(&mut self, request: AssemblyRequest) -> AssemblyId {
        let id = AssemblyId::new();
        tracing::info!(
            assembly = %id,
            template = request.template.name(),
            configs = request.configs.len(),
            "assembly requested"
        );
        self.tasks.push(AssemblyTask::new(id, request));
        id
    }

    /// Step every in-flight task once
    pub fn tick(&mut self, scene: &mut Scene) -> TickReport {
        self.ticks += 1;
        let ctx = StepContext {
            index: &self.index,
            sink: self.sink.as_ref(),
            batch_size: self.config.batch_size,
            controller: self.config.controller.as_ref(),
        };

        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        let mut remaining = Vec::with_capacity(self.tasks.len());

        for mut task in std::mem::take(&mut self.tasks) {
            report.stepped += 1;
            match task.step(&ctx, scene) {
                Step::Yield => {
                    report.yielded += 1;
                    remaining.push(task);
                }
                Step::Complete(done) => report.completed.push(done),
            }
        }

        self.tasks = remaining;
        report
    }

    /// Tick until no task is in flight or `max_ticks` is reached
    pub fn run_until_idle(&mut self, scene: &mut Scene, max_ticks: usize) -> Vec<AssemblyReport> {
        let mut completed = Vec::new();
        for _ in 0..max_ticks {
            if self.is_idle() {
                break;
            }
            completed.extend(self.tick(scene).completed);
        }
        completed
    }

    pub fn tasks(&self) -> &[AssemblyTask] {
        &self.tasks
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl fmt::Debug for AssemblyScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyScheduler")
            .field("config", &self.config)
            .field("in_flight", &self.tasks.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, Consumes};
    use crate::capability::Declarer;
    use crate::config::Configuration;
    use crate::diagnostics::DiagnosticLog;
    use crate::error::SetupError;
    use crate::template::{BehaviorSpec, NodeTemplate};

    #[derive(Debug)]
    struct Fuel {
        litres: u32,
    }

    impl Configuration for Fuel {
        fn name(&self) -> &str {
            "fuel"
        }
    }

    #[derive(Debug, Default)]
    struct Tank {
        litres: u32,
    }

    impl Behavior for Tank {
        fn declare(declarer: &mut Declarer<Self>) {
            declarer.consumes::<Fuel>();
        }
    }

    impl Consumes<Fuel> for Tank {
        fn setup(&mut self, config: &Fuel) -> Result<(), SetupError> {
            self.litres = config.litres;
            Ok(())
        }
    }

    fn tanks(count: usize) -> Arc<ActorTemplate> {
        let root = (0..count).fold(NodeTemplate::new("root"), |node, _| {
            node.with_behavior(BehaviorSpec::of::<Tank>())
        });
        Arc::new(ActorTemplate::new("Tanker", root))
    }

    fn scheduler(batch_size: usize) -> (AssemblyScheduler, Arc<DiagnosticLog>) {
        let log = Arc::new(DiagnosticLog::new());
        let scheduler = AssemblyScheduler::new(
            Arc::new(CapabilityIndex::new()),
            log.clone(),
            SchedulerConfig {
                batch_size,
                controller: None,
            },
        );
        (scheduler, log)
    }

    #[test]
    fn test_nothing_runs_before_tick() {
        let (mut scheduler, log) = scheduler(5);
        let mut scene = Scene::new();
        scheduler.begin_assembly(AssemblyRequest::new(tanks(1), ConfigurationSet::new()));

        assert_eq!(scheduler.in_flight(), 1);
        assert!(scene.is_empty());
        assert!(log.is_empty());

        let report = scheduler.tick(&mut scene);
        assert_eq!(report.yielded, 1);
        assert_eq!(scene.len(), 1);
        assert!(scene.ready().next().is_none());
    }

    #[test]
    fn test_phases_tick_by_tick() {
        let (mut scheduler, _log) = scheduler(2);
        let mut scene = Scene::new();
        let configs = ConfigurationSet::new().with(Fuel { litres: 40 });
        scheduler.begin_assembly(AssemblyRequest::new(tanks(3), configs));

        // instantiate
        assert!(scheduler.tick(&mut scene).completed.is_empty());
        assert_eq!(scheduler.tasks()[0].cursor().phase(), AssemblyPhase::Instantiated);

        // first batch of two
        scheduler.tick(&mut scene);
        assert_eq!(scheduler.tasks()[0].cursor().processed(), 2);
        assert_eq!(scheduler.tasks()[0].cursor().phase(), AssemblyPhase::Yielded);

        // partial batch of one
        scheduler.tick(&mut scene);
        assert_eq!(scheduler.tasks()[0].cursor().processed(), 3);

        // finalize
        let done = scheduler.tick(&mut scene).completed;
        assert_eq!(done.len(), 1);
        assert!(scheduler.is_idle());

        let report = &done[0];
        assert!(report.is_complete());
        assert_eq!(report.invoke_suspensions, 2);
        assert_eq!(report.suspensions, 3);
        assert_eq!(report.bindings.len(), 3);

        let instance = scene.get(report.instance.unwrap()).unwrap();
        assert!(instance.is_ready());
        assert_eq!(instance.behavior::<Tank>().map(|t| t.litres), Some(40));
    }

    #[test]
    fn test_empty_template_finalizes_after_instantiation_yield() {
        let (mut scheduler, _log) = scheduler(5);
        let mut scene = Scene::new();
        scheduler.begin_assembly(AssemblyRequest::new(tanks(0), ConfigurationSet::new()));

        let reports = scheduler.run_until_idle(&mut scene, 10);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].suspensions, 1);
        assert_eq!(reports[0].invoke_suspensions, 0);
        assert_eq!(scheduler.ticks(), 2);
    }

    #[test]
    fn test_interleaved_tasks_complete_independently() {
        let (mut scheduler, _log) = scheduler(5);
        let mut scene = Scene::new();
        scheduler.begin_assembly(AssemblyRequest::new(tanks(12), ConfigurationSet::new()));
        scheduler.tick(&mut scene);
        scheduler.begin_assembly(AssemblyRequest::new(tanks(1), ConfigurationSet::new()));

        let mut order = Vec::new();
        while !scheduler.is_idle() {
            for report in scheduler.tick(&mut scene).completed {
                order.push(report.processed.len());
            }
        }

        assert_eq!(order, vec![1, 12]);
        assert_eq!(scene.ready().count(), 2);
    }

    #[test]
    fn test_removed_instance_cancels() {
        let (mut scheduler, log) = scheduler(1);
        let mut scene = Scene::new();
        scheduler.begin_assembly(AssemblyRequest::new(tanks(4), ConfigurationSet::new()));
        scheduler.tick(&mut scene);
        scheduler.tick(&mut scene);

        let id = scene.iter().next().map(|i| i.id()).unwrap();
        scene.remove(id).unwrap();

        let done = scheduler.tick(&mut scene).completed;
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].outcome, AssemblyOutcome::Cancelled);
        assert_eq!(done[0].processed.len(), 1);
        assert_eq!(log.count_containing("Cancelling"), 1);
    }
}
