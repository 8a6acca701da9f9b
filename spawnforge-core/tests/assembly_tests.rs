//! Integration tests for the assembly pipeline

use proptest::prelude::*;
use spawnforge_core::*;
use std::any::{Any, TypeId};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct MoveConfig {
    name: String,
    speed: f32,
}

impl MoveConfig {
    fn new(name: &str, speed: f32) -> Self {
        Self {
            name: name.to_string(),
            speed,
        }
    }
}

impl Configuration for MoveConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct UnrelatedConfig;

impl Configuration for UnrelatedConfig {
    fn name(&self) -> &str {
        "unrelated"
    }
}

/// Carries a MoveConfig for mounted actors
#[derive(Debug)]
struct MountConfig {
    gait: MoveConfig,
}

impl Configuration for MountConfig {
    fn name(&self) -> &str {
        "mount"
    }

    fn view(&self, target: TypeId) -> Option<&dyn Any> {
        if target == TypeId::of::<MoveConfig>() {
            return Some(&self.gait);
        }
        let any = self.as_any();
        ((*any).type_id() == target).then_some(any)
    }
}

#[derive(Debug, Default)]
struct MoverUnit {
    speed: f32,
    setups: usize,
}

impl Behavior for MoverUnit {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<MoveConfig>();
    }
}

impl Consumes<MoveConfig> for MoverUnit {
    fn setup(&mut self, config: &MoveConfig) -> Result<(), SetupError> {
        self.speed = config.speed;
        self.setups += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RendererUnit;

impl Behavior for RendererUnit {}

#[derive(Debug, Default)]
struct FaultyUnit;

impl Behavior for FaultyUnit {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<MoveConfig>();
    }
}

impl Consumes<MoveConfig> for FaultyUnit {
    fn setup(&mut self, _config: &MoveConfig) -> Result<(), SetupError> {
        Err(SetupError::failed("wheel fell off"))
    }
}

#[derive(Debug, Default)]
struct ListenerUnit;

impl Behavior for ListenerUnit {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.expects::<UnrelatedConfig>();
    }
}

fn soldier() -> Arc<ActorTemplate> {
    Arc::new(ActorTemplate::new(
        "Soldier",
        NodeTemplate::new("root")
            .with_behavior(BehaviorSpec::of::<MoverUnit>())
            .with_child(NodeTemplate::new("model").with_behavior(BehaviorSpec::of::<RendererUnit>())),
    ))
}

fn scheduler() -> (AssemblyScheduler, Arc<DiagnosticLog>) {
    let log = Arc::new(DiagnosticLog::new());
    (AssemblyScheduler::with_sink(log.clone()), log)
}

fn transcript(log: &DiagnosticLog) -> String {
    log.entries()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn assemble(
    scheduler: &mut AssemblyScheduler,
    scene: &mut Scene,
    template: Arc<ActorTemplate>,
    configs: ConfigurationSet,
) -> AssemblyReport {
    scheduler.begin_assembly(AssemblyRequest::new(template, configs));
    let mut reports = scheduler.run_until_idle(scene, 64);
    assert_eq!(reports.len(), 1);
    reports.remove(0)
}

#[test]
fn test_move_and_render_scenario() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new()
        .with(MoveConfig::new("walk", 5.0))
        .with_null()
        .with(UnrelatedConfig);

    let report = assemble(&mut scheduler, &mut scene, soldier(), configs);

    insta::assert_snapshot!(transcript(&log), @r"
    [warning] Configuration slot 1 is null. Skipping.
    [info] MoverUnit configured with walk
    [info] Animation driver was missing and has been added.
    [info] No AnimationController was provided.
    ");

    assert_eq!(report.outcome, AssemblyOutcome::Complete);
    assert_eq!(report.processed, vec!["MoverUnit", "RendererUnit"]);
    assert_eq!(report.skipped_null_slots, vec![1]);
    assert_eq!(report.bindings.len(), 1);
    assert_eq!(report.bindings[0].config, "walk");
    assert_eq!(report.bindings[0].slot, 0);
    assert!(report.driver_created);
    assert!(!report.synthesized_controller);
    assert!(!log.has_errors());

    let soldier = scene.get(report.instance.unwrap()).unwrap();
    assert!(soldier.is_ready());
    assert_eq!(soldier.behavior::<MoverUnit>().unwrap().speed, 5.0);
    assert!(soldier.animation_driver().is_some());
}

#[test]
fn test_controller_synthesized_once_per_instance() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new()
        .with(MoveConfig::new("walk", 2.0))
        .with(PlayerControllerModel::default());

    let first = assemble(&mut scheduler, &mut scene, soldier(), configs.clone());
    let second = assemble(&mut scheduler, &mut scene, soldier(), configs);

    for report in [&first, &second] {
        assert!(report.synthesized_controller);
        assert_eq!(
            report
                .processed
                .iter()
                .filter(|name| **name == "PlayerController")
                .count(),
            1
        );
        assert_eq!(report.processed.last(), Some(&"PlayerController"));

        let instance = scene.get(report.instance.unwrap()).unwrap();
        assert_eq!(instance.count_of::<PlayerController>(), 1);
        assert!(instance.behavior::<PlayerController>().unwrap().is_configured());
    }

    assert_ne!(first.instance, second.instance);
    assert_eq!(
        log.count_containing("PlayerController was missing and has been added."),
        2
    );
}

#[test]
fn test_existing_controller_is_not_duplicated() {
    let (mut scheduler, _log) = scheduler();
    let mut scene = Scene::new();
    let template = Arc::new(ActorTemplate::new(
        "Hero",
        NodeTemplate::new("root")
            .with_child(NodeTemplate::new("brain").with_behavior(BehaviorSpec::of::<PlayerController>())),
    ));
    let configs = ConfigurationSet::new().with(PlayerControllerModel::default());

    let report = assemble(&mut scheduler, &mut scene, template, configs);

    assert!(!report.synthesized_controller);
    let hero = scene.get(report.instance.unwrap()).unwrap();
    assert_eq!(hero.count_of::<PlayerController>(), 1);
}

#[test]
fn test_capabilities_declared_once_per_type() {
    let (mut scheduler, _log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new().with(MoveConfig::new("walk", 1.0));

    for _ in 0..3 {
        assemble(&mut scheduler, &mut scene, soldier(), configs.clone());
    }

    let stats = scheduler.index().stats();
    assert_eq!(stats.indexed_types, 2);
    assert_eq!(stats.introspections, 2);
    assert_eq!(stats.hits, 4);

    let descriptor = scheduler.index().capabilities_of::<MoverUnit>();
    assert!(Arc::ptr_eq(
        &descriptor,
        &scheduler.index().capabilities(&MoverUnit::default())
    ));
}

#[test]
fn test_null_entries_are_never_bound() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new()
        .with_null()
        .with_null()
        .with(MoveConfig::new("late", 3.0));

    let report = assemble(&mut scheduler, &mut scene, soldier(), configs);

    assert_eq!(report.skipped_null_slots, vec![0, 1]);
    assert_eq!(log.count_containing("is null. Skipping."), 2);
    assert!(report.bindings.iter().all(|b| b.slot == 2));
}

#[test]
fn test_first_fit_binds_earliest_object() {
    let (mut scheduler, _log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new()
        .with(MoveConfig::new("a", 1.0))
        .with(MoveConfig::new("b", 9.0));

    let report = assemble(&mut scheduler, &mut scene, soldier(), configs);

    let mover_binds: Vec<_> = report.bindings_for("MoverUnit").collect();
    assert_eq!(mover_binds.len(), 1);
    assert_eq!(mover_binds[0].config, "a");

    let mover = scene.get(report.instance.unwrap()).unwrap();
    assert_eq!(mover.behavior::<MoverUnit>().map(|m| (m.speed, m.setups)), Some((1.0, 1)));
}

#[test]
fn test_subtype_configuration_binds() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new().with(MountConfig {
        gait: MoveConfig::new("gallop", 12.0),
    });

    let report = assemble(&mut scheduler, &mut scene, soldier(), configs);

    assert_eq!(report.bindings[0].config, "mount");
    assert_eq!(log.count_containing("MoverUnit configured with mount"), 1);
    let rider = scene.get(report.instance.unwrap()).unwrap();
    assert_eq!(rider.behavior::<MoverUnit>().unwrap().speed, 12.0);
}

#[test]
fn test_identical_requests_give_identical_outcomes() {
    let (mut scheduler, _log) = scheduler();
    let mut scene = Scene::new();
    let configs = ConfigurationSet::new()
        .with(MoveConfig::new("walk", 4.0))
        .with_null()
        .with(PlayerControllerModel::default());

    let a = assemble(&mut scheduler, &mut scene, soldier(), configs.clone());
    let b = assemble(&mut scheduler, &mut scene, soldier(), configs);

    assert_ne!(a.instance, b.instance);
    assert_eq!(a.bind_outcomes(), b.bind_outcomes());
    assert_eq!(a.processed, b.processed);
    assert_eq!(scene.ready().count(), 2);
}

#[test]
fn test_bind_failure_is_isolated() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let template = Arc::new(ActorTemplate::new(
        "Cart",
        NodeTemplate::new("root")
            .with_behavior(BehaviorSpec::of::<FaultyUnit>())
            .with_behavior(BehaviorSpec::of::<MoverUnit>()),
    ));
    let configs = ConfigurationSet::new().with(MoveConfig::new("roll", 6.0));

    let report = assemble(&mut scheduler, &mut scene, template, configs);

    assert!(report.is_complete());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(
        report.bind_outcomes(),
        vec![("FaultyUnit", "MoveConfig", false), ("MoverUnit", "MoveConfig", true)]
    );
    assert_eq!(
        log.count_containing("Error invoking setup on FaultyUnit: wheel fell off"),
        1
    );

    let cart = scene.get(report.instance.unwrap()).unwrap();
    assert_eq!(cart.behavior::<MoverUnit>().unwrap().speed, 6.0);
}

#[test]
fn test_missing_setup_reported_only_on_match() {
    let (mut scheduler, log) = scheduler();
    let mut scene = Scene::new();
    let template = Arc::new(ActorTemplate::new(
        "Radio",
        NodeTemplate::new("root").with_behavior(BehaviorSpec::of::<ListenerUnit>()),
    ));

    assemble(&mut scheduler, &mut scene, template.clone(), ConfigurationSet::new());
    assert_eq!(log.count_containing("Setup method not found"), 0);

    let report = assemble(
        &mut scheduler,
        &mut scene,
        template,
        ConfigurationSet::new().with(UnrelatedConfig),
    );
    assert_eq!(log.count_containing("Setup method not found on ListenerUnit"), 1);
    assert_eq!(
        report.bindings[0].result,
        Err(SetupError::Unbound("UnrelatedConfig"))
    );
}

#[test]
fn test_inactive_behaviors_are_configured() {
    let (mut scheduler, _log) = scheduler();
    let mut scene = Scene::new();
    let template = Arc::new(ActorTemplate::new(
        "Sleeper",
        NodeTemplate::new("root").with_behavior(BehaviorSpec::of::<MoverUnit>().inactive()),
    ));
    let configs = ConfigurationSet::new().with(MoveConfig::new("walk", 2.5));

    let report = assemble(&mut scheduler, &mut scene, template, configs);

    assert_eq!(report.processed, vec!["MoverUnit"]);
    let sleeper = scene.get(report.instance.unwrap()).unwrap();
    assert_eq!(sleeper.behavior::<MoverUnit>().unwrap().speed, 2.5);
}

#[test]
fn test_spawn_button_end_to_end() {
    let log = Arc::new(DiagnosticLog::new());
    let mut host = Host::new(log.clone());
    host.add_button(SpawnButton::new("slot-0"));

    let button = SpawnButtonConfig::new(
        "Soldier",
        ConfigurationSet::new().with(MoveConfig::new("march", 3.0)),
    )
    .with_animator_controller(AnimationController::new("Infantry").with_clip("Salute"));
    let spawner = Spawner::new(AssemblyScheduler::with_sink(log.clone()))
        .with_template(soldier())
        .with_controller_model(PlayerControllerModel::default())
        .with_placement(Placement::at(0.0, 1.0, 0.0))
        .with_button_config(button);
    host.install_spawner(spawner).unwrap();
    assert_eq!(host.buttons()[0].label(), "Soldier");

    host.click_button(0).unwrap();
    let reports = host.run_until_idle(64);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].visual_override.as_deref(), Some("Infantry"));
    assert!(reports[0].synthesized_controller);

    let soldier = host.scene().get(reports[0].instance.unwrap()).unwrap();
    assert_eq!(soldier.placement(), Placement::at(0.0, 1.0, 0.0));
    assert_eq!(
        soldier
            .animation_driver()
            .and_then(|d| d.controller())
            .map(|c| c.name.as_str()),
        Some("Infantry")
    );

    let messages = log.messages();
    assert_eq!(messages[0], "PlayerControllerModel added to setup.");
    assert_eq!(messages.last().map(String::as_str), Some("AnimationController assigned."));
}

fn column(len: usize, with_capabilities: &[bool]) -> Arc<ActorTemplate> {
    let root = (0..len).fold(NodeTemplate::new("root"), |node, i| {
        if with_capabilities.get(i).copied().unwrap_or(false) {
            node.with_behavior(BehaviorSpec::of::<MoverUnit>())
        } else {
            node.with_behavior(BehaviorSpec::of::<RendererUnit>())
        }
    });
    Arc::new(ActorTemplate::new("Column", root))
}

proptest! {
    #[test]
    fn prop_invoke_suspensions_are_ceil_of_batches(
        len in 0usize..40,
        with_capabilities in proptest::collection::vec(any::<bool>(), 40),
    ) {
        let (mut scheduler, _log) = scheduler();
        let mut scene = Scene::new();
        let configs = ConfigurationSet::new().with(MoveConfig::new("walk", 1.0));

        let report = assemble(&mut scheduler, &mut scene, column(len, &with_capabilities), configs);

        let expected = len.div_ceil(DEFAULT_BATCH_SIZE);
        prop_assert_eq!(report.invoke_suspensions, expected);
        prop_assert_eq!(report.suspensions, expected + 1);
        prop_assert_eq!(report.processed.len(), len);
    }
}
