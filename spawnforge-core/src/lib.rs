//! Spawnforge - capability-based actor assembly
//!
//! This crate instantiates templated actors and configures their behaviors
//! from interchangeable configuration objects, spread over several host
//! ticks so a single spawn never stalls the frame loop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Host                              │
//! │   (composition root: scene, the one spawner, spawn buttons)  │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  SpawnButton::click ──► Spawner::request_spawn               │
//! │                              │                               │
//! │                              ▼                               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                  AssemblyScheduler                     │  │
//! │  │   tick() steps every AssemblyTask once                 │  │
//! │  │                                                        │  │
//! │  │   instantiate ─► enumerate ─► invoke (batches of 5)    │  │
//! │  │                                  │                     │  │
//! │  │            ┌─────────────────────┴──────────┐          │  │
//! │  │            ▼                                ▼          │  │
//! │  │   ┌─────────────────┐          ┌──────────────────┐    │  │
//! │  │   │ CapabilityIndex │          │ ConfigurationSet │    │  │
//! │  │   │ (per-type cache)│          │ (first-fit match)│    │  │
//! │  │   └─────────────────┘          └──────────────────┘    │  │
//! │  └──────────────────────────┬─────────────────────────────┘  │
//! │                             ▼                                │
//! │                     DiagnosticsSink                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! ## Behaviors and capabilities
//!
//! A **behavior** is a unit of logic attached to a node of an actor. It
//! declares the configuration types it consumes once, at registration time,
//! through [`Behavior::declare`]; each declared type is backed by a
//! [`Consumes`] impl. The pair is a **capability**.
//!
//! ## Configuration objects
//!
//! A **configuration object** is an immutable, named value. A request
//! carries them in a [`ConfigurationSet`], in caller order, possibly with
//! empty slots. Each capability binds the first compatible object.
//!
//! ## Assembly
//!
//! An **assembly** instantiates a template, runs every matched setup and
//! finalizes the actor's animation driver. Failures are isolated per bind
//! and reported; an assembly always reaches its end.
//!
//! # Example
//!
//! ```rust
//! use spawnforge_core::{
//!     ActorTemplate, AssemblyRequest, AssemblyScheduler, Behavior, BehaviorSpec,
//!     Configuration, ConfigurationSet, Consumes, Declarer, DiagnosticLog, NodeTemplate,
//!     Scene, SetupError,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct MoveConfig { speed: f32 }
//!
//! impl Configuration for MoveConfig {
//!     fn name(&self) -> &str { "walk" }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Mover { speed: f32 }
//!
//! impl Behavior for Mover {
//!     fn declare(declarer: &mut Declarer<Self>) {
//!         declarer.consumes::<MoveConfig>();
//!     }
//! }
//!
//! impl Consumes<MoveConfig> for Mover {
//!     fn setup(&mut self, config: &MoveConfig) -> Result<(), SetupError> {
//!         self.speed = config.speed;
//!         Ok(())
//!     }
//! }
//!
//! let template = Arc::new(ActorTemplate::new(
//!     "Walker",
//!     NodeTemplate::new("root").with_behavior(BehaviorSpec::of::<Mover>()),
//! ));
//! let log = Arc::new(DiagnosticLog::new());
//! let mut scheduler = AssemblyScheduler::with_sink(log.clone());
//! let mut scene = Scene::new();
//!
//! let configs = ConfigurationSet::new().with(MoveConfig { speed: 5.0 });
//! scheduler.begin_assembly(AssemblyRequest::new(template, configs));
//! let reports = scheduler.run_until_idle(&mut scene, 16);
//!
//! let walker = scene.get(reports[0].instance.unwrap()).unwrap();
//! assert_eq!(walker.behavior::<Mover>().unwrap().speed, 5.0);
//! assert!(log.messages().contains(&"Mover configured with walk".to_string()));
//! ```

pub mod behavior;
pub mod capability;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod instance;
pub mod player;
pub mod scheduler;
pub mod spawner;
pub mod template;

pub use behavior::{Behavior, BehaviorType, Consumes, ErasedBehavior};
pub use capability::{
    BindFn, Capability, CapabilityDescriptor, CapabilityIndex, CapabilityIndexStats, Declarer,
};
pub use config::{
    match_capabilities, AsAny, Binding, ConfigType, Configuration, ConfigurationSet,
    MatchOutcome, UnboundMatch,
};
pub use controller::ControllerRule;
pub use diagnostics::{Diagnostic, DiagnosticLog, DiagnosticsSink, FanoutSink, TracingSink};
pub use error::{ButtonError, SceneError, SetupError, SpawnError};
pub use instance::{
    ActorInstance, AnimationDriver, BehaviorSlot, BehaviorUnit, InstanceStatus, Node, Scene,
};
pub use player::{PlayerController, PlayerControllerModel};
pub use scheduler::{
    AssemblyCursor, AssemblyOutcome, AssemblyPhase, AssemblyReport, AssemblyRequest,
    AssemblyScheduler, AssemblyTask, BindRecord, SchedulerConfig, Step, TickReport,
    DEFAULT_BATCH_SIZE,
};
pub use spawner::{Host, SpawnButton, SpawnButtonConfig, Spawner};
pub use template::{ActorTemplate, BehaviorFactory, BehaviorSpec, NodeTemplate};

pub use spawnforge_types::{AnimationController, AssemblyId, InstanceId, Placement, Severity};
