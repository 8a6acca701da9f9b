//! Spawn request sources and the host composition root
//!
//! A [`Spawner`] turns requests into assemblies on its scheduler. Spawn
//! buttons are the UI-facing trigger: each one holds a
//! [`SpawnButtonConfig`] and forwards its click to the spawner. The
//! [`Host`] owns the scene, the single spawner and the buttons, and is what
//! the frame loop ticks.

use crate::config::ConfigurationSet;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::error::{ButtonError, SpawnError};
use crate::instance::Scene;
use crate::player::PlayerControllerModel;
use crate::scheduler::{AssemblyReport, AssemblyRequest, AssemblyScheduler, TickReport};
use crate::template::ActorTemplate;
use spawnforge_types::{AnimationController, Placement};
use std::fmt;
use std::sync::Arc;

/// What a spawn button requests when clicked
#[derive(Debug, Clone, Default)]
pub struct SpawnButtonConfig {
    pub button_text: String,
    pub setup_models: ConfigurationSet,
    pub animator_controller: Option<AnimationController>,
}

impl SpawnButtonConfig {
    pub fn new(button_text: impl Into<String>, setup_models: ConfigurationSet) -> Self {
        Self {
            button_text: button_text.into(),
            setup_models,
            animator_controller: None,
        }
    }

    pub fn with_animator_controller(mut self, controller: AnimationController) -> Self {
        self.animator_controller = Some(controller);
        self
    }
}

/// Issues assembly requests for one actor template
pub struct Spawner {
    template: Option<Arc<ActorTemplate>>,
    controller_model: Option<PlayerControllerModel>,
    button_configs: Vec<SpawnButtonConfig>,
    placement: Placement,
    scheduler: AssemblyScheduler,
}

impl Spawner {
    pub fn new(scheduler: AssemblyScheduler) -> Self {
        Self {
            template: None,
            controller_model: None,
            button_configs: Vec::new(),
            placement: Placement::ORIGIN,
            scheduler,
        }
    }

    pub fn with_template(mut self, template: Arc<ActorTemplate>) -> Self {
        self.template = Some(template);
        self
    }

    /// Model appended to every request's configurations
    pub fn with_controller_model(mut self, model: PlayerControllerModel) -> Self {
        self.controller_model = Some(model);
        self
    }

    pub fn with_button_config(mut self, config: SpawnButtonConfig) -> Self {
        self.button_configs.push(config);
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn template(&self) -> Option<&Arc<ActorTemplate>> {
        self.template.as_ref()
    }

    pub fn button_configs(&self) -> &[SpawnButtonConfig] {
        &self.button_configs
    }

    pub fn scheduler(&self) -> &AssemblyScheduler {
        &self.scheduler
    }

    fn emit(&self, diagnostic: Diagnostic) {
        self.scheduler.sink().emit(diagnostic);
    }

    /// Request a new actor assembled with `configs`
    ///
    /// Refused without instantiating anything when no template is assigned.
    /// Otherwise the assembly is queued and runs over the following ticks;
    /// its progress is reported on the diagnostics sink.
    pub fn request_spawn(
        &mut self,
        mut configs: ConfigurationSet,
        visual_override: Option<AnimationController>,
    ) -> Result<(), SpawnError> {
        let Some(template) = self.template.clone() else {
            self.emit(Diagnostic::error(
                "No actor template is assigned. Spawn refused.",
            ));
            return Err(SpawnError::MissingTemplate);
        };

        match &self.controller_model {
            Some(model) => {
                configs.push(Arc::new(model.clone()));
                self.emit(Diagnostic::info("PlayerControllerModel added to setup."));
            }
            None => {
                self.emit(Diagnostic::warning(
                    "Warning: PlayerControllerModel is not assigned.",
                ));
            }
        }

        let mut request = AssemblyRequest::new(template, configs).at(self.placement);
        request.visual_override = visual_override;
        self.scheduler.begin_assembly(request);
        Ok(())
    }

    /// Assign this spawner's button configs to `buttons`, in order
    ///
    /// Stops at the shorter of the two lists; returns how many were assigned.
    pub fn bind_buttons(&self, buttons: &mut [SpawnButton]) -> usize {
        let mut bound = 0;
        for (button, config) in buttons.iter_mut().zip(&self.button_configs) {
            button.assign(config.clone());
            bound += 1;
        }
        bound
    }

    pub fn tick(&mut self, scene: &mut Scene) -> TickReport {
        self.scheduler.tick(scene)
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("template", &self.template.as_ref().map(|t| t.name()))
            .field("controller_model", &self.controller_model)
            .field("buttons", &self.button_configs.len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// UI trigger for one kind of spawn
#[derive(Debug, Clone, Default)]
pub struct SpawnButton {
    label: String,
    config: Option<SpawnButtonConfig>,
}

impl SpawnButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            config: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> Option<&SpawnButtonConfig> {
        self.config.as_ref()
    }

    /// Assign a config; the button takes its label from it
    pub fn assign(&mut self, config: SpawnButtonConfig) {
        self.label = config.button_text.clone();
        self.config = Some(config);
    }

    pub fn click(&self, spawner: Option<&mut Spawner>) -> Result<(), ButtonError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ButtonError::MissingConfig(self.label.clone()))?;
        let spawner = spawner.ok_or_else(|| ButtonError::MissingSpawner(self.label.clone()))?;

        spawner.request_spawn(
            config.setup_models.clone(),
            config.animator_controller.clone(),
        )?;
        Ok(())
    }
}

/// Composition root owning the scene, the spawner and its buttons
pub struct Host {
    scene: Scene,
    spawner: Option<Spawner>,
    buttons: Vec<SpawnButton>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Host {
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            scene: Scene::new(),
            spawner: None,
            buttons: Vec::new(),
            sink,
        }
    }

    pub fn add_button(&mut self, button: SpawnButton) -> usize {
        self.buttons.push(button);
        self.buttons.len() - 1
    }

    /// Install the spawner and bind its configs to the buttons
    ///
    /// Only one spawner may be installed; a second one is refused.
    pub fn install_spawner(&mut self, spawner: Spawner) -> Result<(), SpawnError> {
        if self.spawner.is_some() {
            self.sink.emit(Diagnostic::error(
                "Only one spawner may be active. The new spawner was refused.",
            ));
            return Err(SpawnError::DuplicateSpawner);
        }

        let bound = spawner.bind_buttons(&mut self.buttons);
        tracing::info!(
            template = spawner.template().map(|t| t.name()),
            buttons = bound,
            "spawner installed"
        );
        self.spawner = Some(spawner);
        Ok(())
    }

    pub fn click_button(&mut self, index: usize) -> Result<(), ButtonError> {
        let button = self
            .buttons
            .get(index)
            .ok_or(ButtonError::NoSuchButton(index))?;

        let result = button.click(self.spawner.as_mut());
        if let Err(
            err @ (ButtonError::MissingConfig(_) | ButtonError::MissingSpawner(_)),
        ) = &result
        {
            tracing::warn!(button = index, error = %err, "spawn button misconfigured");
            self.sink
                .emit(Diagnostic::error("SpawnButton config or spawner is missing."));
        }
        result
    }

    /// Advance all in-flight assemblies by one tick
    pub fn tick(&mut self) -> TickReport {
        match self.spawner.as_mut() {
            Some(spawner) => spawner.tick(&mut self.scene),
            None => TickReport::default(),
        }
    }

    /// Tick until idle or `max_ticks` is reached
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Vec<AssemblyReport> {
        match self.spawner.as_mut() {
            Some(spawner) => spawner.scheduler.run_until_idle(&mut self.scene, max_ticks),
            None => Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.spawner.as_ref().map_or(true, Spawner::is_idle)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn spawner(&self) -> Option<&Spawner> {
        self.spawner.as_ref()
    }

    pub fn spawner_mut(&mut self) -> Option<&mut Spawner> {
        self.spawner.as_mut()
    }

    pub fn buttons(&self) -> &[SpawnButton] {
        &self.buttons
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.sink
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("instances", &self.scene.len())
            .field("spawner", &self.spawner)
            .field("buttons", &self.buttons)
            .finish()
    }
}
