//! A single in-flight assembly

use super::report::{AssemblyOutcome, AssemblyReport, BindRecord};
use super::AssemblyRequest;
use crate::capability::CapabilityIndex;
use crate::config::match_capabilities;
use crate::controller::ControllerRule;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::error::SetupError;
use crate::instance::{ActorInstance, BehaviorSlot, Scene};
use spawnforge_types::{AssemblyId, InstanceId};

/// Phase of an assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyPhase {
    Created,
    Instantiated,
    Enumerating,
    Invoking,
    Yielded,
    Finalizing,
    Complete,
}

/// Result of stepping a task once
#[derive(Debug)]
pub enum Step {
    /// Suspended until the next tick
    Yield,
    Complete(AssemblyReport),
}

/// Shared state a task reads while stepping
pub(crate) struct StepContext<'a> {
    pub index: &'a CapabilityIndex,
    pub sink: &'a dyn DiagnosticsSink,
    pub batch_size: usize,
    pub controller: Option<&'a ControllerRule>,
}

/// Progress of one assembly, kept across suspensions
#[derive(Debug)]
pub struct AssemblyCursor {
    pub(crate) phase: AssemblyPhase,
    pub(crate) request: AssemblyRequest,
    pub(crate) instance: Option<InstanceId>,
    pub(crate) behaviors: Vec<BehaviorSlot>,
    pub(crate) next: usize,
    pub(crate) report: AssemblyReport,
}

impl AssemblyCursor {
    pub fn phase(&self) -> AssemblyPhase {
        self.phase
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    /// Behaviors processed so far
    pub fn processed(&self) -> usize {
        self.next
    }

    /// Behaviors enumerated, including a synthesized controller
    pub fn total(&self) -> usize {
        self.behaviors.len()
    }
}

/// An assembly driven one step per tick
#[derive(Debug)]
pub struct AssemblyTask {
    cursor: AssemblyCursor,
}

impl AssemblyTask {
    pub(crate) fn new(id: AssemblyId, request: AssemblyRequest) -> Self {
        let report = AssemblyReport::new(id, request.template.name());
        Self {
            cursor: AssemblyCursor {
                phase: AssemblyPhase::Created,
                request,
                instance: None,
                behaviors: Vec::new(),
                next: 0,
                report,
            },
        }
    }

    pub fn id(&self) -> AssemblyId {
        self.cursor.report.id
    }

    pub fn cursor(&self) -> &AssemblyCursor {
        &self.cursor
    }

    /// Advance until the next suspension point or completion
    pub(crate) fn step(&mut self, ctx: &StepContext<'_>, scene: &mut Scene) -> Step {
        loop {
            match self.cursor.phase {
                AssemblyPhase::Created => return self.instantiate(ctx, scene),
                AssemblyPhase::Complete => {
                    return Step::Complete(self.cursor.report.clone());
                }
                _ => {}
            }

            let Some(instance) = self.cursor.instance.and_then(|id| scene.get_mut(id)) else {
                return self.cancel(ctx);
            };

            match self.cursor.phase {
                AssemblyPhase::Instantiated => {
                    self.cursor.phase = AssemblyPhase::Enumerating;
                }
                AssemblyPhase::Enumerating => {
                    self.enumerate(ctx, instance);
                    self.cursor.phase = AssemblyPhase::Invoking;
                }
                AssemblyPhase::Invoking => {
                    let processed = self.invoke_batch(ctx, instance);
                    if processed > 0 {
                        self.cursor.phase = AssemblyPhase::Yielded;
                        self.cursor.report.suspensions += 1;
                        self.cursor.report.invoke_suspensions += 1;
                        return Step::Yield;
                    }
                    self.cursor.phase = AssemblyPhase::Finalizing;
                }
                AssemblyPhase::Yielded => {
                    self.cursor.phase = if self.cursor.next < self.cursor.behaviors.len() {
                        AssemblyPhase::Invoking
                    } else {
                        AssemblyPhase::Finalizing
                    };
                }
                AssemblyPhase::Finalizing => {
                    self.finalize(ctx, instance);
                    self.cursor.phase = AssemblyPhase::Complete;
                }
                AssemblyPhase::Created | AssemblyPhase::Complete => {}
            }
        }
    }

    fn instantiate(&mut self, ctx: &StepContext<'_>, scene: &mut Scene) -> Step {
        let request = &self.cursor.request;
        let instance = request.template.instantiate(request.placement);

        match scene.insert(instance) {
            Ok(id) => {
                tracing::info!(
                    assembly = %self.cursor.report.id,
                    instance = %id,
                    template = request.template.name(),
                    "instantiated actor"
                );
                self.cursor.instance = Some(id);
                self.cursor.report.instance = Some(id);
                self.cursor.phase = AssemblyPhase::Instantiated;
                self.cursor.report.suspensions += 1;
                Step::Yield
            }
            Err(err) => {
                ctx.sink.emit(Diagnostic::error(format!(
                    "Could not register {}: {err}",
                    request.template.name()
                )));
                self.finish(AssemblyOutcome::Cancelled)
            }
        }
    }

    fn enumerate(&mut self, ctx: &StepContext<'_>, instance: &mut ActorInstance) {
        let id = instance.id();
        self.cursor.behaviors = instance.behavior_slots();

        let null_slots = self.cursor.request.configs.null_slots();
        for slot in &null_slots {
            ctx.sink.emit(
                Diagnostic::warning(format!("Configuration slot {slot} is null. Skipping."))
                    .with_instance(id),
            );
        }
        self.cursor.report.skipped_null_slots = null_slots;

        if let Some(rule) = ctx.controller {
            let controller = rule.controller();
            let required = self.cursor.request.configs.provides(rule.marker());
            let present = instance
                .find_behavior(controller.behavior_type().id())
                .is_some();

            if required && !present {
                let slot = instance.attach(controller.create());
                self.cursor.behaviors.push(slot);
                self.cursor.report.synthesized_controller = true;
                ctx.sink.emit(
                    Diagnostic::info(format!(
                        "{} was missing and has been added.",
                        controller.behavior_type()
                    ))
                    .with_instance(id),
                );
            }
        }

        tracing::debug!(
            instance = %id,
            behaviors = self.cursor.behaviors.len(),
            null_slots = self.cursor.report.skipped_null_slots.len(),
            "enumerated behaviors"
        );
    }

    /// Process up to one batch; returns the number of behaviors processed
    fn invoke_batch(&mut self, ctx: &StepContext<'_>, instance: &mut ActorInstance) -> usize {
        let batch_size = ctx.batch_size.max(1);
        let mut processed = 0;

        while processed < batch_size && self.cursor.next < self.cursor.behaviors.len() {
            let slot = self.cursor.behaviors[self.cursor.next];
            self.invoke_behavior(ctx, instance, slot);
            self.cursor.next += 1;
            processed += 1;
        }
        processed
    }

    fn invoke_behavior(
        &mut self,
        ctx: &StepContext<'_>,
        instance: &mut ActorInstance,
        slot: BehaviorSlot,
    ) {
        let id = instance.id();
        let Some(unit) = instance.unit_mut(slot) else {
            return;
        };
        let behavior_type = unit.behavior_type();
        let descriptor = ctx.index.capabilities(unit.behavior());
        let outcome = match_capabilities(&descriptor, &self.cursor.request.configs);

        for binding in outcome.bindings {
            let config_type = binding.capability.config_type;
            let result = match binding.config.view(config_type.id()) {
                Some(view) => binding
                    .capability
                    .invoke(unit.behavior_mut().as_any_mut(), view),
                None => Err(SetupError::ConfigMismatch(config_type.name())),
            };

            match &result {
                Ok(()) => {
                    tracing::debug!(
                        behavior = behavior_type.name(),
                        config_type = config_type.name(),
                        slot = binding.slot,
                        "bound configuration"
                    );
                    ctx.sink.emit(
                        Diagnostic::info(format!(
                            "{behavior_type} configured with {}",
                            binding.config.name()
                        ))
                        .with_instance(id),
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        behavior = behavior_type.name(),
                        config_type = config_type.name(),
                        error = %err,
                        "setup failed"
                    );
                    ctx.sink.emit(
                        Diagnostic::error(format!("Error invoking setup on {behavior_type}: {err}"))
                            .with_instance(id),
                    );
                }
            }

            self.cursor.report.bindings.push(BindRecord {
                behavior: behavior_type.name(),
                config_type: config_type.name(),
                config: binding.config.name().to_string(),
                slot: binding.slot,
                result,
            });
        }

        for unbound in outcome.unbound {
            ctx.sink.emit(
                Diagnostic::warning(format!("Setup method not found on {behavior_type}"))
                    .with_instance(id),
            );
            self.cursor.report.bindings.push(BindRecord {
                behavior: behavior_type.name(),
                config_type: unbound.config_type.name(),
                config: unbound.config.name().to_string(),
                slot: unbound.slot,
                result: Err(SetupError::Unbound(unbound.config_type.name())),
            });
        }

        self.cursor.report.processed.push(behavior_type.name());
    }

    fn finalize(&mut self, ctx: &StepContext<'_>, instance: &mut ActorInstance) {
        let id = instance.id();
        let (driver, created) = instance.ensure_animation_driver();
        self.cursor.report.driver_created = created;
        if created {
            ctx.sink.emit(
                Diagnostic::info("Animation driver was missing and has been added.")
                    .with_instance(id),
            );
        }

        match &self.cursor.request.visual_override {
            Some(controller) => {
                driver.assign(controller.clone());
                self.cursor.report.visual_override = Some(controller.name.clone());
                ctx.sink
                    .emit(Diagnostic::info("AnimationController assigned.").with_instance(id));
            }
            None => {
                ctx.sink.emit(
                    Diagnostic::info("No AnimationController was provided.").with_instance(id),
                );
            }
        }

        instance.mark_ready();
        tracing::info!(
            assembly = %self.cursor.report.id,
            instance = %id,
            behaviors = self.cursor.report.processed.len(),
            binds = self.cursor.report.bindings.len(),
            "assembly complete"
        );
    }

    fn cancel(&mut self, ctx: &StepContext<'_>) -> Step {
        let target = self
            .cursor
            .instance
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.cursor.request.template.name().to_string());
        ctx.sink.emit(Diagnostic::warning(format!(
            "{target} was removed before assembly finished. Cancelling."
        )));
        self.finish(AssemblyOutcome::Cancelled)
    }

    fn finish(&mut self, outcome: AssemblyOutcome) -> Step {
        self.cursor.phase = AssemblyPhase::Complete;
        self.cursor.report.outcome = outcome;
        Step::Complete(self.cursor.report.clone())
    }
}
