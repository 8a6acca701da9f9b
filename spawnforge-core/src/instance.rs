//! Actor instances and the scene registry

use crate::behavior::{Behavior, BehaviorType, ErasedBehavior};
use crate::error::SceneError;
use spawnforge_types::{AnimationController, InstanceId, Placement};
use std::any::TypeId;
use std::collections::BTreeMap;

/// One behavior attached to a node
#[derive(Debug)]
pub struct BehaviorUnit {
    behavior: Box<dyn ErasedBehavior>,
    active: bool,
}

impl BehaviorUnit {
    pub fn new(behavior: Box<dyn ErasedBehavior>, active: bool) -> Self {
        Self { behavior, active }
    }

    pub fn behavior_type(&self) -> BehaviorType {
        self.behavior.behavior_type()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn behavior(&self) -> &dyn ErasedBehavior {
        self.behavior.as_ref()
    }

    pub fn behavior_mut(&mut self) -> &mut dyn ErasedBehavior {
        self.behavior.as_mut()
    }

    pub fn downcast_ref<B: Behavior>(&self) -> Option<&B> {
        self.behavior.as_any().downcast_ref::<B>()
    }

    pub fn downcast_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        self.behavior.as_any_mut().downcast_mut::<B>()
    }
}

/// Animation driver slot
///
/// Records the assigned controller and the last clip requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationDriver {
    controller: Option<AnimationController>,
    playing: Option<String>,
}

impl AnimationDriver {
    pub fn controller(&self) -> Option<&AnimationController> {
        self.controller.as_ref()
    }

    pub fn assign(&mut self, controller: AnimationController) {
        self.controller = Some(controller);
    }

    /// Request `clip` to play
    pub fn play(&mut self, clip: impl Into<String>) {
        self.playing = Some(clip.into());
    }

    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }
}

/// A node of an instantiated actor
#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub behaviors: Vec<BehaviorUnit>,
    pub animation: Option<AnimationDriver>,
}

/// Address of one behavior unit within an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviorSlot {
    pub node: usize,
    pub index: usize,
}

/// Lifecycle status of an instance in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum InstanceStatus {
    /// Registered, assembly still running
    Assembling,
    /// Assembly finished; owned by the host
    Ready,
}

/// A freshly created actor
#[derive(Debug)]
pub struct ActorInstance {
    id: InstanceId,
    template: String,
    placement: Placement,
    nodes: Vec<Node>,
    status: InstanceStatus,
}

impl ActorInstance {
    pub(crate) fn new(template: String, placement: Placement, nodes: Vec<Node>) -> Self {
        Self {
            id: InstanceId::new(),
            template,
            placement,
            nodes,
            status: InstanceStatus::Assembling,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn status(&self) -> InstanceStatus {
        self.status
    }

    pub(crate) fn mark_ready(&mut self) {
        self.status = InstanceStatus::Ready;
    }

    pub fn is_ready(&self) -> bool {
        self.status == InstanceStatus::Ready
    }

    /// Nodes in depth-first order; index 0 is the root
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every behavior unit, inactive ones included, in depth-first order
    pub fn behavior_slots(&self) -> Vec<BehaviorSlot> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(node, n)| {
                (0..n.behaviors.len()).map(move |index| BehaviorSlot { node, index })
            })
            .collect()
    }

    pub fn unit(&self, slot: BehaviorSlot) -> Option<&BehaviorUnit> {
        self.nodes.get(slot.node)?.behaviors.get(slot.index)
    }

    pub fn unit_mut(&mut self, slot: BehaviorSlot) -> Option<&mut BehaviorUnit> {
        self.nodes.get_mut(slot.node)?.behaviors.get_mut(slot.index)
    }

    /// Attach a behavior to the root node
    pub fn attach(&mut self, unit: BehaviorUnit) -> BehaviorSlot {
        let root = &mut self.nodes[0];
        root.behaviors.push(unit);
        BehaviorSlot {
            node: 0,
            index: root.behaviors.len() - 1,
        }
    }

    /// First behavior of the given type, depth first
    pub fn find_behavior(&self, type_id: TypeId) -> Option<BehaviorSlot> {
        self.behavior_slots().into_iter().find(|slot| {
            self.unit(*slot)
                .is_some_and(|unit| unit.behavior_type().id() == type_id)
        })
    }

    pub fn behavior<B: Behavior>(&self) -> Option<&B> {
        let slot = self.find_behavior(TypeId::of::<B>())?;
        self.unit(slot)?.downcast_ref::<B>()
    }

    pub fn behavior_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        let slot = self.find_behavior(TypeId::of::<B>())?;
        self.unit_mut(slot)?.downcast_mut::<B>()
    }

    pub fn count_of<B: Behavior>(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.behaviors.iter())
            .filter(|unit| unit.behavior_type().id() == TypeId::of::<B>())
            .count()
    }

    /// First animation driver in depth-first order
    pub fn animation_driver(&self) -> Option<&AnimationDriver> {
        self.nodes.iter().find_map(|n| n.animation.as_ref())
    }

    pub fn animation_driver_mut(&mut self) -> Option<&mut AnimationDriver> {
        self.nodes.iter_mut().find_map(|n| n.animation.as_mut())
    }

    /// Resolve the animation driver, creating one on the root if absent
    ///
    /// Returns the driver and whether it was created.
    pub fn ensure_animation_driver(&mut self) -> (&mut AnimationDriver, bool) {
        let position = self.nodes.iter().position(|n| n.animation.is_some());
        let (index, created) = match position {
            Some(index) => (index, false),
            None => (0, true),
        };
        let driver = self.nodes[index]
            .animation
            .get_or_insert_with(AnimationDriver::default);
        (driver, created)
    }
}

/// Registry of live instances, keyed by id
#[derive(Debug, Default)]
pub struct Scene {
    instances: BTreeMap<InstanceId, ActorInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance; an id can only be registered once
    pub fn insert(&mut self, instance: ActorInstance) -> Result<InstanceId, SceneError> {
        let id = instance.id();
        if self.instances.contains_key(&id) {
            return Err(SceneError::Duplicate(id));
        }
        self.instances.insert(id, instance);
        Ok(id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&ActorInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut ActorInstance> {
        self.instances.get_mut(&id)
    }

    pub fn remove(&mut self, id: InstanceId) -> Result<ActorInstance, SceneError> {
        self.instances.remove(&id).ok_or(SceneError::NotFound(id))
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorInstance> {
        self.instances.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActorInstance> {
        self.instances.values_mut()
    }

    /// Instances whose assembly has finished
    pub fn ready(&self) -> impl Iterator<Item = &ActorInstance> {
        self.instances.values().filter(|i| i.is_ready())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
