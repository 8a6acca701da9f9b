//! Actor templates
//!
//! A template is an immutable prototype: a tree of nodes, each listing the
//! behaviors to attach and whether it carries an animation driver.
//! Templates are shared behind an `Arc` and only read by the pipeline.

use crate::behavior::{Behavior, BehaviorType, ErasedBehavior};
use crate::instance::{ActorInstance, AnimationDriver, BehaviorUnit, Node};
use spawnforge_types::Placement;
use std::fmt;
use std::sync::Arc;

/// Creates a fresh behavior for every instantiation
pub type BehaviorFactory = Arc<dyn Fn() -> Box<dyn ErasedBehavior> + Send + Sync>;

/// One behavior to attach to a node
#[derive(Clone)]
pub struct BehaviorSpec {
    behavior_type: BehaviorType,
    factory: BehaviorFactory,
    active: bool,
}

impl BehaviorSpec {
    /// Attach a default-constructed `B`
    pub fn of<B: Behavior + Default>() -> Self {
        Self::from_fn(B::default)
    }

    /// Attach a `B` built by `make`
    pub fn from_fn<B, F>(make: F) -> Self
    where
        B: Behavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self {
            behavior_type: BehaviorType::of::<B>(),
            factory: Arc::new(move || Box::new(make()) as Box<dyn ErasedBehavior>),
            active: true,
        }
    }

    /// Mark the behavior as attached but inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn behavior_type(&self) -> BehaviorType {
        self.behavior_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Build a new behavior unit
    pub fn create(&self) -> BehaviorUnit {
        BehaviorUnit::new((self.factory)(), self.active)
    }
}

impl fmt::Debug for BehaviorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorSpec")
            .field("behavior_type", &self.behavior_type.name())
            .field("active", &self.active)
            .finish()
    }
}

/// A node of an actor template
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    pub name: String,
    pub behaviors: Vec<BehaviorSpec>,
    pub animation_driver: bool,
    pub children: Vec<NodeTemplate>,
}

impl NodeTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviors: Vec::new(),
            animation_driver: false,
            children: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, spec: BehaviorSpec) -> Self {
        self.behaviors.push(spec);
        self
    }

    pub fn with_animation_driver(mut self) -> Self {
        self.animation_driver = true;
        self
    }

    pub fn with_child(mut self, child: NodeTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Behaviors in this subtree, depth first
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
            + self
                .children
                .iter()
                .map(NodeTemplate::behavior_count)
                .sum::<usize>()
    }
}

/// Immutable prototype of an actor
#[derive(Debug, Clone)]
pub struct ActorTemplate {
    name: String,
    root: NodeTemplate,
}

impl ActorTemplate {
    pub fn new(name: impl Into<String>, root: NodeTemplate) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &NodeTemplate {
        &self.root
    }

    pub fn behavior_count(&self) -> usize {
        self.root.behavior_count()
    }

    /// Create a new instance of this template
    ///
    /// Nodes are laid out in pre-order, so iterating the instance's nodes
    /// visits them depth first.
    pub fn instantiate(&self, placement: Placement) -> ActorInstance {
        let mut nodes = Vec::new();
        push_node(&mut nodes, &self.root, None);
        ActorInstance::new(self.name.clone(), placement, nodes)
    }
}

fn push_node(nodes: &mut Vec<Node>, template: &NodeTemplate, parent: Option<usize>) -> usize {
    let index = nodes.len();
    nodes.push(Node {
        name: template.name.clone(),
        parent,
        children: Vec::new(),
        behaviors: template.behaviors.iter().map(BehaviorSpec::create).collect(),
        animation: template.animation_driver.then(AnimationDriver::default),
    });

    for child in &template.children {
        let child_index = push_node(nodes, child, Some(index));
        nodes[index].children.push(child_index);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Wheel;
    impl Behavior for Wheel {}

    #[derive(Debug)]
    struct Engine {
        power: u32,
    }
    impl Behavior for Engine {}

    fn car() -> ActorTemplate {
        ActorTemplate::new(
            "Car",
            NodeTemplate::new("body")
                .with_behavior(BehaviorSpec::from_fn(|| Engine { power: 120 }))
                .with_child(
                    NodeTemplate::new("front")
                        .with_behavior(BehaviorSpec::of::<Wheel>())
                        .with_behavior(BehaviorSpec::of::<Wheel>().inactive()),
                )
                .with_child(
                    NodeTemplate::new("model")
                        .with_animation_driver()
                        .with_behavior(BehaviorSpec::of::<Wheel>()),
                ),
        )
    }

    #[test]
    fn test_instantiate_preorder() {
        let instance = car().instantiate(Placement::ORIGIN);
        let names: Vec<_> = instance.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["body", "front", "model"]);
        assert_eq!(instance.nodes()[0].children, vec![1, 2]);
        assert_eq!(instance.nodes()[2].parent, Some(0));
        assert!(instance.nodes()[2].animation.is_some());
    }

    #[test]
    fn test_instantiate_creates_fresh_behaviors() {
        let template = car();
        let a = template.instantiate(Placement::ORIGIN);
        let b = template.instantiate(Placement::at(1.0, 0.0, 0.0));

        assert_ne!(a.id(), b.id());
        assert_eq!(template.behavior_count(), 4);
        assert_eq!(a.behavior_slots().len(), 4);
        assert_eq!(a.behavior::<Engine>().map(|e| e.power), Some(120));
        assert_eq!(b.placement(), Placement::at(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_inactive_flag_carried() {
        let instance = car().instantiate(Placement::ORIGIN);
        let flags: Vec<_> = instance
            .behavior_slots()
            .into_iter()
            .filter_map(|slot| instance.unit(slot).map(|u| u.is_active()))
            .collect();
        assert_eq!(flags, vec![true, true, false, true]);
    }
}
