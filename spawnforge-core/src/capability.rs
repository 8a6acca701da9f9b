//! Capability declarations and the per-type capability index
//!
//! A capability is a `(configuration type, bind operation)` pair exposed by
//! a behavior type. Behaviors declare their capabilities once through a
//! [`Declarer`]; the [`CapabilityIndex`] runs that declaration lazily the
//! first time a behavior type is assembled and caches the resulting
//! [`CapabilityDescriptor`] for the rest of the process lifetime.

use crate::behavior::{Behavior, BehaviorType, Consumes, ErasedBehavior};
use crate::config::ConfigType;
use crate::error::SetupError;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Type-erased bind operation: `(behavior, configuration view)`
pub type BindFn = fn(&mut dyn Any, &dyn Any) -> Result<(), SetupError>;

/// A configuration type a behavior consumes, with its bind operation
#[derive(Clone, Copy)]
pub struct Capability {
    pub config_type: ConfigType,
    pub bind: BindFn,
}

impl Capability {
    /// Invoke the bind operation on `behavior` with `config`
    pub fn invoke(&self, behavior: &mut dyn Any, config: &dyn Any) -> Result<(), SetupError> {
        (self.bind)(behavior, config)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("config_type", &self.config_type.name())
            .finish()
    }
}

fn bind_erased<B, C>(behavior: &mut dyn Any, config: &dyn Any) -> Result<(), SetupError>
where
    B: Behavior + Consumes<C>,
    C: 'static,
{
    let behavior = behavior
        .downcast_mut::<B>()
        .ok_or(SetupError::BehaviorMismatch(BehaviorType::of::<B>().name()))?;
    let config = config
        .downcast_ref::<C>()
        .ok_or(SetupError::ConfigMismatch(ConfigType::of::<C>().name()))?;
    behavior.setup(config)
}

/// Registration-time capability table builder for behavior type `B`
pub struct Declarer<B> {
    capabilities: Vec<Capability>,
    unbound: Vec<ConfigType>,
    _behavior: PhantomData<fn() -> B>,
}

impl<B: Behavior> Declarer<B> {
    pub(crate) fn new() -> Self {
        Self {
            capabilities: Vec::new(),
            unbound: Vec::new(),
            _behavior: PhantomData,
        }
    }

    /// Declare that `B` consumes `C` through its `Consumes<C>` impl
    pub fn consumes<C: 'static>(&mut self) -> &mut Self
    where
        B: Consumes<C>,
    {
        let config_type = ConfigType::of::<C>();
        if !self.declares(config_type) {
            self.capabilities.push(Capability {
                config_type,
                bind: bind_erased::<B, C>,
            });
        }
        self
    }

    /// Declare interest in `C` without a bind operation
    ///
    /// The type is left out of the bound capability list. When a request
    /// carries a matching configuration, the assembly reports that the
    /// setup method is missing instead of invoking anything.
    pub fn expects<C: 'static>(&mut self) -> &mut Self {
        let config_type = ConfigType::of::<C>();
        if !self.declares(config_type) {
            self.unbound.push(config_type);
        }
        self
    }

    fn declares(&self, config_type: ConfigType) -> bool {
        self.capabilities.iter().any(|c| c.config_type == config_type)
            || self.unbound.contains(&config_type)
    }

    fn finish(self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            behavior: BehaviorType::of::<B>(),
            capabilities: self.capabilities,
            unbound: self.unbound,
        }
    }
}

/// The capabilities declared by one behavior type
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    behavior: BehaviorType,
    capabilities: Vec<Capability>,
    unbound: Vec<ConfigType>,
}

impl CapabilityDescriptor {
    /// Run `B`'s declaration
    pub fn of<B: Behavior>() -> Self {
        let mut declarer = Declarer::<B>::new();
        B::declare(&mut declarer);
        declarer.finish()
    }

    pub fn behavior(&self) -> BehaviorType {
        self.behavior
    }

    /// Bound capabilities in declaration order
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Declared configuration types without a bind operation
    pub fn unbound(&self) -> &[ConfigType] {
        &self.unbound
    }

    pub fn config_types(&self) -> impl Iterator<Item = ConfigType> + '_ {
        self.capabilities.iter().map(|c| c.config_type)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty() && self.unbound.is_empty()
    }
}

/// Process-wide cache of capability descriptors keyed by behavior type
///
/// Populated lazily and never invalidated. Two callers racing on the same
/// type may both run the declaration; the first stored descriptor wins and
/// both get it back.
#[derive(Debug, Default)]
pub struct CapabilityIndex {
    descriptors: DashMap<TypeId, Arc<CapabilityDescriptor>>,
    introspections: AtomicU64,
    hits: AtomicU64,
}

impl CapabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities of `behavior`'s concrete type
    pub fn capabilities(&self, behavior: &dyn ErasedBehavior) -> Arc<CapabilityDescriptor> {
        let ty = behavior.behavior_type();
        if let Some(descriptor) = self.descriptors.get(&ty.id()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(descriptor.value());
        }

        self.introspections.fetch_add(1, Ordering::Relaxed);
        let descriptor = Arc::new(behavior.describe());
        tracing::debug!(
            behavior = ty.name(),
            capabilities = descriptor.capabilities().len(),
            unbound = descriptor.unbound().len(),
            "indexed behavior capabilities"
        );

        Arc::clone(self.descriptors.entry(ty.id()).or_insert(descriptor).value())
    }

    /// Capabilities of behavior type `B`, without an instance at hand
    pub fn capabilities_of<B: Behavior>(&self) -> Arc<CapabilityDescriptor> {
        let id = TypeId::of::<B>();
        if let Some(descriptor) = self.descriptors.get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(descriptor.value());
        }

        self.introspections.fetch_add(1, Ordering::Relaxed);
        let descriptor = Arc::new(CapabilityDescriptor::of::<B>());
        Arc::clone(self.descriptors.entry(id).or_insert(descriptor).value())
    }

    /// Whether a descriptor is cached for `ty`
    pub fn contains(&self, ty: BehaviorType) -> bool {
        self.descriptors.contains_key(&ty.id())
    }

    /// Number of behavior types indexed
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn stats(&self) -> CapabilityIndexStats {
        CapabilityIndexStats {
            indexed_types: self.descriptors.len(),
            introspections: self.introspections.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of capability index counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityIndexStats {
    pub indexed_types: usize,
    /// Declarations run (cache misses)
    pub introspections: u64,
    pub hits: u64,
}

impl CapabilityIndexStats {
    /// Cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = (self.hits + self.introspections) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.hits as f64 / total
        }
    }
}
