//! Configuration objects and first-fit matching
//!
//! A configuration object is an immutable named value that parameterizes a
//! behavior at assembly time. A request carries an ordered
//! [`ConfigurationSet`] whose slots may be empty; empty slots are skipped
//! and never matched.
//!
//! Type compatibility is decided by [`Configuration::view`]: every object
//! can be viewed as its own type, and an object that stands in for another
//! configuration type (a "subtype") returns the embedded value for it.

use crate::behavior::short_type_name;
use crate::capability::{Capability, CapabilityDescriptor};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Upcast helper implemented for every sized `'static` type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An immutable configuration value
pub trait Configuration: AsAny + Send + Sync + fmt::Debug {
    /// Human-readable name, used in diagnostics
    fn name(&self) -> &str;

    /// View this object as the configuration type `target`
    ///
    /// Returns `None` when the object is not compatible with `target`.
    /// Override to expose embedded values for the types this object
    /// stands in for, and fall back to the default for its own type.
    fn view(&self, target: TypeId) -> Option<&dyn Any> {
        let any = self.as_any();
        ((*any).type_id() == target).then_some(any)
    }
}

/// Runtime identity of a configuration type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigType {
    id: TypeId,
    name: &'static str,
}

impl ConfigType {
    pub fn of<C: 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: short_type_name::<C>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `config` can be bound where this type is declared
    pub fn accepts(&self, config: &dyn Configuration) -> bool {
        config.view(self.id).is_some()
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Ordered configuration objects supplied for one assembly request
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSet {
    slots: Vec<Option<Arc<dyn Configuration>>>,
}

impl ConfigurationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append of a configuration object
    pub fn with(mut self, config: impl Configuration + 'static) -> Self {
        self.push(Arc::new(config));
        self
    }

    /// Builder-style append of an empty slot
    pub fn with_null(mut self) -> Self {
        self.push_null();
        self
    }

    pub fn push(&mut self, config: Arc<dyn Configuration>) {
        self.slots.push(Some(config));
    }

    pub fn push_null(&mut self) {
        self.slots.push(None);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Arc<dyn Configuration>> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Iterate slots in caller-supplied order
    pub fn slots(&self) -> impl Iterator<Item = (usize, Option<&Arc<dyn Configuration>>)> {
        self.slots.iter().enumerate().map(|(i, s)| (i, s.as_ref()))
    }

    /// Indices of empty slots
    pub fn null_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether any non-empty slot is compatible with `ty`
    pub fn provides(&self, ty: ConfigType) -> bool {
        self.first_fit(ty).is_some()
    }

    /// First non-empty slot compatible with `ty`, in set order
    pub fn first_fit(&self, ty: ConfigType) -> Option<(usize, &Arc<dyn Configuration>)> {
        self.slots.iter().enumerate().find_map(|(i, slot)| match slot {
            Some(config) if ty.accepts(config.as_ref()) => Some((i, config)),
            _ => None,
        })
    }
}

impl From<Vec<Option<Arc<dyn Configuration>>>> for ConfigurationSet {
    fn from(slots: Vec<Option<Arc<dyn Configuration>>>) -> Self {
        Self { slots }
    }
}

impl FromIterator<Option<Arc<dyn Configuration>>> for ConfigurationSet {
    fn from_iter<I: IntoIterator<Item = Option<Arc<dyn Configuration>>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// A capability bound to the configuration object that satisfied it
#[derive(Debug, Clone)]
pub struct Binding {
    pub capability: Capability,
    pub slot: usize,
    pub config: Arc<dyn Configuration>,
}

/// A configuration matched by a declared type that has no bind operation
#[derive(Debug, Clone)]
pub struct UnboundMatch {
    pub config_type: ConfigType,
    pub slot: usize,
    pub config: Arc<dyn Configuration>,
}

/// Result of matching one behavior's capabilities against a set
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Bound capabilities, in declaration order
    pub bindings: Vec<Binding>,
    /// Declared types without a bind operation that found a configuration
    pub unbound: Vec<UnboundMatch>,
    /// Capabilities no configuration satisfied
    pub unmatched: Vec<ConfigType>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.unbound.is_empty()
    }
}

/// Match a behavior's capabilities against a configuration set
///
/// First-fit by set order: each capability binds the earliest compatible
/// object and never considers later ones. An object bound to one
/// capability stays available to the others.
pub fn match_capabilities(
    descriptor: &CapabilityDescriptor,
    configs: &ConfigurationSet,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for capability in descriptor.capabilities() {
        match configs.first_fit(capability.config_type) {
            Some((slot, config)) => outcome.bindings.push(Binding {
                capability: *capability,
                slot,
                config: Arc::clone(config),
            }),
            None => outcome.unmatched.push(capability.config_type),
        }
    }

    for config_type in descriptor.unbound() {
        match configs.first_fit(*config_type) {
            Some((slot, config)) => outcome.unbound.push(UnboundMatch {
                config_type: *config_type,
                slot,
                config: Arc::clone(config),
            }),
            None => outcome.unmatched.push(*config_type),
        }
    }

    outcome
}
