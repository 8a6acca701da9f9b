//! Behavior traits
//!
//! A behavior is one unit of logic attached to an actor node. Behaviors
//! declare the configuration types they consume at registration time:
//!
//! ```ignore
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
//! ```
//!
//! The assembly pipeline only ever sees behaviors through the object-safe
//! [`ErasedBehavior`], which every [`Behavior`] gets for free.

use crate::capability::{CapabilityDescriptor, Declarer};
use crate::error::SetupError;
use std::any::{Any, TypeId};
use std::fmt;

/// Trait for implementing actor behaviors
pub trait Behavior: Any + Send + Sync + fmt::Debug {
    /// Declare the configuration types this behavior consumes
    ///
    /// Called at most once per behavior type per [`CapabilityIndex`](crate::CapabilityIndex).
    /// The default declares nothing.
    fn declare(declarer: &mut Declarer<Self>)
    where
        Self: Sized,
    {
        let _ = declarer;
    }
}

/// Bind operation for one configuration type
///
/// `setup` is invoked by the assembly pipeline with the first configuration
/// object in the request that is (or stands in for) a `C`.
pub trait Consumes<C: 'static> {
    fn setup(&mut self, config: &C) -> Result<(), SetupError>;
}

/// Runtime identity of a behavior type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviorType {
    id: TypeId,
    name: &'static str,
}

impl BehaviorType {
    pub fn of<B: Behavior>() -> Self {
        Self {
            id: TypeId::of::<B>(),
            name: short_type_name::<B>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for BehaviorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe view of a [`Behavior`]
pub trait ErasedBehavior: Send + Sync + fmt::Debug {
    fn behavior_type(&self) -> BehaviorType;

    /// Run the type's capability declaration
    fn describe(&self) -> CapabilityDescriptor;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<B: Behavior> ErasedBehavior for B {
    fn behavior_type(&self) -> BehaviorType {
        BehaviorType::of::<B>()
    }

    fn describe(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::of::<B>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Type name without module path or generic arguments
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Idle;

    impl Behavior for Idle {}

    mod nested {
        #[derive(Debug)]
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn test_behavior_type_name() {
        let ty = BehaviorType::of::<Idle>();
        assert_eq!(ty.name(), "Idle");
        assert_eq!(ty.id(), TypeId::of::<Idle>());
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(short_type_name::<nested::Wrapper<u32>>(), "Wrapper");
    }

    #[test]
    fn test_erased_behavior_downcast() {
        let mut boxed: Box<dyn ErasedBehavior> = Box::new(Idle);
        assert_eq!(boxed.behavior_type().name(), "Idle");
        assert!(boxed.as_any().downcast_ref::<Idle>().is_some());
        assert!(boxed.as_any_mut().downcast_mut::<Idle>().is_some());
    }

    #[test]
    fn test_default_declaration_is_empty() {
        let descriptor = Idle.describe();
        assert!(descriptor.is_empty());
    }
}
