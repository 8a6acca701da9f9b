//! Controller synthesis rules

use crate::behavior::Behavior;
use crate::config::ConfigType;
use crate::player::{PlayerController, PlayerControllerModel};
use crate::template::BehaviorSpec;

/// Synthesize `controller` when a request carries a `marker` configuration
///
/// Applied once per assembly, during enumeration: if any configuration in
/// the request can be viewed as the marker type and the instance has no
/// behavior of the controller's type, one is attached to the root node and
/// appended to the behavior list.
#[derive(Debug, Clone)]
pub struct ControllerRule {
    marker: ConfigType,
    controller: BehaviorSpec,
}

impl ControllerRule {
    pub fn new<M: 'static>(controller: BehaviorSpec) -> Self {
        Self {
            marker: ConfigType::of::<M>(),
            controller,
        }
    }

    pub fn of<M: 'static, B: Behavior + Default>() -> Self {
        Self::new::<M>(BehaviorSpec::of::<B>())
    }

    /// [`PlayerController`] on [`PlayerControllerModel`]
    pub fn player() -> Self {
        Self::of::<PlayerControllerModel, PlayerController>()
    }

    pub fn marker(&self) -> ConfigType {
        self.marker
    }

    pub fn controller(&self) -> &BehaviorSpec {
        &self.controller
    }
}
