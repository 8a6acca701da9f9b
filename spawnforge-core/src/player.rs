//! Built-in player controller
//!
//! [`PlayerControllerModel`] is the configuration a spawner hands to every
//! request by default; [`PlayerController`] is the behavior that consumes
//! it. A request carrying the model onto an instance without a controller
//! gets one synthesized (see [`ControllerRule::player`](crate::ControllerRule::player)).

use crate::behavior::{Behavior, Consumes};
use crate::capability::Declarer;
use crate::config::Configuration;
use crate::error::SetupError;
use serde::{Deserialize, Serialize};

fn default_model_name() -> String {
    "PlayerControllerModel".to_string()
}

fn default_move_action() -> String {
    "Move".to_string()
}

fn default_jump_action() -> String {
    "Jump".to_string()
}

fn default_airborne_speed_multiplier() -> f32 {
    0.5
}

/// Input bindings and movement tuning for a player-driven actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerControllerModel {
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Input action driving movement
    #[serde(default = "default_move_action")]
    pub move_action: String,

    /// Input action triggering a jump
    #[serde(default = "default_jump_action")]
    pub jump_action: String,

    /// Fraction of ground speed available while airborne
    #[serde(default = "default_airborne_speed_multiplier")]
    pub airborne_speed_multiplier: f32,
}

impl Default for PlayerControllerModel {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            move_action: default_move_action(),
            jump_action: default_jump_action(),
            airborne_speed_multiplier: default_airborne_speed_multiplier(),
        }
    }
}

impl Configuration for PlayerControllerModel {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Behavior reading player input through a [`PlayerControllerModel`]
#[derive(Debug, Default)]
pub struct PlayerController {
    model: Option<PlayerControllerModel>,
}

impl PlayerController {
    pub fn model(&self) -> Option<&PlayerControllerModel> {
        self.model.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }
}

impl Behavior for PlayerController {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<PlayerControllerModel>();
    }
}

impl Consumes<PlayerControllerModel> for PlayerController {
    fn setup(&mut self, config: &PlayerControllerModel) -> Result<(), SetupError> {
        if config.move_action.is_empty() {
            return Err(SetupError::invalid("move action is not bound"));
        }
        if config.jump_action.is_empty() {
            return Err(SetupError::invalid("jump action is not bound"));
        }
        let multiplier = config.airborne_speed_multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(SetupError::invalid(format!(
                "airborne speed multiplier must be a non-negative number, got {multiplier}"
            )));
        }

        self.model = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults() {
        let model: PlayerControllerModel = serde_json::from_str("{}").unwrap();
        assert_eq!(model, PlayerControllerModel::default());
        assert_eq!(model.airborne_speed_multiplier, 0.5);
    }

    #[test]
    fn test_setup_stores_model() {
        let mut controller = PlayerController::default();
        controller.setup(&PlayerControllerModel::default()).unwrap();
        assert!(controller.is_configured());
        assert_eq!(controller.model().map(|m| m.jump_action.as_str()), Some("Jump"));
    }

    #[test]
    fn test_setup_rejects_invalid_model() {
        let mut controller = PlayerController::default();
        let model = PlayerControllerModel {
            airborne_speed_multiplier: -1.0,
            ..Default::default()
        };
        let err = controller.setup(&model).unwrap_err();
        assert!(matches!(err, SetupError::Invalid(_)));
        assert!(!controller.is_configured());

        let unbound = PlayerControllerModel {
            move_action: String::new(),
            ..Default::default()
        };
        assert_eq!(
            controller.setup(&unbound),
            Err(SetupError::invalid("move action is not bound"))
        );
    }
}
