//! Built-in behavior and configuration kinds available to scene files

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use spawnforge_core::{
    AsAny, Behavior, BehaviorSpec, Configuration, Consumes, Declarer, PlayerController,
    SetupError,
};
use std::any::{Any, TypeId};
use std::collections::BTreeMap;

/// Ground movement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveConfig {
    pub name: String,
    pub speed: f32,
}

impl Configuration for MoveConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    pub name: String,
    pub max_health: u32,
    #[serde(default)]
    pub regen_per_second: f32,
}

impl Configuration for HealthConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub name: String,
    pub damage: u32,
    #[serde(default = "default_range")]
    pub range: f32,
}

fn default_range() -> f32 {
    1.0
}

impl Configuration for WeaponConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Deserialize)]
struct MountFields {
    name: String,
    speed: f32,
    #[serde(default = "default_seats")]
    seats: u32,
}

fn default_seats() -> u32 {
    1
}

/// A mount; stands in for a [`MoveConfig`] with its own gait
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "MountFields")]
pub struct MountConfig {
    pub gait: MoveConfig,
    pub seats: u32,
}

impl From<MountFields> for MountConfig {
    fn from(fields: MountFields) -> Self {
        Self {
            gait: MoveConfig {
                name: fields.name,
                speed: fields.speed,
            },
            seats: fields.seats,
        }
    }
}

impl Configuration for MountConfig {
    fn name(&self) -> &str {
        &self.gait.name
    }

    fn view(&self, target: TypeId) -> Option<&dyn Any> {
        if target == TypeId::of::<MoveConfig>() {
            return Some(&self.gait);
        }
        let any = self.as_any();
        ((*any).type_id() == target).then_some(any)
    }
}

#[derive(Debug, Default)]
pub struct Mover {
    pub speed: f32,
}

impl Behavior for Mover {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<MoveConfig>();
    }
}

impl Consumes<MoveConfig> for Mover {
    fn setup(&mut self, config: &MoveConfig) -> Result<(), SetupError> {
        if !config.speed.is_finite() || config.speed < 0.0 {
            return Err(SetupError::invalid(format!("speed {} is out of range", config.speed)));
        }
        self.speed = config.speed;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Renderer;

impl Behavior for Renderer {}

#[derive(Debug, Default)]
pub struct Health {
    pub max: u32,
    pub current: u32,
    pub regen: f32,
}

impl Behavior for Health {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<HealthConfig>();
    }
}

impl Consumes<HealthConfig> for Health {
    fn setup(&mut self, config: &HealthConfig) -> Result<(), SetupError> {
        if config.max_health == 0 {
            return Err(SetupError::invalid("max_health must be positive"));
        }
        self.max = config.max_health;
        self.current = config.max_health;
        self.regen = config.regen_per_second;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Loadout {
    pub weapon: Option<String>,
    pub damage: u32,
}

impl Behavior for Loadout {
    fn declare(declarer: &mut Declarer<Self>) {
        declarer.consumes::<WeaponConfig>();
    }
}

impl Consumes<WeaponConfig> for Loadout {
    fn setup(&mut self, config: &WeaponConfig) -> Result<(), SetupError> {
        if config.damage == 0 {
            return Err(SetupError::invalid(format!(
                "weapon '{}' deals no damage",
                config.name
            )));
        }
        self.weapon = Some(config.name.clone());
        self.damage = config.damage;
        Ok(())
    }
}

/// Behavior kinds by scene-file name
pub static BEHAVIORS: Lazy<BTreeMap<&'static str, BehaviorSpec>> = Lazy::new(|| {
    BTreeMap::from([
        ("health", BehaviorSpec::of::<Health>()),
        ("loadout", BehaviorSpec::of::<Loadout>()),
        ("mover", BehaviorSpec::of::<Mover>()),
        ("player_controller", BehaviorSpec::of::<PlayerController>()),
        ("renderer", BehaviorSpec::of::<Renderer>()),
    ])
});

pub fn behavior(kind: &str) -> Option<BehaviorSpec> {
    BEHAVIORS.get(kind).cloned()
}
