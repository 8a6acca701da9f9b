//! Scene file parsing
//!
//! A scene file (`spawnforge.yml`) describes the actor templates, the
//! configuration objects, the spawn buttons and the spawner settings.
//! [`SceneFile::build_host`] turns it into a ready-to-tick [`Host`].

use crate::catalog::{self, HealthConfig, MountConfig, MoveConfig, WeaponConfig};
use serde::Deserialize;
use spawnforge_core::{
    ActorTemplate, AnimationController, AssemblyScheduler, CapabilityIndex, Configuration,
    ConfigurationSet, ControllerRule, DiagnosticsSink, Host, NodeTemplate, Placement,
    PlayerControllerModel, SchedulerConfig, SpawnButton, SpawnButtonConfig, SpawnError, Spawner,
    DEFAULT_BATCH_SIZE,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read scene file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Unknown behavior kind '{kind}' in template '{template}'")]
    UnknownBehavior { template: String, kind: String },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Button '{button}' refers to unknown configuration '{name}'")]
    UnknownConfig { button: String, name: String },

    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Configuration '{0}' is not a player_controller")]
    NotAControllerModel(String),

    #[error("Failed to install spawner: {0}")]
    Spawn(#[from] SpawnError),
}

/// Root of `spawnforge.yml`
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    pub spawner: SpawnerSection,

    #[serde(default)]
    pub templates: Vec<TemplateEntry>,

    #[serde(default)]
    pub configs: Vec<ConfigEntry>,

    #[serde(default)]
    pub buttons: Vec<ButtonEntry>,

    /// Console aliases, shorthand to command name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnerSection {
    /// Name of the template to spawn
    pub template: Option<String>,

    /// Name of a `player_controller` configuration appended to every request
    #[serde(default)]
    pub controller_model: Option<String>,

    #[serde(default)]
    pub placement: Placement,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub root: NodeEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    pub name: String,

    #[serde(default)]
    pub behaviors: Vec<BehaviorEntry>,

    #[serde(default)]
    pub animation_driver: bool,

    #[serde(default)]
    pub children: Vec<NodeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorEntry {
    pub kind: String,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A configuration object, tagged by kind
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigEntry {
    Move(MoveConfig),
    Mount(MountConfig),
    Health(HealthConfig),
    Weapon(WeaponConfig),
    PlayerController(PlayerControllerModel),
}

impl ConfigEntry {
    pub fn name(&self) -> &str {
        match self {
            ConfigEntry::Move(c) => c.name(),
            ConfigEntry::Mount(c) => c.name(),
            ConfigEntry::Health(c) => c.name(),
            ConfigEntry::Weapon(c) => c.name(),
            ConfigEntry::PlayerController(c) => c.name(),
        }
    }

    fn to_configuration(&self) -> Arc<dyn Configuration> {
        match self {
            ConfigEntry::Move(c) => Arc::new(c.clone()),
            ConfigEntry::Mount(c) => Arc::new(c.clone()),
            ConfigEntry::Health(c) => Arc::new(c.clone()),
            ConfigEntry::Weapon(c) => Arc::new(c.clone()),
            ConfigEntry::PlayerController(c) => Arc::new(c.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonEntry {
    pub label: String,

    /// Configuration names in request order; `~` leaves the slot empty
    #[serde(default)]
    pub configs: Vec<Option<String>>,

    #[serde(default)]
    pub animation_controller: Option<AnimationController>,
}

impl SceneFile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve every template in the file
    pub fn templates(&self) -> Result<BTreeMap<String, Arc<ActorTemplate>>, ConfigError> {
        let mut templates = BTreeMap::new();
        for entry in &self.templates {
            let root = build_node(&entry.name, &entry.root)?;
            let template = Arc::new(ActorTemplate::new(entry.name.clone(), root));
            if templates.insert(entry.name.clone(), template).is_some() {
                return Err(ConfigError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(templates)
    }

    fn configurations(&self) -> Result<HashMap<String, Arc<dyn Configuration>>, ConfigError> {
        let mut configs = HashMap::new();
        for entry in &self.configs {
            let name = entry.name().to_string();
            if configs.insert(name.clone(), entry.to_configuration()).is_some() {
                return Err(ConfigError::DuplicateName(name));
            }
        }
        Ok(configs)
    }

    fn controller_model(&self) -> Result<Option<PlayerControllerModel>, ConfigError> {
        let Some(name) = &self.spawner.controller_model else {
            return Ok(None);
        };
        self.configs
            .iter()
            .find_map(|entry| match entry {
                ConfigEntry::PlayerController(model) if &model.name == name => {
                    Some(model.clone())
                }
                _ => None,
            })
            .map(Some)
            .ok_or_else(|| ConfigError::NotAControllerModel(name.clone()))
    }

    fn button_configs(&self) -> Result<Vec<SpawnButtonConfig>, ConfigError> {
        let configs = self.configurations()?;
        self.buttons
            .iter()
            .map(|button| -> Result<SpawnButtonConfig, ConfigError> {
                let setup_models = button
                    .configs
                    .iter()
                    .map(|slot| match slot {
                        None => Ok(None),
                        Some(name) => configs.get(name).cloned().map(Some).ok_or_else(|| {
                            ConfigError::UnknownConfig {
                                button: button.label.clone(),
                                name: name.clone(),
                            }
                        }),
                    })
                    .collect::<Result<ConfigurationSet, _>>()?;

                Ok(SpawnButtonConfig {
                    button_text: button.label.clone(),
                    setup_models,
                    animator_controller: button.animation_controller.clone(),
                })
            })
            .collect()
    }

    /// Build the host: one spawner, one button per button entry
    pub fn build_host(&self, sink: Arc<dyn DiagnosticsSink>) -> Result<Host, ConfigError> {
        let templates = self.templates()?;
        let template = match &self.spawner.template {
            Some(name) => Some(
                templates
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownTemplate(name.clone()))?,
            ),
            None => None,
        };

        let scheduler = AssemblyScheduler::new(
            Arc::new(CapabilityIndex::new()),
            Arc::clone(&sink),
            SchedulerConfig {
                batch_size: self.spawner.batch_size,
                controller: Some(ControllerRule::player()),
            },
        );

        let mut spawner = Spawner::new(scheduler).with_placement(self.spawner.placement);
        if let Some(template) = template {
            spawner = spawner.with_template(template);
        }
        if let Some(model) = self.controller_model()? {
            spawner = spawner.with_controller_model(model);
        }
        for config in self.button_configs()? {
            spawner = spawner.with_button_config(config);
        }

        let mut host = Host::new(sink);
        for (index, _) in self.buttons.iter().enumerate() {
            host.add_button(SpawnButton::new(format!("button-{index}")));
        }
        host.install_spawner(spawner)?;
        Ok(host)
    }
}

fn build_node(template: &str, entry: &NodeEntry) -> Result<NodeTemplate, ConfigError> {
    let mut node = NodeTemplate::new(entry.name.clone());
    if entry.animation_driver {
        node = node.with_animation_driver();
    }

    for behavior in &entry.behaviors {
        let spec =
            catalog::behavior(&behavior.kind).ok_or_else(|| ConfigError::UnknownBehavior {
                template: template.to_string(),
                kind: behavior.kind.clone(),
            })?;
        node = node.with_behavior(if behavior.active {
            spec
        } else {
            spec.inactive()
        });
    }

    for child in &entry.children {
        node = node.with_child(build_node(template, child)?);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spawnforge_core::{DiagnosticLog, PlayerController};

    const SAMPLE: &str = include_str!("../../spawnforge.yml.example");

    #[test]
    fn test_parse_sample() {
        let scene = SceneFile::parse(SAMPLE).unwrap();
        assert_eq!(scene.spawner.template.as_deref(), Some("soldier"));
        assert_eq!(scene.spawner.batch_size, 5);
        assert_eq!(scene.buttons[0].configs[1], None);
        assert_eq!(scene.aliases.get("pa").map(String::as_str), Some("playanimation"));
    }

    #[test]
    fn test_build_host_from_sample() {
        let scene = SceneFile::parse(SAMPLE).unwrap();
        let log = Arc::new(DiagnosticLog::new());
        let mut host = scene.build_host(log.clone()).unwrap();

        assert_eq!(host.buttons().len(), scene.buttons.len());
        assert_eq!(host.buttons()[0].label(), "Soldier");

        host.click_button(0).unwrap();
        let reports = host.run_until_idle(100);
        assert_eq!(reports.len(), 1);

        let soldier = host.scene().get(reports[0].instance.unwrap()).unwrap();
        assert_eq!(soldier.count_of::<PlayerController>(), 1);
        assert_eq!(
            soldier.behavior::<catalog::Mover>().map(|m| m.speed),
            Some(5.0)
        );
    }

    #[test]
    fn test_unknown_behavior_kind() {
        let yaml = r#"
spawner:
  template: ghost
templates:
  - name: ghost
    root:
      name: root
      behaviors:
        - kind: haunt
"#;
        let err = SceneFile::parse(yaml)
            .unwrap()
            .build_host(Arc::new(DiagnosticLog::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBehavior { ref kind, .. } if kind == "haunt"));
    }

    #[test]
    fn test_unknown_config_reference() {
        let yaml = r#"
spawner:
  template: ~
buttons:
  - label: Broken
    configs: [nowhere]
"#;
        let err = SceneFile::parse(yaml)
            .unwrap()
            .build_host(Arc::new(DiagnosticLog::new()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Button 'Broken' refers to unknown configuration 'nowhere'"
        );
    }

    #[test]
    fn test_controller_model_must_be_player_controller() {
        let yaml = r#"
spawner:
  controller_model: walk
configs:
  - kind: move
    name: walk
    speed: 1.0
"#;
        let err = SceneFile::parse(yaml)
            .unwrap()
            .build_host(Arc::new(DiagnosticLog::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAControllerModel(_)));
    }
}
