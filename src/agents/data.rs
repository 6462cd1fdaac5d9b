//! Agent archetype data loading from RON files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;

use super::behavior::{DeathConfig, HostileReaction, IdleBehavior, SearchConfig};
use super::builder::{AgentBuilder, DEFAULT_ANGER_DURATION};
use crate::actions::ActionConfig;
use crate::combat::LootTable;
use crate::error::DataLoadError;
use crate::providers::PerceptionConfig;
use crate::triggers::TriggerConfig;

fn default_move_speed() -> f32 {
    3.5
}

fn default_anger_duration() -> f32 {
    DEFAULT_ANGER_DURATION
}

/// Archetype definition loaded from a RON file.
#[derive(Deserialize, Clone, Debug)]
pub struct ArchetypeDefinition {
    pub name: String,
    pub max_health: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Seconds of hostility kept without perceiving the target
    #[serde(default = "default_anger_duration")]
    pub anger_duration: f32,
    #[serde(default)]
    pub perception: PerceptionConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    #[serde(default)]
    pub reaction: HostileReaction,
    #[serde(default)]
    pub idle: IdleBehavior,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub death: DeathConfig,
    #[serde(default)]
    pub loot: LootTable,
}

impl ArchetypeDefinition {
    pub fn from_ron(source: &str, path: &str) -> Result<Self, DataLoadError> {
        let definition: Self = ron::from_str(source).map_err(|e| DataLoadError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })?;
        definition.validate(path)?;
        Ok(definition)
    }

    fn validate(&self, path: &str) -> Result<(), DataLoadError> {
        let invalid = |details: &str| DataLoadError::Invalid {
            path: path.to_string(),
            details: details.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(invalid("max_health must be positive"));
        }
        if !(self.move_speed.is_finite() && self.move_speed >= 0.0) {
            return Err(invalid("move_speed must not be negative"));
        }
        Ok(())
    }

    /// Archetypes this one summons.
    pub fn summoned_archetypes(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|action| match action {
            ActionConfig::Summon(config) => Some(config.archetype.as_str()),
            _ => None,
        })
    }

    /// A builder carrying everything but the collaborators, which depend
    /// on where the agent is spawned.
    pub fn builder(&self, archetype: &str) -> AgentBuilder {
        let mut builder = AgentBuilder::new(self.name.clone(), self.max_health)
            .archetype(archetype)
            .with_triggers(&self.triggers)
            .with_actions(&self.actions)
            .with_reaction(self.reaction.clone())
            .with_idle(self.idle.clone())
            .with_death(self.death.clone())
            .with_loot(self.loot.clone())
            .with_anger_duration(self.anger_duration);
        if let Some(search) = &self.search {
            builder = builder.with_search(search.clone());
        }
        builder
    }
}

/// Resource holding all loaded archetype definitions, keyed by file stem.
#[derive(Resource, Default)]
pub struct ArchetypeRegistry {
    pub definitions: HashMap<String, ArchetypeDefinition>,
}

impl ArchetypeRegistry {
    /// Get an archetype definition by key.
    pub fn get(&self, archetype: &str) -> Option<&ArchetypeDefinition> {
        self.definitions.get(archetype)
    }

    pub fn insert(&mut self, archetype: impl Into<String>, definition: ArchetypeDefinition) {
        self.definitions.insert(archetype.into(), definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// `(summoner, summoned)` pairs whose summoned archetype is not loaded.
    pub fn missing_summons(&self) -> Vec<(String, String)> {
        let definitions = &self.definitions;
        let mut missing: Vec<(String, String)> = definitions
            .iter()
            .flat_map(|(key, definition)| {
                definition
                    .summoned_archetypes()
                    .filter(move |summoned| !definitions.contains_key(*summoned))
                    .map(move |summoned| (key.clone(), summoned.to_string()))
            })
            .collect();
        missing.sort();
        missing
    }

    /// Load every `.ron` file in `dir`. Bad files are logged and skipped;
    /// only a missing or unreadable directory is an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, DataLoadError> {
        if !dir.exists() {
            return Err(DataLoadError::FileNotFound(dir.display().to_string()));
        }
        let entries = fs::read_dir(dir).map_err(|e| DataLoadError::ReadError {
            path: dir.display().to_string(),
            details: e.to_string(),
        })?;

        // Sorted so that load order and log output are stable.
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(archetype) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match load_file(&path) {
                Ok(definition) => {
                    info!("Loaded archetype: {} ({})", definition.name, archetype);
                    self.insert(archetype, definition);
                    loaded += 1;
                }
                Err(e) => error!("{}", e),
            }
        }
        Ok(loaded)
    }
}

fn load_file(path: &Path) -> Result<ArchetypeDefinition, DataLoadError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;
    ArchetypeDefinition::from_ron(&contents, &display)
}

/// Where [`load_archetypes`] looks for definitions.
#[derive(Resource, Debug, Clone)]
pub struct AgentDataPath(pub PathBuf);

impl Default for AgentDataPath {
    fn default() -> Self {
        Self(PathBuf::from("assets/data/agents"))
    }
}

/// Load all archetype definitions at startup.
pub fn load_archetypes(path: Res<AgentDataPath>, mut registry: ResMut<ArchetypeRegistry>) {
    match registry.load_dir(&path.0) {
        Ok(count) => info!("Loaded {} archetype definitions", count),
        Err(e) => warn!("No archetypes loaded: {}", e),
    }
    for (summoner, summoned) in registry.missing_summons() {
        warn!("Archetype '{}' summons unknown archetype '{}'", summoner, summoned);
    }
}
