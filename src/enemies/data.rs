//! Enemy data loading from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::components::{EnemyConfig, DEFAULT_HIT_REACTION_DELAY};
use super::error::EnemyDataError;

/// Enemy definition loaded from RON file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct EnemyDefinition {
    pub name: String,
    pub max_health: f32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub damage: f32,
    /// Falls back to `DEFAULT_HIT_REACTION_DELAY`.
    #[serde(default)]
    pub hit_reaction_delay: Option<f32>,
    /// Patrol route as (x, y) points.
    #[serde(default)]
    pub waypoints: Vec<(f32, f32)>,
}

impl EnemyDefinition {
    /// Parse and validate a definition. `origin` names the source in errors.
    pub fn from_ron(origin: &str, contents: &str) -> Result<Self, EnemyDataError> {
        let definition: EnemyDefinition =
            ron::from_str(contents).map_err(|e| EnemyDataError::ParseError {
                path: origin.to_string(),
                details: e.to_string(),
            })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check every stat is in range.
    pub fn validate(&self) -> Result<(), EnemyDataError> {
        let positive = [
            ("max_health", self.max_health),
            ("move_speed", self.move_speed),
            ("attack_range", self.attack_range),
            ("attack_cooldown", self.attack_cooldown),
        ];
        let non_negative = [
            ("damage", self.damage),
            ("hit_reaction_delay", self.hit_reaction_delay()),
        ];

        let invalid = positive
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
            .or_else(|| {
                non_negative
                    .iter()
                    .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
            });

        match invalid {
            Some(&(stat, value)) => Err(EnemyDataError::InvalidStat {
                enemy: self.name.clone(),
                stat,
                value,
            }),
            None => Ok(()),
        }
    }

    pub fn hit_reaction_delay(&self) -> f32 {
        self.hit_reaction_delay.unwrap_or(DEFAULT_HIT_REACTION_DELAY)
    }

    /// Convert to the state machine's tuning values.
    pub fn to_config(&self) -> EnemyConfig {
        EnemyConfig {
            move_speed: self.move_speed,
            attack_range: self.attack_range,
            attack_cooldown: self.attack_cooldown,
            damage: self.damage,
            hit_reaction_delay: self.hit_reaction_delay(),
            waypoints: self
                .waypoints
                .iter()
                .map(|&(x, y)| Vec2::new(x, y))
                .collect(),
        }
    }
}

/// Read, parse and validate a single definition file.
pub fn load_definition(path: &Path) -> Result<EnemyDefinition, EnemyDataError> {
    if !path.exists() {
        return Err(EnemyDataError::FileNotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path).map_err(|e| EnemyDataError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    EnemyDefinition::from_ron(&path.display().to_string(), &contents)
}

/// Directory enemy definitions are loaded from.
#[derive(Resource, Clone, Debug)]
pub struct EnemyDataDir(pub PathBuf);

impl Default for EnemyDataDir {
    fn default() -> Self {
        Self(PathBuf::from("assets/data/enemies"))
    }
}

/// Resource holding all loaded enemy definitions.
#[derive(Resource, Default)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, EnemyDefinition>,
}

impl EnemyRegistry {
    /// Get an enemy definition by type name.
    pub fn get(&self, enemy_type: &str) -> Option<&EnemyDefinition> {
        self.definitions.get(enemy_type)
    }

    /// Load every `.ron` file in `dir`, keyed by file stem.
    ///
    /// Bad files are logged and skipped. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, EnemyDataError> {
        if !dir.exists() {
            return Err(EnemyDataError::FileNotFound(dir.display().to_string()));
        }
        let entries = fs::read_dir(dir).map_err(|e| EnemyDataError::ReadError {
            path: dir.display().to_string(),
            details: e.to_string(),
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "ron") {
                continue;
            }

            let enemy_type = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            match load_definition(&path) {
                Ok(definition) => {
                    info!("Loaded enemy definition: {} ({})", definition.name, enemy_type);
                    self.definitions.insert(enemy_type, definition);
                    loaded += 1;
                }
                Err(e) => error!("{}", e),
            }
        }
        Ok(loaded)
    }
}

/// Load all enemy definitions from the configured directory.
pub fn load_enemy_definitions(dir: Res<EnemyDataDir>, mut registry: ResMut<EnemyRegistry>) {
    match registry.load_dir(&dir.0) {
        Ok(count) => info!("Loaded {} enemy definitions", count),
        Err(e) => warn!("Enemy definitions unavailable: {}", e),
    }
}
