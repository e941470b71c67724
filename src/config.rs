use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_ENV_VAR: &str = "GRIDCRAWL_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub generation: GenerationConstraints,
    pub spawning: SpawnConfig,
    pub player: PlayerConfig,
    pub turns: TurnConfig,
    pub level_clear_bonus: u32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            generation: GenerationConstraints::default(),
            spawning: SpawnConfig::default(),
            player: PlayerConfig::default(),
            turns: TurnConfig::default(),
            level_clear_bonus: Self::DEFAULT_LEVEL_CLEAR_BONUS,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 15,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConstraints {
    pub min_rooms: i32,
    pub max_rooms: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub max_attempts: u32,
    pub door_chance: f32,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            min_rooms: 5,
            max_rooms: 10,
            min_room_size: 3,
            max_room_size: 6,
            max_attempts: 100,
            door_chance: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub min_enemies: u32,
    pub max_enemies: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_enemies: 3,
            max_enemies: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: i32,
    pub damage: i32,
    pub attack_cooldown_ms: u64,
    pub move_cooldown_ms: u64,
    pub move_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            damage: 1,
            attack_cooldown_ms: 500,
            move_cooldown_ms: 200,
            move_speed: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    pub enemy_phase_delay_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            enemy_phase_delay_ms: 0,
            settle_delay_ms: 1000,
        }
    }
}

impl GameConfig {
    pub const DEFAULT_LEVEL_CLEAR_BONUS: u32 = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::new()),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        // A level needs a room and an enemy, or it can never be cleared.
        if generation.min_rooms < 1 || generation.min_rooms > generation.max_rooms {
            return Err(ConfigError::Invalid(format!(
                "room count range {}..={} must be non-empty and start at 1",
                generation.min_rooms, generation.max_rooms
            )));
        }
        if generation.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "room placement needs at least one attempt".to_string(),
            ));
        }
        if generation.min_room_size < 2 || generation.min_room_size > generation.max_room_size {
            return Err(ConfigError::Invalid(format!(
                "room size range {}..={} is empty",
                generation.min_room_size, generation.max_room_size
            )));
        }
        if !(0.0..=1.0).contains(&generation.door_chance) {
            return Err(ConfigError::Invalid(format!(
                "door chance {} is outside [0, 1]",
                generation.door_chance
            )));
        }
        // A room needs a one-cell border on every side.
        let smallest = generation.min_room_size + 2;
        if self.grid.width < smallest || self.grid.height < smallest {
            return Err(ConfigError::Invalid(format!(
                "grid {}x{} cannot hold a {}x{} room with a border",
                self.grid.width,
                self.grid.height,
                generation.min_room_size,
                generation.min_room_size
            )));
        }
        if self.spawning.min_enemies < 1 || self.spawning.min_enemies > self.spawning.max_enemies {
            return Err(ConfigError::Invalid(format!(
                "enemy count range {}..={} must be non-empty and start at 1",
                self.spawning.min_enemies, self.spawning.max_enemies
            )));
        }
        if self.player.max_health <= 0 || self.player.move_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "player health and move speed must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
