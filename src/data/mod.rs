pub mod monsters;

use bracket_terminal::prelude::RGB;

use crate::config::PlayerConfig;

#[derive(Clone, Debug)]
pub struct PlayerTemplate {
    pub glyph: char,
    pub color: RGB,
    pub sprite_size: f32,
    pub max_health: i32,
    pub move_speed: f32,
}

impl PlayerTemplate {
    pub const SPRITE_SIZE: f32 = 40.0;

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            glyph: '@',
            color: RGB::from_u8(255, 85, 0),
            sprite_size: Self::SPRITE_SIZE,
            max_health: config.max_health,
            move_speed: config.move_speed,
        }
    }
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}
