use std::fmt;

use crate::error::StateError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Menu => "MENU",
            GameState::Playing => "PLAYING",
            GameState::Paused => "PAUSED",
            GameState::GameOver => "GAME_OVER",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, StateError> {
        match name {
            "MENU" => Ok(GameState::Menu),
            "PLAYING" => Ok(GameState::Playing),
            "PAUSED" => Ok(GameState::Paused),
            "GAME_OVER" => Ok(GameState::GameOver),
            other => Err(StateError::UnknownGameState(other.to_string())),
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self { score: 0, level: 1 }
    }
}

impl Progress {
    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn next_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_and_unknowns_are_rejected() {
        assert_eq!(GameState::from_name("GAME_OVER"), Ok(GameState::GameOver));
        assert_eq!(GameState::Paused.to_string(), "PAUSED");
        assert_eq!(
            GameState::from_name("playing"),
            Err(StateError::UnknownGameState("playing".into()))
        );
    }

    #[test]
    fn progress_resets_to_level_one() {
        let mut progress = Progress::default();
        progress.add_score(15);
        progress.next_level();
        assert_eq!(progress, Progress { score: 15, level: 2 });
        progress.reset();
        assert_eq!(progress, Progress { score: 0, level: 1 });
    }
}
