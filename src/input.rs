use bracket_terminal::prelude::VirtualKeyCode;

use crate::map::Direction;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub attack: bool,
    pub pause: bool,
}

impl InputSnapshot {
    pub fn from_key(key: Option<VirtualKeyCode>) -> Self {
        let mut input = Self::default();
        let Some(key) = key else {
            return input;
        };
        match key {
            VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K => input.up = true,
            VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J => input.down = true,
            VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H => input.left = true,
            VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L => input.right = true,
            VirtualKeyCode::Space | VirtualKeyCode::F => input.attack = true,
            VirtualKeyCode::P | VirtualKeyCode::Escape => input.pause = true,
            _ => {}
        }
        input
    }

    pub fn direction(&self) -> Option<Direction> {
        [
            (self.up, Direction::Up),
            (self.down, Direction::Down),
            (self.left, Direction::Left),
            (self.right, Direction::Right),
        ]
        .into_iter()
        .find_map(|(held, direction)| held.then_some(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vi_keys_move_too() {
        assert_eq!(
            InputSnapshot::from_key(Some(VirtualKeyCode::H)).direction(),
            Some(Direction::Left)
        );
        assert_eq!(
            InputSnapshot::from_key(Some(VirtualKeyCode::J)).direction(),
            Some(Direction::Down)
        );
    }

    #[test]
    fn up_wins_when_several_are_held() {
        let input = InputSnapshot {
            up: true,
            right: true,
            ..InputSnapshot::default()
        };
        assert_eq!(input.direction(), Some(Direction::Up));
    }

    #[test]
    fn no_key_is_an_empty_snapshot() {
        assert_eq!(InputSnapshot::from_key(None), InputSnapshot::default());
        assert!(InputSnapshot::from_key(Some(VirtualKeyCode::Space)).attack);
    }
}
