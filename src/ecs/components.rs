use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::{
    data::monsters::EnemyKind,
    map::{Direction, pixel_origin},
};

#[derive(Clone, Debug, PartialEq)]
pub struct GridPosition {
    pub point: Point,
}

impl Component for GridPosition {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub speed: f32,
    pub size: f32,
    pub animating: bool,
}

impl Motion {
    pub fn settled_at(cell: Point, size: f32, speed: f32) -> Self {
        let (x, y) = pixel_origin(cell, size);
        Self {
            x,
            y,
            target_x: x,
            target_y: y,
            speed,
            size,
            animating: false,
        }
    }

    pub fn retarget(&mut self, cell: Point) {
        let (x, y) = pixel_origin(cell, self.size);
        self.target_x = x;
        self.target_y = y;
        self.animating = true;
    }

    pub fn snap_to(&mut self, cell: Point) {
        *self = Self::settled_at(cell, self.size, self.speed);
    }

    pub fn step(&mut self) -> bool {
        if !self.animating {
            return false;
        }
        let dx = self.target_x - self.x;
        let dy = self.target_y - self.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < self.speed {
            self.x = self.target_x;
            self.y = self.target_y;
            self.animating = false;
            return true;
        }
        self.x += dx / distance * self.speed;
        self.y += dy / distance * self.speed;
        false
    }
}

impl Component for Motion {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vitals {
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl Vitals {
    pub fn full(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
        }
    }
}

impl Component for Vitals {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Facing {
    pub direction: Direction,
}

impl Component for Facing {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnFlags {
    pub has_acted: bool,
    pub ready_at_ms: Option<u64>,
}

impl Component for TurnFlags {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub name: &'static str,
    pub damage: i32,
    pub detection_range: f32,
}

impl Component for Enemy {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct EnemyTag;

impl Component for EnemyTag {
    type Storage = NullStorage<Self>;
}
