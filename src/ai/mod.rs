use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::debug;

use crate::{
    ecs::EcsWorld,
    map::{Direction, Grid},
    turn::TurnController,
};

const REST_CHANCE: i32 = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    Attack { facing: Direction },
    Pursue(Direction),
    Wander([Direction; 4]),
    Rest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnemyOutcome {
    Skipped,
    Attacked { damage: i32 },
    Moved(Direction),
    Blocked(Direction),
    Idle,
}

// Horizontal difference wins; vertical only when on the same column.
pub fn facing_toward(from: Point, to: Point) -> Direction {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx > 0 {
        Direction::Right
    } else if dx < 0 {
        Direction::Left
    } else if dy < 0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

// One step along the longer axis toward `to`; ties go horizontal.
pub fn pursuit_direction(from: Point, to: Point) -> Direction {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

pub fn in_melee_reach(a: Point, b: Point) -> bool {
    (a.x - b.x).abs().max((a.y - b.y).abs()) <= 1
}

fn shuffled_directions(rng: &mut RandomNumberGenerator) -> [Direction; 4] {
    let mut dirs = Direction::ALL;
    for i in (1..dirs.len()).rev() {
        let j = rng.range(0, i as i32 + 1) as usize;
        dirs.swap(i, j);
    }
    dirs
}

pub fn choose(
    position: Point,
    player: Point,
    detection_range: f32,
    rng: &mut RandomNumberGenerator,
) -> EnemyAction {
    if in_melee_reach(position, player) {
        return EnemyAction::Attack {
            facing: facing_toward(position, player),
        };
    }
    if DistanceAlg::Pythagoras.distance2d(position, player) <= detection_range {
        return EnemyAction::Pursue(pursuit_direction(position, player));
    }
    if rng.range(0, 100) < REST_CHANCE {
        EnemyAction::Rest
    } else {
        EnemyAction::Wander(shuffled_directions(rng))
    }
}

pub fn decide_action(
    world: &mut EcsWorld,
    enemy: Entity,
    grid: &Grid,
    turns: &TurnController,
    rng: &mut RandomNumberGenerator,
) -> EnemyOutcome {
    if !turns.enemies_may_act() || !world.is_alive(enemy) || world.has_acted(enemy) {
        return EnemyOutcome::Skipped;
    }
    let (Some(position), Some(stats)) = (world.point_of(enemy), world.enemy_stats(enemy)) else {
        return EnemyOutcome::Skipped;
    };
    let player = world.player_point();

    let outcome = match choose(position, player, stats.detection_range, rng) {
        EnemyAction::Attack { facing } => {
            world.set_facing(enemy, facing);
            EnemyOutcome::Attacked {
                damage: stats.damage,
            }
        }
        EnemyAction::Pursue(direction) => {
            world.set_facing(enemy, direction);
            if world.attempt_step(enemy, direction, grid) {
                EnemyOutcome::Moved(direction)
            } else {
                EnemyOutcome::Blocked(direction)
            }
        }
        EnemyAction::Wander(order) => order
            .into_iter()
            .find(|direction| world.attempt_step(enemy, *direction, grid))
            .map(|direction| {
                world.set_facing(enemy, direction);
                EnemyOutcome::Moved(direction)
            })
            .unwrap_or(EnemyOutcome::Idle),
        EnemyAction::Rest => EnemyOutcome::Idle,
    };

    world.mark_acted(enemy, None);
    debug!(name = stats.name, ?outcome, "enemy acted");
    outcome
}
