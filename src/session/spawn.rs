use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::debug;

use crate::{
    config::SpawnConfig,
    data::monsters::EnemyKind,
    ecs::EcsWorld,
    map::{Direction, Level, Room},
};

const SPAWN_TRIES: u32 = 20;

fn spawn_rooms(level: &Level) -> &[Room] {
    match level.rooms.len() {
        0 | 1 => &level.rooms,
        _ => &level.rooms[1..],
    }
}

pub fn spawn_enemies(
    world: &mut EcsWorld,
    level: &Level,
    config: &SpawnConfig,
    rng: &mut RandomNumberGenerator,
) -> usize {
    let rooms = spawn_rooms(level);
    if rooms.is_empty() {
        return 0;
    }
    let target = rng.range(config.min_enemies as i32, config.max_enemies as i32 + 1);
    let mut spawned = 0;

    for _ in 0..target {
        let Some(point) = pick_cell(world, level, rooms, rng) else {
            debug!("no free cell for enemy, spawn skipped");
            continue;
        };
        let kind = EnemyKind::random(rng);
        let facing = Direction::ALL[rng.range(0, Direction::ALL.len() as i32) as usize];
        world.spawn_enemy(kind, point, facing);
        spawned += 1;
    }
    spawned
}

fn pick_cell(
    world: &EcsWorld,
    level: &Level,
    rooms: &[Room],
    rng: &mut RandomNumberGenerator,
) -> Option<Point> {
    (0..SPAWN_TRIES).find_map(|_| {
        let room = rooms[rng.range(0, rooms.len() as i32) as usize];
        let point = Point::new(
            rng.range(room.x(), room.x() + room.width()),
            rng.range(room.y(), room.y() + room.height()),
        );
        let free = point != level.start
            && level.grid.is_walkable(point)
            && world.live_actor_at(point).is_none();
        free.then_some(point)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GenerationConstraints,
        data::PlayerTemplate,
        map::{CollisionIndex, DungeonGenerator},
    };

    fn level(seed: u64, rooms: i32) -> Level {
        let constraints = GenerationConstraints {
            min_rooms: rooms,
            max_rooms: rooms,
            ..GenerationConstraints::default()
        };
        DungeonGenerator::seeded(constraints, seed).generate(30, 20, &mut CollisionIndex::new())
    }

    #[test]
    fn enemies_avoid_the_start_room_and_each_other() {
        for seed in 0..20 {
            let level = level(seed, 4);
            let mut world = EcsWorld::new(level.start, &PlayerTemplate::default());
            let mut rng = RandomNumberGenerator::seeded(seed);
            let spawned = spawn_enemies(&mut world, &level, &SpawnConfig::default(), &mut rng);
            assert!(spawned <= 6);
            assert_eq!(world.enemies().len(), spawned);

            let mut seen = Vec::new();
            for enemy in world.enemies() {
                let point = world.point_of(*enemy).unwrap();
                assert!(level.grid.is_walkable(point));
                assert_ne!(point, level.start);
                if level.rooms.len() > 1 {
                    assert!(!level.rooms[0].contains(point));
                }
                assert!(!seen.contains(&point));
                seen.push(point);
            }
        }
    }

    #[test]
    fn single_room_still_spawns_off_the_start_cell() {
        let level = level(9, 1);
        assert_eq!(level.rooms.len(), 1);
        let mut world = EcsWorld::new(level.start, &PlayerTemplate::default());
        let mut rng = RandomNumberGenerator::seeded(9);
        let config = SpawnConfig {
            min_enemies: 2,
            max_enemies: 2,
        };
        assert_eq!(spawn_enemies(&mut world, &level, &config, &mut rng), 2);
        for enemy in world.enemies() {
            assert!(level.rooms[0].contains(world.point_of(*enemy).unwrap()));
        }
    }

    #[test]
    fn roomless_level_spawns_nothing() {
        let level = level(1, 0);
        let mut world = EcsWorld::new(level.start, &PlayerTemplate::default());
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(
            spawn_enemies(&mut world, &level, &SpawnConfig::default(), &mut rng),
            0
        );
    }
}
