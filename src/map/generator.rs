use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, info};

use super::{CellKind, CollisionIndex, Grid, Level, ObstacleSink, Room};
use crate::config::GenerationConstraints;

fn corridor_path(start: Point, end: Point, horizontal_first: bool) -> Vec<Point> {
    let mut path = vec![start];
    let mut cursor = start;

    if horizontal_first {
        walk_x(&mut cursor, end.x, &mut path);
        walk_y(&mut cursor, end.y, &mut path);
    } else {
        walk_y(&mut cursor, end.y, &mut path);
        walk_x(&mut cursor, end.x, &mut path);
    }

    path
}

fn walk_x(cursor: &mut Point, target_x: i32, path: &mut Vec<Point>) {
    while cursor.x != target_x {
        cursor.x += if target_x > cursor.x { 1 } else { -1 };
        path.push(*cursor);
    }
}

fn walk_y(cursor: &mut Point, target_y: i32, path: &mut Vec<Point>) {
    while cursor.y != target_y {
        cursor.y += if target_y > cursor.y { 1 } else { -1 };
        path.push(*cursor);
    }
}

pub struct DungeonGenerator {
    rng: RandomNumberGenerator,
    constraints: GenerationConstraints,
}

impl DungeonGenerator {
    pub fn new(constraints: GenerationConstraints) -> Self {
        Self {
            rng: RandomNumberGenerator::new(),
            constraints,
        }
    }

    pub fn seeded(constraints: GenerationConstraints, seed: u64) -> Self {
        Self {
            rng: RandomNumberGenerator::seeded(seed),
            constraints,
        }
    }

    pub fn generate(&mut self, width: i32, height: i32, obstacles: &mut dyn ObstacleSink) -> Level {
        debug!(width, height, "generating dungeon");
        let mut grid = Grid::filled(width, height);
        let rooms = self.place_rooms(&mut grid);
        self.connect_rooms(&mut grid, &rooms);
        let doors = self.place_doors(&mut grid);
        let start = rooms
            .first()
            .map(|room| room.center())
            .unwrap_or_else(|| grid.center());

        obstacles.replace_obstacles(CollisionIndex::wall_obstacles(&grid));
        info!(
            rooms = rooms.len(),
            doors,
            start_x = start.x,
            start_y = start.y,
            "dungeon generated"
        );

        Level { grid, rooms, start }
    }

    fn place_rooms(&mut self, grid: &mut Grid) -> Vec<Room> {
        let c = self.constraints;
        let target = self.rng.range(c.min_rooms, c.max_rooms + 1);
        let mut rooms = Vec::new();

        for _ in 0..target {
            let placed = (0..c.max_attempts).find_map(|_| {
                let room_w = self.rng.range(c.min_room_size, c.max_room_size + 1);
                let room_h = self.rng.range(c.min_room_size, c.max_room_size + 1);
                // x in [1, width - room_w - 1] keeps a one-cell border.
                let x_end = grid.width - room_w;
                let y_end = grid.height - room_h;
                if x_end <= 1 || y_end <= 1 {
                    return None;
                }
                let candidate = Room::new(
                    self.rng.range(1, x_end),
                    self.rng.range(1, y_end),
                    room_w,
                    room_h,
                );
                can_place(grid, &candidate).then_some(candidate)
            });

            match placed {
                Some(room) => {
                    for cell in room.cells() {
                        grid.promote(cell, CellKind::Floor);
                    }
                    rooms.push(room);
                }
                None => debug!(
                    attempts = c.max_attempts,
                    "room placement exhausted its attempts"
                ),
            }
        }

        rooms
    }

    fn connect_rooms(&mut self, grid: &mut Grid, rooms: &[Room]) {
        let Some(first) = rooms.first() else {
            return;
        };
        let origin = first.center();
        let mut sorted = rooms.to_vec();
        // Stable, so equal distances keep placement order.
        sorted.sort_by_key(|room| {
            let center = room.center();
            let dx = center.x - origin.x;
            let dy = center.y - origin.y;
            dx * dx + dy * dy
        });

        for pair in sorted.windows(2) {
            let horizontal_first = self.rng.range(0, 2) == 0;
            for cell in corridor_path(pair[0].center(), pair[1].center(), horizontal_first) {
                grid.promote(cell, CellKind::Floor);
            }
        }
    }

    fn place_doors(&mut self, grid: &mut Grid) -> usize {
        let mut doors = 0;
        for y in 1..grid.height - 1 {
            for x in 1..grid.width - 1 {
                let point = Point::new(x, y);
                if !grid.is_floor(point) || !is_door_candidate(grid, point) {
                    continue;
                }
                let roll = self.rng.range(0, 100) as f32 / 100.0;
                if roll < self.constraints.door_chance && grid.promote(point, CellKind::Door) {
                    doors += 1;
                }
            }
        }
        doors
    }
}

// No Floor anywhere in the room grown by one cell.
fn can_place(grid: &Grid, room: &Room) -> bool {
    room.footprint(1).cells().all(|cell| !grid.is_floor(cell))
}

fn is_door_candidate(grid: &Grid, point: Point) -> bool {
    let (x, y) = (point.x, point.y);
    let wall = |px, py| grid.is_wall(Point::new(px, py));
    let floor = |px, py| grid.is_floor(Point::new(px, py));

    let horizontal = wall(x - 1, y) && wall(x + 1, y) && floor(x, y - 1) && floor(x, y + 1);
    let vertical = wall(x, y - 1) && wall(x, y + 1) && floor(x - 1, y) && floor(x + 1, y);
    horizontal || vertical
}
