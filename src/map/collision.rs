use super::{CELL_SIZE, Grid};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn overlaps(&self, other: &Obstacle) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

pub trait ObstacleSink {
    fn replace_obstacles(&mut self, obstacles: Vec<Obstacle>);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution {
    pub x: f32,
    pub y: f32,
    pub collided: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CollisionIndex {
    obstacles: Vec<Obstacle>,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wall_obstacles(grid: &Grid) -> Vec<Obstacle> {
        grid.points()
            .filter(|point| grid.is_wall(*point))
            .map(|point| {
                Obstacle::new(
                    point.x as f32 * CELL_SIZE,
                    point.y as f32 * CELL_SIZE,
                    CELL_SIZE,
                    CELL_SIZE,
                )
            })
            .collect()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn collides(&self, object: &Obstacle) -> bool {
        self.obstacles.iter().any(|obstacle| object.overlaps(obstacle))
    }

    /// Tests the horizontal and vertical moves separately and keeps the old
    /// coordinate on whichever axis is blocked.
    pub fn resolve(&self, object: &Obstacle, new_x: f32, new_y: f32) -> Resolution {
        let horizontal = Obstacle {
            x: new_x,
            ..*object
        };
        let vertical = Obstacle {
            y: new_y,
            ..*object
        };
        let blocked_x = self.collides(&horizontal);
        let blocked_y = self.collides(&vertical);
        Resolution {
            x: if blocked_x { object.x } else { new_x },
            y: if blocked_y { object.y } else { new_y },
            collided: blocked_x || blocked_y,
        }
    }
}

impl ObstacleSink for CollisionIndex {
    fn replace_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Point;

    use super::*;
    use crate::map::CellKind;

    fn corridor_grid() -> Grid {
        let mut grid = Grid::filled(3, 3);
        grid.promote(Point::new(1, 1), CellKind::Floor);
        grid
    }

    #[test]
    fn every_wall_cell_becomes_one_obstacle() {
        let grid = corridor_grid();
        let obstacles = CollisionIndex::wall_obstacles(&grid);
        assert_eq!(obstacles.len(), 8);
        assert!(!obstacles.contains(&Obstacle::new(50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn replace_discards_previous_set() {
        let mut index = CollisionIndex::new();
        index.replace_obstacles(vec![Obstacle::new(0.0, 0.0, 10.0, 10.0); 3]);
        index.replace_obstacles(vec![Obstacle::new(5.0, 5.0, 1.0, 1.0)]);
        assert_eq!(index.obstacles().len(), 1);
    }

    #[test]
    fn sprite_inside_floor_cell_is_clear() {
        let mut index = CollisionIndex::new();
        index.replace_obstacles(CollisionIndex::wall_obstacles(&corridor_grid()));
        let sprite = Obstacle::new(55.0, 55.0, 40.0, 40.0);
        assert!(!index.collides(&sprite));
        let touching = Obstacle::new(50.0, 50.0, 50.0, 50.0);
        assert!(!index.collides(&touching));
        let spilling = Obstacle::new(45.0, 55.0, 40.0, 40.0);
        assert!(index.collides(&spilling));
    }

    #[test]
    fn resolve_blocks_only_the_colliding_axis() {
        let mut index = CollisionIndex::new();
        index.replace_obstacles(vec![Obstacle::new(100.0, 0.0, 50.0, 200.0)]);
        let object = Obstacle::new(60.0, 10.0, 30.0, 30.0);
        let resolution = index.resolve(&object, 80.0, 40.0);
        assert_eq!(resolution.x, 60.0);
        assert_eq!(resolution.y, 40.0);
        assert!(resolution.collided);

        let free = index.resolve(&object, 65.0, 20.0);
        assert_eq!((free.x, free.y, free.collided), (65.0, 20.0, false));
    }

    #[test]
    fn point_on_edge_counts_as_inside() {
        let rect = Obstacle::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(10.0, 0.0));
        assert!(!rect.contains_point(10.1, 5.0));
    }
}
