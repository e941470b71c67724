pub mod collision;
pub mod generator;

use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg};
use smallvec::SmallVec;

pub use collision::{CollisionIndex, Obstacle, ObstacleSink};
pub use generator::DungeonGenerator;

pub const CELL_SIZE: f32 = 50.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Floor,
    Door,
}

impl CellKind {
    fn rank(self) -> u8 {
        match self {
            CellKind::Wall => 0,
            CellKind::Floor => 1,
            CellKind::Door => 2,
        }
    }

    pub fn is_traversable(self) -> bool {
        !matches!(self, CellKind::Wall)
    }

    pub fn glyph(self) -> char {
        match self {
            CellKind::Wall => '#',
            CellKind::Floor => '.',
            CellKind::Door => '+',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ];

    pub fn delta(self) -> Point {
        match self {
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
            Direction::Right => Point::new(1, 0),
            Direction::Up => Point::new(0, -1),
        }
    }

    pub fn step_from(self, point: Point) -> Point {
        let delta = self.delta();
        Point::new(point.x + delta.x, point.y + delta.y)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub rect: Rect,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            rect: Rect::with_size(x, y, width, height),
        }
    }

    pub fn x(&self) -> i32 {
        self.rect.x1
    }

    pub fn y(&self) -> i32 {
        self.rect.y1
    }

    pub fn width(&self) -> i32 {
        self.rect.x2 - self.rect.x1
    }

    pub fn height(&self) -> i32 {
        self.rect.y2 - self.rect.y1
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x() + self.width() / 2,
            self.y() + self.height() / 2,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.rect.x1
            && point.x < self.rect.x2
            && point.y >= self.rect.y1
            && point.y < self.rect.y2
    }

    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (self.rect.y1..self.rect.y2)
            .flat_map(move |y| (self.rect.x1..self.rect.x2).map(move |x| Point::new(x, y)))
    }

    pub fn footprint(&self, margin: i32) -> Room {
        Room::new(
            self.x() - margin,
            self.y() - margin,
            self.width() + margin * 2,
            self.height() + margin * 2,
        )
    }

    pub fn overlaps(&self, other: &Room) -> bool {
        self.rect.x1 < other.rect.x2
            && self.rect.x2 > other.rect.x1
            && self.rect.y1 < other.rect.y2
            && self.rect.y2 > other.rect.y1
    }
}

/// Dungeon layout. Out-of-bounds coordinates read as Wall and are never
/// indexed.
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<CellKind>,
}

impl Grid {
    pub fn filled(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![CellKind::Wall; size],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell_kind(&self, point: Point) -> CellKind {
        self.idx(point)
            .map(|idx| self.cells[idx])
            .unwrap_or(CellKind::Wall)
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.cell_kind(point) == CellKind::Wall
    }

    pub fn is_door(&self, point: Point) -> bool {
        self.idx(point)
            .map(|idx| self.cells[idx] == CellKind::Door)
            .unwrap_or(false)
    }

    pub fn is_floor(&self, point: Point) -> bool {
        self.idx(point)
            .map(|idx| self.cells[idx] == CellKind::Floor)
            .unwrap_or(false)
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.cell_kind(point).is_traversable()
    }

    /// Raises a cell to `kind` if that is a promotion. Returns whether the
    /// cell changed; demotions and out-of-bounds writes are ignored.
    pub fn promote(&mut self, point: Point, kind: CellKind) -> bool {
        let Some(idx) = self.idx(point) else {
            return false;
        };
        if kind.rank() > self.cells[idx].rank() {
            self.cells[idx] = kind;
            true
        } else {
            false
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        self.points().filter(|p| self.is_walkable(*p)).collect()
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

impl BaseMap for Grid {
    fn is_opaque(&self, idx: usize) -> bool {
        self.cells.get(idx).is_none_or(|cell| *cell == CellKind::Wall)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dir in Direction::ALL {
            let dest = dir.step_from(point);
            if self.is_walkable(dest) {
                exits.push((self.point2d_to_index(dest), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Manhattan.distance2d(p1, p2)
    }
}

impl Algorithm2D for Grid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Grid::in_bounds(self, point)
    }
}

#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub start: Point,
}

pub fn pixel_origin(cell: Point, size: f32) -> (f32, f32) {
    let offset = (CELL_SIZE - size) / 2.0;
    (
        cell.x as f32 * CELL_SIZE + offset,
        cell.y as f32 * CELL_SIZE + offset,
    )
}
