use bracket_geometry::prelude::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Camera {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn follow(&mut self, target: Point, grid_width: i32, grid_height: i32) {
        self.x = clamp_offset(target.x - self.width / 2, grid_width - self.width);
        self.y = clamp_offset(target.y - self.height / 2, grid_height - self.height);
    }

    pub fn world_to_screen(&self, point: Point) -> Point {
        Point::new(point.x - self.x, point.y - self.y)
    }

    pub fn is_visible(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

fn clamp_offset(offset: i32, max_offset: i32) -> i32 {
    offset.min(max_offset).max(0)
}
