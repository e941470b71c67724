pub mod camera;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    combat::CombatResolver,
    ecs::EcsWorld,
    map::{CELL_SIZE, CellKind, Grid},
    session::{GameSession, GameState, UiBinding},
};

pub use camera::Camera;

fn pixel_to_cell(x: f32, y: f32) -> Point {
    Point::new((x / CELL_SIZE).floor() as i32, (y / CELL_SIZE).floor() as i32)
}

fn health_color(health: i32, max_health: i32) -> RGB {
    let ratio = if max_health > 0 {
        health as f32 / max_health as f32
    } else {
        0.0
    };
    if ratio > 0.5 {
        RGB::named(GREEN)
    } else if ratio > 0.25 {
        RGB::named(YELLOW)
    } else {
        RGB::named(RED)
    }
}

#[derive(Clone, Debug, Default)]
pub struct HudPanel {
    pub score: u32,
    pub health: i32,
    pub max_health: i32,
    pub banner: Option<String>,
}

impl UiBinding for HudPanel {
    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
    }

    fn on_health_changed(&mut self, current: i32, max: i32) {
        self.health = current;
        self.max_health = max;
    }

    fn on_game_over(&mut self) {
        self.banner = Some("You have fallen.".to_string());
    }

    fn on_level_cleared(&mut self) {
        self.banner = Some("Level cleared!".to_string());
    }
}

impl HudPanel {
    pub fn draw(&self, ctx: &mut BTerm, session: &GameSession) {
        let (width, _) = ctx.get_char_size();
        ctx.draw_box(0, 0, width - 1, 5, RGB::named(GRAY), RGB::named(BLACK));

        let hp_color = health_color(self.health, self.max_health);
        ctx.print_color(
            2,
            1,
            hp_color,
            RGB::named(BLACK),
            format!("HP {}/{}", self.health, self.max_health),
        );
        ctx.draw_bar_horizontal(
            16,
            1,
            20,
            self.health.max(0),
            self.max_health.max(1),
            hp_color,
            RGB::named(BLACK),
        );
        ctx.print_color(
            40,
            1,
            RGB::named(YELLOW),
            RGB::named(BLACK),
            format!("Score {}  Level {}", self.score, session.progress().level),
        );

        let turns = session.turns();
        let (phase, phase_color) = if turns.is_player_turn() {
            ("Your turn", RGB::named(LIGHT_GREEN))
        } else {
            ("Enemy turn", RGB::from_u8(240, 128, 128))
        };
        ctx.print_color(2, 2, phase_color, RGB::named(BLACK), phase);
        if session.combat().in_combat() {
            ctx.print_color(16, 2, RGB::named(RED), RGB::named(BLACK), "IN COMBAT");
        }
        ctx.print_color(
            40,
            2,
            RGB::named(LIGHT_BLUE),
            RGB::named(BLACK),
            format!("Enemies left {}", session.world().live_enemy_count()),
        );
        if let Some(banner) = &self.banner {
            ctx.print_color(2, 3, RGB::named(WHITE), RGB::named(BLACK), banner);
        }
    }
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let height = (log.len() as i32).min(5) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(
        2,
        top + 1,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "Combat Log",
    );
    for (row, entry) in log.iter().take(5).enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}

fn map_cell_on_screen(camera: &Camera, map_origin: Point, cell: Point) -> Option<Point> {
    camera
        .is_visible(cell)
        .then(|| map_origin + camera.world_to_screen(cell))
}

pub fn draw_map(ctx: &mut BTerm, grid: &Grid, camera: &Camera, map_origin: Point) {
    for point in grid.points() {
        let Some(screen) = map_cell_on_screen(camera, map_origin, point) else {
            continue;
        };
        let kind = grid.cell_kind(point);
        let fg = match kind {
            CellKind::Wall => RGB::named(DARK_GRAY),
            CellKind::Floor => RGB::named(GRAY),
            CellKind::Door => RGB::from_u8(139, 90, 43),
        };
        ctx.set(
            screen.x,
            screen.y,
            fg,
            RGB::named(BLACK),
            to_cp437(kind.glyph()),
        );
    }
}

pub fn draw_actors(ctx: &mut BTerm, world: &EcsWorld, camera: &Camera, map_origin: Point) {
    world.each_renderable(|motion, renderable, _| {
        let centre = pixel_to_cell(motion.x + motion.size / 2.0, motion.y + motion.size / 2.0);
        if let Some(screen) = map_cell_on_screen(camera, map_origin, centre) {
            ctx.set(
                screen.x,
                screen.y,
                renderable.color,
                RGB::named(BLACK),
                renderable.glyph,
            );
        }
    });
}

pub fn draw_attacks(
    ctx: &mut BTerm,
    combat: &CombatResolver,
    camera: &Camera,
    map_origin: Point,
) {
    for animation in combat.animations() {
        let (x, y) = animation.head();
        let Some(screen) = map_cell_on_screen(camera, map_origin, pixel_to_cell(x, y)) else {
            continue;
        };
        ctx.set(
            screen.x,
            screen.y,
            RGB::named(WHITE),
            RGB::named(BLACK),
            to_cp437('*'),
        );
    }
}

pub fn draw_overlay(ctx: &mut BTerm, session: &GameSession) {
    let (title, hint) = match session.state() {
        GameState::Menu => ("GRIDCRAWL", "Press Enter to descend"),
        GameState::Paused => ("PAUSED", "Press P to resume"),
        GameState::GameOver => ("GAME OVER", "Press R to try again"),
        GameState::Playing => return,
    };
    ctx.print_color_centered(20, RGB::named(YELLOW), RGB::named(BLACK), title);
    ctx.print_color_centered(22, RGB::named(WHITE), RGB::named(BLACK), hint);
    if session.state() == GameState::GameOver {
        ctx.print_color_centered(
            24,
            RGB::named(GRAY),
            RGB::named(BLACK),
            format!(
                "Score {} on level {}",
                session.progress().score,
                session.progress().level
            ),
        );
    }
}
