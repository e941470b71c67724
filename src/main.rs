use std::path::PathBuf;

use anyhow::{Context, anyhow};
use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use gridcrawl::{
    config::GameConfig,
    input::InputSnapshot,
    render::{Camera, HudPanel, draw_actors, draw_attacks, draw_log, draw_map, draw_overlay},
    session::GameSession,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*};

const SCREEN_WIDTH: i32 = 80;
const SCREEN_HEIGHT: i32 = 50;
const MAP_ORIGIN_X: i32 = 2;
const MAP_ORIGIN_Y: i32 = 7;
const LOG_RESERVED_ROWS: i32 = 8;
const VIEW_WIDTH: i32 = SCREEN_WIDTH - 2 * MAP_ORIGIN_X;
const VIEW_HEIGHT: i32 = SCREEN_HEIGHT - MAP_ORIGIN_Y - LOG_RESERVED_ROWS;
const LOG_PANEL_START: i32 = SCREEN_HEIGHT - 7;
const LOG_DIR_ENV_VAR: &str = "GRIDCRAWL_LOG_DIR";

struct GridcrawlState {
    session: GameSession,
    hud: HudPanel,
    camera: Camera,
}

impl GameState for GridcrawlState {
    fn tick(&mut self, ctx: &mut BTerm) {
        let input = if self.handle_lifecycle_keys(ctx.key) {
            InputSnapshot::default()
        } else {
            InputSnapshot::from_key(ctx.key)
        };
        let delta_ms = ctx.frame_time_ms.max(0.0) as u64;
        self.session.tick(delta_ms, &input, &mut self.hud);
        let grid = &self.session.level().grid;
        self.camera
            .follow(self.session.world().player_point(), grid.width, grid.height);

        ctx.cls();
        self.draw_scene(ctx);
    }
}

impl GridcrawlState {
    fn new(config: GameConfig) -> anyhow::Result<Self> {
        let session = GameSession::new(config).context("failed to set up the session")?;
        Ok(Self {
            session,
            hud: HudPanel::default(),
            camera: Camera::new(VIEW_WIDTH, VIEW_HEIGHT),
        })
    }

    fn handle_lifecycle_keys(&mut self, key: Option<VirtualKeyCode>) -> bool {
        use gridcrawl::session::GameState as Phase;

        match (self.session.state(), key) {
            (Phase::Menu, Some(VirtualKeyCode::Return)) => {
                self.hud.banner = None;
                self.session.start()
            }
            (Phase::GameOver, Some(VirtualKeyCode::R)) => {
                self.hud.banner = None;
                self.session.restart();
                true
            }
            (Phase::Paused, Some(VirtualKeyCode::P | VirtualKeyCode::Escape)) => {
                self.session.resume()
            }
            _ => false,
        }
    }

    fn draw_scene(&self, ctx: &mut BTerm) {
        let origin = Point::new(MAP_ORIGIN_X, MAP_ORIGIN_Y);
        self.hud.draw(ctx, &self.session);
        draw_map(ctx, &self.session.level().grid, &self.camera, origin);
        draw_actors(ctx, self.session.world(), &self.camera, origin);
        draw_attacks(ctx, self.session.combat(), &self.camera, origin);
        draw_log(ctx, self.session.messages(), LOG_PANEL_START);
        draw_overlay(ctx, &self.session);
    }
}

/// Logs go to a file; the terminal belongs to the game.
fn init_tracing() -> anyhow::Result<WorkerGuard> {
    let log_dir = std::env::var_os(LOG_DIR_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("logs"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "gridcrawl.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let _guard = init_tracing()?;
    let config = GameConfig::from_env().context("failed to load configuration")?;
    tracing::info!(
        width = config.grid.width,
        height = config.grid.height,
        seed = ?config.seed,
        "starting gridcrawl"
    );

    let context = BTermBuilder::simple80x50()
        .with_title("Gridcrawl")
        .build()
        .map_err(|err| anyhow!(err))?;
    let game_state = GridcrawlState::new(config)?;
    main_loop(context, game_state).map_err(|err| anyhow!(err))
}
