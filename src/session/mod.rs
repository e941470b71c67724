pub mod spawn;
pub mod state;

use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::{debug, info, warn};

use crate::{
    ai::{self, EnemyOutcome},
    clock::{FrameClock, TimeSource},
    combat::{CombatEvent, CombatResolver},
    config::GameConfig,
    data::PlayerTemplate,
    ecs::EcsWorld,
    error::{ConfigError, StateError},
    input::InputSnapshot,
    map::{CollisionIndex, DungeonGenerator, Level},
    turn::TurnController,
};

pub use state::{GameState, Progress};

pub trait UiBinding {
    fn on_score_changed(&mut self, score: u32);
    fn on_health_changed(&mut self, current: i32, max: i32);
    fn on_game_over(&mut self);
    fn on_level_cleared(&mut self);
}

const MESSAGE_LIMIT: usize = 32;
const LEVEL_ATTEMPTS: u32 = 8;

pub struct GameSession {
    config: GameConfig,
    generator: DungeonGenerator,
    collision: CollisionIndex,
    level: Level,
    world: EcsWorld,
    combat: CombatResolver,
    turns: TurnController,
    clock: FrameClock,
    rng: RandomNumberGenerator,
    state: GameState,
    progress: Progress,
    messages: Vec<String>,
    reported_score: Option<u32>,
    reported_health: Option<(i32, i32)>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (mut generator, rng) = match config.seed {
            Some(seed) => (
                DungeonGenerator::seeded(config.generation, seed),
                RandomNumberGenerator::seeded(seed.wrapping_add(1)),
            ),
            None => (
                DungeonGenerator::new(config.generation),
                RandomNumberGenerator::new(),
            ),
        };
        let mut collision = CollisionIndex::new();
        let level = generator.generate(config.grid.width, config.grid.height, &mut collision);
        let world = EcsWorld::new(level.start, &PlayerTemplate::from_config(&config.player));

        Ok(Self {
            combat: CombatResolver::new(&config.player),
            turns: TurnController::new(&config.turns),
            config,
            generator,
            collision,
            level,
            world,
            clock: FrameClock::new(),
            rng,
            state: GameState::Menu,
            progress: Progress::default(),
            messages: Vec::new(),
            reported_score: None,
            reported_health: None,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn world(&self) -> &EcsWorld {
        &self.world
    }

    pub fn combat(&self) -> &CombatResolver {
        &self.combat
    }

    pub fn turns(&self) -> &TurnController {
        &self.turns
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn start(&mut self) -> bool {
        if !matches!(self.state, GameState::Menu | GameState::GameOver) {
            debug!(state = %self.state, "start ignored");
            return false;
        }
        self.begin_run();
        true
    }

    pub fn restart(&mut self) {
        self.begin_run();
    }

    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.state = GameState::Paused;
        info!("paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Playing;
        info!("resumed");
        true
    }

    pub fn set_state_named(&mut self, name: &str) -> Result<(), StateError> {
        let next = GameState::from_name(name).inspect_err(|err| {
            warn!(%err, current = %self.state, "game state request rejected");
        })?;
        debug!(from = %self.state, to = %next, "game state set");
        self.state = next;
        Ok(())
    }

    pub fn request_turn_named(&mut self, name: &str) -> Result<(), StateError> {
        let now = self.clock.now_ms();
        self.turns.request_phase_named(name, now, &mut self.world)
    }

    pub fn tick(&mut self, delta_ms: u64, input: &InputSnapshot, ui: &mut dyn UiBinding) {
        if self.state != GameState::Playing {
            return;
        }
        if input.pause {
            self.pause();
            return;
        }

        let now = self.clock.advance(delta_ms);
        self.turns.run_due(now, &mut self.world);
        self.combat.update_animations(delta_ms);
        self.update_player(now, input);
        self.update_enemies();
        let settled = self.world.advance(now);
        self.handle_settled(&settled, now);
        self.combat.check_combat_status(&self.world);
        self.flush_combat_events(ui);
        if self.state == GameState::Playing && self.world.all_enemies_dead() {
            self.clear_level(ui);
        }
        self.notify(ui);
    }

    fn begin_run(&mut self) {
        self.progress.reset();
        self.world.revive_player();
        self.messages.clear();
        self.load_level();
        self.state = GameState::Playing;
        self.reported_score = None;
        self.reported_health = None;
        info!(level = self.progress.level, "run started");
    }

    /// Fresh dungeon and enemies; the player keeps its health. A level with
    /// no enemy is rolled again, up to `LEVEL_ATTEMPTS` times.
    fn load_level(&mut self) {
        let mut spawned = 0;
        for attempt in 1..=LEVEL_ATTEMPTS {
            self.level = self.generator.generate(
                self.config.grid.width,
                self.config.grid.height,
                &mut self.collision,
            );
            self.world.clear_enemies();
            self.world.place_player(self.level.start);
            spawned = spawn::spawn_enemies(
                &mut self.world,
                &self.level,
                &self.config.spawning,
                &mut self.rng,
            );
            if spawned > 0 {
                break;
            }
            warn!(
                attempt,
                rooms = self.level.rooms.len(),
                "level has no enemies, regenerating"
            );
        }
        self.turns.reset();
        self.combat.reset();
        info!(
            level = self.progress.level,
            rooms = self.level.rooms.len(),
            enemies = spawned,
            "level loaded"
        );
    }

    fn update_player(&mut self, now: u64, input: &InputSnapshot) {
        if !self.turns.player_may_act() {
            return;
        }
        let player = self.world.player_entity();
        if !self.world.is_alive(player)
            || self.world.is_animating(player)
            || self.world.has_acted(player)
        {
            return;
        }

        if let Some(direction) = input.direction() {
            self.world.set_facing(player, direction);
            if self.world.attempt_step(player, direction, &self.level.grid) {
                self.world.mark_acted(player, None);
            }
        } else if input.attack {
            self.combat.player_attack(now, &mut self.world, &mut self.turns);
        }
    }

    fn update_enemies(&mut self) {
        if !self.turns.enemies_may_act() {
            return;
        }
        let order: Vec<Entity> = self.world.enemies().to_vec();
        for enemy in order {
            if !self.world.is_alive(self.world.player_entity()) {
                break;
            }
            let outcome = ai::decide_action(
                &mut self.world,
                enemy,
                &self.level.grid,
                &self.turns,
                &mut self.rng,
            );
            if let EnemyOutcome::Attacked { damage } = outcome {
                self.combat.resolve_enemy_attack(enemy, damage, &mut self.world);
            }
        }
    }

    fn handle_settled(&mut self, settled: &[Entity], now: u64) {
        let player = self.world.player_entity();
        for entity in settled {
            if let Some(sprite) = self.world.sprite_box(*entity) {
                if self.collision.collides(&sprite) {
                    warn!(x = sprite.x, y = sprite.y, "settled sprite overlaps a wall");
                }
            }
            if *entity == player {
                self.world
                    .mark_acted(player, Some(now + self.config.player.move_cooldown_ms));
                self.turns.end_player_turn(now);
            }
        }
    }

    fn flush_combat_events(&mut self, ui: &mut dyn UiBinding) {
        for event in self.combat.drain_events() {
            match &event {
                CombatEvent::Slain { score, .. } => {
                    self.progress.add_score(*score);
                }
                CombatEvent::PlayerSlain { .. } => {
                    if self.state != GameState::GameOver {
                        self.state = GameState::GameOver;
                        info!(score = self.progress.score, "game over");
                        ui.on_game_over();
                    }
                }
                CombatEvent::Hit { .. } | CombatEvent::EnemyStrike { .. } => {}
            }
            self.push_message(event.describe());
        }
    }

    fn clear_level(&mut self, ui: &mut dyn UiBinding) {
        let bonus = self.config.level_clear_bonus;
        self.progress.add_score(bonus);
        let level = self.progress.next_level();
        info!(level, bonus, "level cleared");
        self.push_message(format!("Level cleared! +{bonus}. Descending to level {level}"));
        ui.on_level_cleared();
        self.load_level();
    }

    fn notify(&mut self, ui: &mut dyn UiBinding) {
        if self.reported_score != Some(self.progress.score) {
            self.reported_score = Some(self.progress.score);
            ui.on_score_changed(self.progress.score);
        }
        let vitals = self.world.player_vitals();
        let health = (vitals.health, vitals.max_health);
        if self.reported_health != Some(health) {
            self.reported_health = Some(health);
            ui.on_health_changed(health.0, health.1);
        }
    }

    fn push_message(&mut self, message: String) {
        self.messages.insert(0, message);
        self.messages.truncate(MESSAGE_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Point;

    use super::*;
    use crate::{
        config::{GridConfig, SpawnConfig},
        data::monsters::EnemyKind,
        ecs::tests::open_grid,
        map::{Direction, Grid},
        turn::TurnState,
    };

    #[derive(Default)]
    struct RecordingUi {
        scores: Vec<u32>,
        healths: Vec<(i32, i32)>,
        game_overs: u32,
        clears: u32,
    }

    impl UiBinding for RecordingUi {
        fn on_score_changed(&mut self, score: u32) {
            self.scores.push(score);
        }

        fn on_health_changed(&mut self, current: i32, max: i32) {
            self.healths.push((current, max));
        }

        fn on_game_over(&mut self) {
            self.game_overs += 1;
        }

        fn on_level_cleared(&mut self) {
            self.clears += 1;
        }
    }

    const FRAME: u64 = 16;

    fn seeded_config() -> GameConfig {
        GameConfig {
            seed: Some(1234),
            ..GameConfig::default()
        }
    }

    fn started() -> GameSession {
        let mut session = GameSession::new(seeded_config()).unwrap();
        assert!(session.start());
        session
    }

    impl GameSession {
        fn install_arena(&mut self, grid: Grid, player: Point, enemies: &[(EnemyKind, Point)]) {
            self.level = Level {
                grid,
                rooms: Vec::new(),
                start: player,
            };
            self.world.clear_enemies();
            self.world.place_player(player);
            for (kind, point) in enemies {
                self.world.spawn_enemy(*kind, *point, Direction::Up);
            }
            self.turns.reset();
        }
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn press(direction: Direction) -> InputSnapshot {
        InputSnapshot {
            up: direction == Direction::Up,
            down: direction == Direction::Down,
            left: direction == Direction::Left,
            right: direction == Direction::Right,
            ..InputSnapshot::default()
        }
    }

    fn attack() -> InputSnapshot {
        InputSnapshot {
            attack: true,
            ..InputSnapshot::default()
        }
    }

    fn enemy_cells(session: &GameSession) -> Vec<Option<Point>> {
        let world = session.world();
        world.enemies().iter().map(|e| world.point_of(*e)).collect()
    }

    fn live_actor_cells(session: &GameSession) -> Vec<Point> {
        let world = session.world();
        let mut cells = vec![world.player_point()];
        cells.extend(
            world
                .enemies()
                .iter()
                .filter(|e| world.is_alive(**e))
                .filter_map(|e| world.point_of(*e)),
        );
        cells
    }

    // Plays a fixed input script, checking on every tick that no two live
    // actors share a cell and that nothing but the player moves or deals
    // damage while the player phase lasts. Returns the ticks that were
    // not spent wholly in the player phase.
    fn play_script(session: &mut GameSession, frames: usize) -> usize {
        let script = [
            press(Direction::Left),
            attack(),
            press(Direction::Up),
            idle(),
            press(Direction::Right),
            attack(),
            press(Direction::Down),
            idle(),
        ];
        let mut ui = RecordingUi::default();
        let mut other_ticks = 0;
        for frame in 0..frames {
            if session.state() != GameState::Playing {
                break;
            }
            let level = session.progress().level;
            let player_phase = session.turns().is_player_turn();
            let enemies_before = enemy_cells(session);
            let health_before = session.world().player_vitals().health;

            session.tick(FRAME, &script[(frame / 5) % script.len()], &mut ui);

            let cells = live_actor_cells(session);
            for (i, cell) in cells.iter().enumerate() {
                assert!(
                    !cells[i + 1..].contains(cell),
                    "frame {frame}: two live actors on {cell:?}"
                );
            }
            if session.progress().level != level {
                continue;
            }
            if player_phase && session.turns().is_player_turn() {
                assert_eq!(enemy_cells(session), enemies_before, "frame {frame}");
                assert_eq!(
                    session.world().player_vitals().health,
                    health_before,
                    "frame {frame}"
                );
            } else {
                other_ticks += 1;
            }
        }
        other_ticks
    }

    #[test]
    fn crowded_arena_keeps_cells_single_and_turns_exclusive() {
        let mut session = started();
        session.install_arena(
            open_grid(14, 12),
            Point::new(6, 6),
            &[
                (EnemyKind::Tank, Point::new(7, 7)),
                (EnemyKind::Basic, Point::new(9, 6)),
                (EnemyKind::Fast, Point::new(6, 9)),
                (EnemyKind::Basic, Point::new(2, 2)),
            ],
        );
        assert!(play_script(&mut session, 2000) > 0);
    }

    #[test]
    fn generated_levels_keep_cells_single_and_turns_exclusive() {
        for seed in 1..=4 {
            let mut session = GameSession::new(GameConfig {
                seed: Some(seed),
                ..GameConfig::default()
            })
            .unwrap();
            assert!(session.start());
            play_script(&mut session, 800);
        }
    }

    #[test]
    fn every_loaded_level_has_someone_to_fight() {
        let mut config = seeded_config();
        config.grid = GridConfig {
            width: 8,
            height: 8,
        };
        config.generation.min_rooms = 1;
        config.generation.max_rooms = 1;
        config.generation.min_room_size = 2;
        config.generation.max_room_size = 2;
        config.spawning = SpawnConfig {
            min_enemies: 1,
            max_enemies: 2,
        };
        let mut session = GameSession::new(config).unwrap();
        for _ in 0..20 {
            session.restart();
            assert!(session.world().live_enemy_count() > 0);
            assert!(!session.world().all_enemies_dead());
        }
    }

    #[test]
    fn menu_session_does_not_tick() {
        let mut session = GameSession::new(seeded_config()).unwrap();
        let mut ui = RecordingUi::default();
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.state(), GameState::Menu);
        assert_eq!(session.now_ms(), 0);
        assert!(ui.scores.is_empty());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = GameConfig::default();
        config.generation.min_rooms = 9;
        config.generation.max_rooms = 2;
        assert!(GameSession::new(config).is_err());
    }

    #[test]
    fn start_places_player_and_enemies_apart() {
        let session = started();
        let world = session.world();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(world.player_point(), session.level().start);
        let mut occupied = vec![world.player_point()];
        for enemy in world.enemies() {
            let point = world.point_of(*enemy).unwrap();
            assert!(session.level().grid.is_walkable(point));
            assert!(!occupied.contains(&point));
            occupied.push(point);
        }
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.tick(FRAME, &idle(), &mut ui);
        let pause = InputSnapshot {
            pause: true,
            ..InputSnapshot::default()
        };
        session.tick(FRAME, &pause, &mut ui);
        assert_eq!(session.state(), GameState::Paused);
        let frozen = session.now_ms();
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.now_ms(), frozen);
        assert!(!session.pause());
        assert!(session.resume());
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.now_ms(), frozen + FRAME);
    }

    #[test]
    fn lifecycle_guards() {
        let mut session = GameSession::new(seeded_config()).unwrap();
        assert!(!session.pause());
        assert!(!session.resume());
        assert!(session.start());
        assert!(!session.start());
        assert_eq!(
            session.set_state_named("LOADING"),
            Err(StateError::UnknownGameState("LOADING".into()))
        );
        assert_eq!(session.state(), GameState::Playing);
        session.set_state_named("GAME_OVER").unwrap();
        assert!(session.start());
    }

    #[test]
    fn a_settled_step_hands_the_turn_to_enemies_and_back() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(30, 30),
            Point::new(2, 2),
            &[(EnemyKind::Basic, Point::new(25, 25))],
        );
        let enemy = session.world().enemies()[0];

        session.tick(FRAME, &press(Direction::Right), &mut ui);
        assert_eq!(session.world().player_point(), Point::new(3, 2));
        assert!(session.turns().is_player_turn());

        // Input during the animation is ignored.
        session.tick(FRAME, &press(Direction::Down), &mut ui);
        assert_eq!(session.world().player_point(), Point::new(3, 2));

        let mut frames = 0;
        while session.turns().is_player_turn() {
            session.tick(FRAME, &idle(), &mut ui);
            frames += 1;
            assert!(frames < 30, "turn never handed off");
        }
        assert_eq!(session.turns().state(), TurnState::EnemyTurn);
        session.tick(FRAME, &idle(), &mut ui);
        assert!(session.world().has_acted(enemy));

        // The enemy phase holds for the settle delay.
        session.tick(FRAME, &press(Direction::Down), &mut ui);
        assert_eq!(session.world().player_point(), Point::new(3, 2));
        while session.turns().is_enemy_turn() {
            session.tick(FRAME, &idle(), &mut ui);
        }
        assert!(session.turns().player_may_act());
        assert!(!session.world().has_acted(session.world().player_entity()));
    }

    #[test]
    fn facing_turns_even_into_a_wall() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(10, 10),
            Point::new(1, 1),
            &[(EnemyKind::Tank, Point::new(8, 8))],
        );
        session.tick(FRAME, &press(Direction::Up), &mut ui);
        let player = session.world().player_entity();
        assert_eq!(session.world().facing(player), Direction::Up);
        assert_eq!(session.world().player_point(), Point::new(1, 1));
        assert!(session.turns().player_may_act());
    }

    #[test]
    fn adjacent_enemy_wounds_the_player_in_its_phase() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(10, 10),
            Point::new(4, 4),
            &[(EnemyKind::Tank, Point::new(5, 5))],
        );
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(ui.healths.last(), Some(&(100, 100)));

        session.request_turn_named("ENEMY_TURN").unwrap();
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.world().player_vitals().health, 98);
        assert_eq!(ui.healths.last(), Some(&(98, 100)));

        // Once per phase only.
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.world().player_vitals().health, 98);
        assert!(session.combat().in_combat());
    }

    #[test]
    fn killing_the_last_enemy_clears_the_level() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(10, 10),
            Point::new(5, 5),
            &[(EnemyKind::Fast, Point::new(5, 6))],
        );

        session.tick(FRAME, &attack(), &mut ui);
        assert_eq!(session.progress().score, 0);
        while !session.turns().player_may_act() {
            session.tick(FRAME, &idle(), &mut ui);
        }
        // The rat sits next to the player and fights back once.
        assert_eq!(session.world().player_vitals().health, 99);

        session.tick(FRAME, &attack(), &mut ui);
        assert_eq!(ui.clears, 1);
        assert_eq!(session.progress().level, 2);
        assert_eq!(session.progress().score, 15 + GameConfig::DEFAULT_LEVEL_CLEAR_BONUS);
        assert_eq!(ui.scores.last(), Some(&65));
        assert!(session.turns().player_may_act());
        assert_eq!(session.world().player_point(), session.level().start);
        assert_eq!(session.world().player_vitals().health, 99);
    }

    #[test]
    fn attack_input_is_ignored_during_enemy_phase() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(10, 10),
            Point::new(5, 5),
            &[(EnemyKind::Tank, Point::new(5, 6))],
        );
        let enemy = session.world().enemies()[0];
        session.request_turn_named("ENEMY_TURN").unwrap();
        session.tick(FRAME, &attack(), &mut ui);
        assert_eq!(session.world().vitals(enemy).map(|v| v.health), Some(5));
        assert!(session.request_turn_named("SOMEONE_ELSES_TURN").is_err());
        assert!(session.turns().is_enemy_turn());
    }

    #[test]
    fn player_death_ends_the_run_once() {
        let mut session = started();
        let mut ui = RecordingUi::default();
        session.install_arena(
            open_grid(10, 10),
            Point::new(5, 5),
            &[(EnemyKind::Tank, Point::new(5, 6))],
        );
        let player = session.world().player_entity();
        session.world.take_damage(player, 99);

        session.request_turn_named("ENEMY_TURN").unwrap();
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(ui.game_overs, 1);
        session.tick(FRAME, &idle(), &mut ui);
        assert_eq!(ui.game_overs, 1);

        session.restart();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.world().player_vitals().health, 100);
        assert_eq!(session.progress(), &Progress::default());
    }
}
