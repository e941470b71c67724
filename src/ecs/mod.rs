pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};
use tracing::debug;

use crate::{
    data::{PlayerTemplate, monsters::EnemyKind},
    map::{Direction, Grid, Obstacle},
    turn::TurnParticipants,
};

use self::{
    components::{
        Enemy, EnemyTag, Facing, GridPosition, Motion, PlayerTag, Renderable, TurnFlags, Vitals,
    },
    resources::{FrameTime, SettledMoves},
    systems::{ActionCooldownSystem, MoveAnimationSystem},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Wounded { remaining: i32 },
    Killed,
    Ignored,
}

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
    enemies: Vec<Entity>,
}

impl EcsWorld {
    pub fn new(spawn: Point, template: &PlayerTemplate) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(FrameTime::default());
        specs_world.insert(SettledMoves::default());
        let player = Self::spawn_player(&mut specs_world, spawn, template);
        let dispatcher = DispatcherBuilder::new()
            .with(MoveAnimationSystem, "move_animation", &[])
            .with(ActionCooldownSystem, "action_cooldown", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
            enemies: Vec::new(),
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<GridPosition>();
        world.register::<Motion>();
        world.register::<Vitals>();
        world.register::<Facing>();
        world.register::<TurnFlags>();
        world.register::<Enemy>();
        world.register::<Renderable>();
        world.register::<PlayerTag>();
        world.register::<EnemyTag>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point, template: &PlayerTemplate) -> Entity {
        world
            .create_entity()
            .with(GridPosition { point: spawn })
            .with(Motion::settled_at(
                spawn,
                template.sprite_size,
                template.move_speed,
            ))
            .with(Vitals::full(template.max_health))
            .with(Facing::default())
            .with(TurnFlags::default())
            .with(Renderable {
                glyph: template.glyph as u16,
                color: template.color,
                order: 2,
            })
            .with(PlayerTag)
            .build()
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, point: Point, facing: Direction) -> Entity {
        let stats = kind.stats();
        let entity = self
            .specs_world
            .create_entity()
            .with(GridPosition { point })
            .with(Motion::settled_at(
                point,
                EnemyKind::SPRITE_SIZE,
                stats.move_speed,
            ))
            .with(Vitals::full(stats.health))
            .with(Facing { direction: facing })
            .with(TurnFlags::default())
            .with(Enemy {
                kind,
                name: stats.name,
                damage: stats.damage,
                detection_range: stats.detection_range,
            })
            .with(Renderable {
                glyph: stats.glyph as u16,
                color: stats.color,
                order: 1,
            })
            .with(EnemyTag)
            .build();
        self.enemies.push(entity);
        debug!(
            kind = kind.as_str(),
            x = point.x,
            y = point.y,
            "enemy spawned"
        );
        entity
    }

    pub fn clear_enemies(&mut self) {
        for entity in self.enemies.drain(..) {
            let _ = self.specs_world.delete_entity(entity);
        }
        self.specs_world.maintain();
    }

    pub fn place_player(&mut self, point: Point) {
        let player = self.player;
        if let Some(pos) = self.specs_world.write_storage::<GridPosition>().get_mut(player) {
            pos.point = point;
        }
        if let Some(motion) = self.specs_world.write_storage::<Motion>().get_mut(player) {
            motion.snap_to(point);
        }
        if let Some(flags) = self.specs_world.write_storage::<TurnFlags>().get_mut(player) {
            *flags = TurnFlags::default();
        }
    }

    pub fn revive_player(&mut self) {
        if let Some(vitals) = self.specs_world.write_storage::<Vitals>().get_mut(self.player) {
            *vitals = Vitals::full(vitals.max_health);
        }
        if let Some(facing) = self.specs_world.write_storage::<Facing>().get_mut(self.player) {
            *facing = Facing::default();
        }
    }

    pub fn advance(&mut self, now_ms: u64) -> Vec<Entity> {
        self.specs_world.insert(FrameTime { now_ms });
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
        self.specs_world.read_resource::<SettledMoves>().entities.clone()
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn point_of(&self, entity: Entity) -> Option<Point> {
        self.specs_world
            .read_storage::<GridPosition>()
            .get(entity)
            .map(|pos| pos.point)
    }

    pub fn player_point(&self) -> Point {
        self.point_of(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn vitals(&self, entity: Entity) -> Option<Vitals> {
        self.specs_world.read_storage::<Vitals>().get(entity).cloned()
    }

    pub fn player_vitals(&self) -> Vitals {
        self.vitals(self.player).unwrap_or(Vitals {
            health: 0,
            max_health: 0,
            alive: false,
        })
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.vitals(entity).is_some_and(|v| v.alive)
    }

    pub fn motion(&self, entity: Entity) -> Option<Motion> {
        self.specs_world.read_storage::<Motion>().get(entity).cloned()
    }

    pub fn is_animating(&self, entity: Entity) -> bool {
        self.motion(entity).is_some_and(|m| m.animating)
    }

    pub fn pixel_position(&self, entity: Entity) -> Option<(f32, f32)> {
        self.motion(entity).map(|m| (m.x, m.y))
    }

    pub fn sprite_box(&self, entity: Entity) -> Option<Obstacle> {
        self.motion(entity)
            .map(|m| Obstacle::new(m.x, m.y, m.size, m.size))
    }

    pub fn facing(&self, entity: Entity) -> Direction {
        self.specs_world
            .read_storage::<Facing>()
            .get(entity)
            .map(|f| f.direction)
            .unwrap_or_default()
    }

    pub fn set_facing(&mut self, entity: Entity, direction: Direction) {
        if let Some(facing) = self.specs_world.write_storage::<Facing>().get_mut(entity) {
            facing.direction = direction;
        }
    }

    pub fn has_acted(&self, entity: Entity) -> bool {
        self.specs_world
            .read_storage::<TurnFlags>()
            .get(entity)
            .is_some_and(|f| f.has_acted)
    }

    pub fn mark_acted(&mut self, entity: Entity, ready_at_ms: Option<u64>) {
        if let Some(flags) = self.specs_world.write_storage::<TurnFlags>().get_mut(entity) {
            flags.has_acted = true;
            flags.ready_at_ms = ready_at_ms;
        }
    }

    pub fn enemy_stats(&self, entity: Entity) -> Option<Enemy> {
        self.specs_world.read_storage::<Enemy>().get(entity).cloned()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| self.is_alive(**e)).count()
    }

    pub fn all_enemies_dead(&self) -> bool {
        !self.enemies.is_empty() && self.live_enemy_count() == 0
    }

    pub fn live_actor_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_storage::<GridPosition>();
        let vitals = self.specs_world.read_storage::<Vitals>();
        (&entities, &positions, &vitals)
            .join()
            .find(|(_, pos, vital)| vital.alive && pos.point == point)
            .map(|(entity, _, _)| entity)
    }

    pub fn live_enemy_at(&self, point: Point) -> Option<Entity> {
        self.enemies
            .iter()
            .copied()
            .find(|e| self.is_alive(*e) && self.point_of(*e) == Some(point))
    }

    pub fn is_blocked(&self, mover: Entity, target: Point, grid: &Grid) -> bool {
        if !grid.in_bounds(target) || grid.is_wall(target) {
            return true;
        }
        self.live_actor_at(target)
            .is_some_and(|occupant| occupant != mover)
    }

    /// Moves `entity` one cell in `direction` if nothing blocks it. The grid
    /// position changes at once; the sprite follows over later frames.
    pub fn attempt_step(&mut self, entity: Entity, direction: Direction, grid: &Grid) -> bool {
        if !self.is_alive(entity) || self.is_animating(entity) {
            return false;
        }
        let Some(current) = self.point_of(entity) else {
            return false;
        };
        let target = direction.step_from(current);
        if self.is_blocked(entity, target, grid) {
            debug!(
                x = target.x,
                y = target.y,
                direction = direction.as_str(),
                "step blocked"
            );
            return false;
        }

        if let Some(pos) = self.specs_world.write_storage::<GridPosition>().get_mut(entity) {
            pos.point = target;
        }
        if let Some(motion) = self.specs_world.write_storage::<Motion>().get_mut(entity) {
            motion.retarget(target);
        }
        true
    }

    /// Applies `amount` damage, flooring health at zero. Death happens once;
    /// later hits on a dead actor are ignored.
    pub fn take_damage(&mut self, entity: Entity, amount: i32) -> DamageOutcome {
        let mut vitals = self.specs_world.write_storage::<Vitals>();
        let Some(vital) = vitals.get_mut(entity) else {
            return DamageOutcome::Ignored;
        };
        if !vital.alive {
            return DamageOutcome::Ignored;
        }
        vital.health = (vital.health - amount.max(0)).max(0);
        if vital.health == 0 {
            vital.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                remaining: vital.health,
            }
        }
    }

    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(&Motion, &Renderable, Direction),
    {
        let motions = self.specs_world.read_storage::<Motion>();
        let renderables = self.specs_world.read_storage::<Renderable>();
        let vitals = self.specs_world.read_storage::<Vitals>();
        let facings = self.specs_world.read_storage::<Facing>();
        let mut visible: Vec<_> = (&motions, &renderables, &vitals, &facings)
            .join()
            .filter(|(_, _, vital, _)| vital.alive)
            .collect();
        visible.sort_by_key(|(_, renderable, _, _)| renderable.order);
        for (motion, renderable, _, facing) in visible {
            f(motion, renderable, facing.direction);
        }
    }
}

impl TurnParticipants for EcsWorld {
    fn reset_enemy_turns(&mut self) {
        let mut flags = self.specs_world.write_storage::<TurnFlags>();
        let vitals = self.specs_world.read_storage::<Vitals>();
        for entity in &self.enemies {
            if vitals.get(*entity).is_some_and(|v| v.alive) {
                if let Some(flag) = flags.get_mut(*entity) {
                    flag.has_acted = false;
                }
            }
        }
    }

    fn reset_player_turn(&mut self) {
        if let Some(flag) = self.specs_world.write_storage::<TurnFlags>().get_mut(self.player) {
            *flag = TurnFlags::default();
        }
    }
}
