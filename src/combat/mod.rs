use bracket_pathfinding::prelude::DistanceAlg;
use specs::prelude::Entity;
use tracing::{debug, info};

use crate::{
    config::PlayerConfig,
    data::monsters::EnemyKind,
    ecs::{DamageOutcome, EcsWorld},
    turn::TurnController,
};

pub const ATTACK_ANIMATION_MS: u64 = 300;

pub const COMBAT_RADIUS: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct AttackAnimation {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub elapsed_ms: u64,
    pub duration_ms: u64,
}

impl AttackAnimation {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self {
            start,
            end,
            elapsed_ms: 0,
            duration_ms: ATTACK_ANIMATION_MS,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn head(&self) -> (f32, f32) {
        let t = self.progress();
        (
            self.start.0 + (self.end.0 - self.start.0) * t,
            self.start.1 + (self.end.1 - self.start.1) * t,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombatEvent {
    Hit {
        name: &'static str,
        damage: i32,
        remaining: i32,
    },
    Slain {
        kind: EnemyKind,
        name: &'static str,
        score: u32,
    },
    EnemyStrike {
        name: &'static str,
        damage: i32,
        remaining: i32,
    },
    PlayerSlain {
        by: &'static str,
    },
}

impl CombatEvent {
    pub fn describe(&self) -> String {
        match self {
            CombatEvent::Hit {
                name,
                damage,
                remaining,
            } => format!("You hit the {name} for {damage} ({remaining} left)"),
            CombatEvent::Slain { name, score, .. } => {
                format!("The {name} dies. +{score}")
            }
            CombatEvent::EnemyStrike { name, damage, .. } => {
                format!("The {name} hits you for {damage}")
            }
            CombatEvent::PlayerSlain { by } => format!("You were slain by a {by}"),
        }
    }
}

#[derive(Debug)]
pub struct CombatResolver {
    player_damage: i32,
    cooldown_ms: u64,
    last_attack_ms: Option<u64>,
    animations: Vec<AttackAnimation>,
    events: Vec<CombatEvent>,
    in_combat: bool,
}

impl CombatResolver {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            player_damage: config.damage,
            cooldown_ms: config.attack_cooldown_ms,
            last_attack_ms: None,
            animations: Vec::new(),
            events: Vec::new(),
            in_combat: false,
        }
    }

    pub fn cooldown_ready(&self, now_ms: u64) -> bool {
        self.last_attack_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.cooldown_ms)
    }

    /// Strikes the cell the player faces. Returns true only when an enemy
    /// was hit. Passing the cooldown gate restarts the cooldown even on a
    /// swing at nothing; only a hit ends the player's turn.
    pub fn player_attack(
        &mut self,
        now_ms: u64,
        world: &mut EcsWorld,
        turns: &mut TurnController,
    ) -> bool {
        let player = world.player_entity();
        if !turns.player_may_act() || !world.is_alive(player) {
            return false;
        }
        if !self.cooldown_ready(now_ms) {
            debug!(now_ms, "attack on cooldown");
            return false;
        }
        self.last_attack_ms = Some(now_ms);

        let target = world.facing(player).step_from(world.player_point());
        let Some(enemy) = world.live_enemy_at(target) else {
            debug!(x = target.x, y = target.y, "attack hit nothing");
            return false;
        };
        let Some(stats) = world.enemy_stats(enemy) else {
            return false;
        };

        if let (Some(start), Some(end)) = (world.pixel_position(player), world.pixel_position(enemy))
        {
            self.animations.push(AttackAnimation::new(start, end));
        }

        match world.take_damage(enemy, self.player_damage) {
            DamageOutcome::Wounded { remaining } => self.events.push(CombatEvent::Hit {
                name: stats.name,
                damage: self.player_damage,
                remaining,
            }),
            DamageOutcome::Killed => {
                let score = stats.kind.score_value();
                info!(name = stats.name, score, "enemy slain");
                self.events.push(CombatEvent::Slain {
                    kind: stats.kind,
                    name: stats.name,
                    score,
                });
            }
            DamageOutcome::Ignored => return false,
        }

        turns.end_player_turn(now_ms);
        true
    }

    pub fn resolve_enemy_attack(
        &mut self,
        enemy: Entity,
        damage: i32,
        world: &mut EcsWorld,
    ) -> DamageOutcome {
        let name = world.enemy_stats(enemy).map_or("foe", |stats| stats.name);
        let outcome = world.take_damage(world.player_entity(), damage);
        match outcome {
            DamageOutcome::Wounded { remaining } => self.events.push(CombatEvent::EnemyStrike {
                name,
                damage,
                remaining,
            }),
            DamageOutcome::Killed => {
                info!(by = name, "player slain");
                self.events.push(CombatEvent::EnemyStrike {
                    name,
                    damage,
                    remaining: 0,
                });
                self.events.push(CombatEvent::PlayerSlain { by: name });
            }
            DamageOutcome::Ignored => {}
        }
        outcome
    }

    pub fn update_animations(&mut self, delta_ms: u64) {
        for animation in &mut self.animations {
            animation.elapsed_ms = animation.elapsed_ms.saturating_add(delta_ms);
        }
        self.animations.retain(|animation| !animation.is_done());
    }

    pub fn animations(&self) -> &[AttackAnimation] {
        &self.animations
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn check_combat_status(&mut self, world: &EcsWorld) -> bool {
        let player = world.player_point();
        self.in_combat = world.enemies().iter().any(|enemy| {
            world.is_alive(*enemy)
                && world.point_of(*enemy).is_some_and(|point| {
                    DistanceAlg::Pythagoras.distance2d(point, player) <= COMBAT_RADIUS
                })
        });
        self.in_combat
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn reset(&mut self) {
        self.last_attack_ms = None;
        self.animations.clear();
        self.events.clear();
        self.in_combat = false;
    }
}
