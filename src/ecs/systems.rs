use specs::prelude::*;

use super::{
    components::{Motion, TurnFlags, Vitals},
    resources::{FrameTime, SettledMoves},
};

#[derive(Default)]
pub struct MoveAnimationSystem;

impl<'a> System<'a> for MoveAnimationSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Motion>,
        ReadStorage<'a, Vitals>,
        Write<'a, SettledMoves>,
    );

    fn run(&mut self, (entities, mut motions, vitals, mut settled): Self::SystemData) {
        settled.entities.clear();
        for (entity, motion, vital) in (&entities, &mut motions, &vitals).join() {
            if !vital.alive {
                continue;
            }
            if motion.step() {
                settled.entities.push(entity);
            }
        }
    }
}

#[derive(Default)]
pub struct ActionCooldownSystem;

impl<'a> System<'a> for ActionCooldownSystem {
    type SystemData = (Read<'a, FrameTime>, WriteStorage<'a, TurnFlags>);

    fn run(&mut self, (time, mut flags): Self::SystemData) {
        for flag in (&mut flags).join() {
            if let Some(ready_at) = flag.ready_at_ms {
                if time.now_ms >= ready_at {
                    flag.ready_at_ms = None;
                    flag.has_acted = false;
                }
            }
        }
    }
}
