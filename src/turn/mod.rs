use std::fmt;

use tracing::{debug, warn};

use crate::{config::TurnConfig, error::StateError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnState {
    #[default]
    PlayerTurn,
    EnemyTurn,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::PlayerTurn => "PLAYER_TURN",
            TurnState::EnemyTurn => "ENEMY_TURN",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, StateError> {
        match name {
            "PLAYER_TURN" => Ok(TurnState::PlayerTurn),
            "ENEMY_TURN" => Ok(TurnState::EnemyTurn),
            other => Err(StateError::UnknownTurnState(other.to_string())),
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait TurnParticipants {
    fn reset_enemy_turns(&mut self);
    fn reset_player_turn(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TurnTask {
    BeginEnemyPhase,
    EndEnemyPhase,
}

#[derive(Copy, Clone, Debug)]
struct ScheduledTask {
    due_ms: u64,
    epoch: u64,
    task: TurnTask,
}

/// Alternates the player and enemy phases. Phase changes are deferred
/// tasks drained by [`TurnController::run_due`] once per tick, so nothing
/// here reads a real clock.
#[derive(Debug)]
pub struct TurnController {
    state: TurnState,
    queue: Vec<ScheduledTask>,
    epoch: u64,
    handoff_pending: bool,
    enemy_phase_delay_ms: u64,
    settle_delay_ms: u64,
}

impl TurnController {
    pub fn new(config: &TurnConfig) -> Self {
        Self {
            state: TurnState::PlayerTurn,
            queue: Vec::new(),
            epoch: 0,
            handoff_pending: false,
            enemy_phase_delay_ms: config.enemy_phase_delay_ms,
            settle_delay_ms: config.settle_delay_ms,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_player_turn(&self) -> bool {
        self.state == TurnState::PlayerTurn
    }

    pub fn is_enemy_turn(&self) -> bool {
        self.state == TurnState::EnemyTurn
    }

    pub fn handoff_pending(&self) -> bool {
        self.handoff_pending
    }

    pub fn player_may_act(&self) -> bool {
        self.is_player_turn() && !self.handoff_pending
    }

    pub fn enemies_may_act(&self) -> bool {
        self.is_enemy_turn()
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Hands the turn to the enemies. Ignored outside the player phase or
    /// when a hand-off is already queued.
    pub fn end_player_turn(&mut self, now_ms: u64) -> bool {
        if !self.player_may_act() {
            debug!(state = %self.state, "end of player turn ignored");
            return false;
        }
        self.handoff_pending = true;
        self.schedule(
            now_ms.saturating_add(self.enemy_phase_delay_ms),
            TurnTask::BeginEnemyPhase,
        );
        true
    }

    /// Runs every task due at `now_ms`, earliest first. Tasks from an older
    /// epoch or whose phase no longer matches are dropped.
    pub fn run_due(&mut self, now_ms: u64, participants: &mut dyn TurnParticipants) -> usize {
        let mut ran = 0;
        while let Some(idx) = self.next_due(now_ms) {
            let scheduled = self.queue.remove(idx);
            if scheduled.epoch != self.epoch {
                continue;
            }
            match scheduled.task {
                TurnTask::BeginEnemyPhase if self.state == TurnState::PlayerTurn => {
                    self.enter_enemy_phase(now_ms, participants);
                    ran += 1;
                }
                TurnTask::EndEnemyPhase if self.state == TurnState::EnemyTurn => {
                    self.enter_player_phase(participants);
                    ran += 1;
                }
                task => debug!(?task, state = %self.state, "stale turn task dropped"),
            }
        }
        ran
    }

    /// Forces a phase. Pending tasks are discarded and the entry actions of
    /// the requested phase run as if it had been reached normally.
    pub fn request_phase(
        &mut self,
        state: TurnState,
        now_ms: u64,
        participants: &mut dyn TurnParticipants,
    ) {
        if state == self.state && !self.handoff_pending {
            return;
        }
        self.drop_pending();
        match state {
            TurnState::PlayerTurn => self.enter_player_phase(participants),
            TurnState::EnemyTurn => self.enter_enemy_phase(now_ms, participants),
        }
    }

    pub fn request_phase_named(
        &mut self,
        name: &str,
        now_ms: u64,
        participants: &mut dyn TurnParticipants,
    ) -> Result<(), StateError> {
        let state = TurnState::from_name(name).inspect_err(|err| {
            warn!(%err, current = %self.state, "turn state request rejected");
        })?;
        self.request_phase(state, now_ms, participants);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.drop_pending();
        self.state = TurnState::PlayerTurn;
        debug!(epoch = self.epoch, "turn controller reset");
    }

    fn drop_pending(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.queue.clear();
        self.handoff_pending = false;
    }

    fn schedule(&mut self, due_ms: u64, task: TurnTask) {
        self.queue.push(ScheduledTask {
            due_ms,
            epoch: self.epoch,
            task,
        });
    }

    fn next_due(&self, now_ms: u64) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| scheduled.due_ms <= now_ms)
            .min_by_key(|(_, scheduled)| scheduled.due_ms)
            .map(|(idx, _)| idx)
    }

    fn enter_enemy_phase(&mut self, now_ms: u64, participants: &mut dyn TurnParticipants) {
        self.state = TurnState::EnemyTurn;
        self.handoff_pending = false;
        participants.reset_enemy_turns();
        self.schedule(
            now_ms.saturating_add(self.settle_delay_ms),
            TurnTask::EndEnemyPhase,
        );
        debug!(now_ms, "enemy phase begins");
    }

    fn enter_player_phase(&mut self, participants: &mut dyn TurnParticipants) {
        self.state = TurnState::PlayerTurn;
        self.handoff_pending = false;
        participants.reset_player_turn();
        debug!("player phase begins");
    }
}
