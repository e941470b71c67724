use specs::prelude::Entity;

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTime {
    pub now_ms: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SettledMoves {
    pub entities: Vec<Entity>,
}

