pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    elapsed_ms: u64,
}

impl FrameClock {
    pub const fn new() -> Self {
        Self { elapsed_ms: 0 }
    }

    pub fn advance(&mut self, delta_ms: u64) -> u64 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        self.elapsed_ms
    }
}

impl TimeSource for FrameClock {
    fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }
}
