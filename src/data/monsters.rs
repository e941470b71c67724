use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyStats {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub health: i32,
    pub damage: i32,
    pub move_speed: f32,
    pub detection_range: f32,
    pub score: u32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank];

    pub const SPRITE_SIZE: f32 = 30.0;

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats::new(
                "Goblin",
                'g',
                RGB::from_u8(231, 76, 60),
                3,
                1,
                3.0,
                10,
            ),
            EnemyKind::Fast => EnemyStats::new(
                "Rat",
                'r',
                RGB::from_u8(243, 156, 18),
                2,
                1,
                4.0,
                15,
            ),
            EnemyKind::Tank => EnemyStats::new(
                "Ogre",
                'O',
                RGB::from_u8(142, 68, 173),
                5,
                2,
                2.0,
                20,
            ),
        }
    }

    pub fn score_value(self) -> u32 {
        self.stats().score
    }

    pub fn random(rng: &mut RandomNumberGenerator) -> Self {
        Self::ALL[rng.range(0, Self::ALL.len() as i32) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
        }
    }
}

impl EnemyStats {
    pub const DEFAULT_DETECTION_RANGE: f32 = 5.0;

    fn new(
        name: &'static str,
        glyph: char,
        color: RGB,
        health: i32,
        damage: i32,
        move_speed: f32,
        score: u32,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            health,
            damage,
            move_speed,
            detection_range: Self::DEFAULT_DETECTION_RANGE,
            score,
        }
    }
}
