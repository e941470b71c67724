pub mod ai;
pub mod clock;
pub mod combat;
pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod input;
pub mod map;
pub mod render;
pub mod session;
pub mod turn;
