//! Message types used across benchmarks.
//!
//! Sized to be representative of gameplay events.

use potion::Message;

/// Damage dealt to an entity (12 bytes).
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct Damage {
    pub target: u32,
    pub source: u32,
    pub amount: f32,
}

/// Contact between two bodies (32 bytes).
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct Collision {
    pub a: u32,
    pub b: u32,
    pub normal: [f32; 3],
    pub impulse: f32,
    pub point: [f32; 2],
}
