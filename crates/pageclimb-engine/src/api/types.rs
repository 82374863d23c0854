use bytemuck::{Pod, Zeroable};

/// The player touched down after being airborne. `a` = landing height.
pub const EVENT_LANDED: f32 = 1.0;
/// A jump was injected. `a` = take-off height.
pub const EVENT_JUMPED: f32 = 2.0;
/// The player arrived on the goal (rising edge only). `a` = goal index.
pub const EVENT_GOAL_REACHED: f32 = 3.0;
/// The world was rebuilt. `a` = block count, `b` = start index, `c` = goal index.
pub const EVENT_RESCANNED: f32 = 4.0;

/// A game event communicated from Rust to JavaScript.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}
