pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::config::{PhysicsTuning, ScanConfig, SessionConfig};
pub use api::session::Session;
pub use api::types::{
    GameEvent, EVENT_GOAL_REACHED, EVENT_JUMPED, EVENT_LANDED, EVENT_RESCANNED,
};
pub use components::block::Block;
pub use components::player::Player;
pub use crate::core::grid::SpatialGrid;
pub use crate::core::physics::{PlayerPhysics, StepOutcome};
pub use crate::core::scanner::{
    scan_page, ElementSample, GeometrySource, PageSnapshot, Rect, ScanStats, Viewport,
};
pub use crate::core::selector::{select_start_goal, StartGoal};
pub use crate::core::time::FrameClock;
pub use input::keys::{Control, KeyState, MoveIntent};
pub use input::queue::{InputEvent, InputQueue};
pub use bridge::protocol::{FrameHeader, ProtocolLayout};
pub use systems::goal::goal_reached;
pub use systems::render::{build_player_frame, PlayerFrame};
