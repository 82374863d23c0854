use serde::{Deserialize, Serialize};

/// Movement and collision constants. Plain pixels and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Horizontal speed while a direction key is held (px/s).
    pub move_speed: f32,
    /// Upward velocity injected by a jump (px/s).
    pub jump_velocity: f32,
    /// Downward acceleration (px/s²).
    pub gravity: f32,
    /// Largest `dt` a single step integrates. Longer stalls are truncated so
    /// the player cannot tunnel through thin blocks after a hiccup.
    pub max_dt: f32,
    /// Tallest ledge climbed automatically during horizontal motion.
    pub step_height: f32,
    /// Edge length of the player cube.
    pub player_size: f32,
    /// Extra footprint margin around the player for neighbor queries.
    pub query_margin: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            move_speed: 300.0,
            jump_velocity: 350.0,
            gravity: 800.0,
            max_dt: 0.05,
            step_height: 20.0,
            player_size: 20.0,
            query_margin: 64.0,
        }
    }
}

/// What the world scanner keeps and how it sizes blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Elements narrower or shorter than this are skipped.
    pub min_element_size: f32,
    /// Elements further than this outside the viewport are skipped.
    pub viewport_margin: f32,
    /// Stacking-order values are clamped to this magnitude.
    pub max_stacking_order: f32,
    /// Vertical thickness given to every element block.
    pub block_depth: f32,
    /// Element blocks kept per scan, in document order. The ground block
    /// comes on top of this.
    pub max_elements: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_element_size: 8.0,
            viewport_margin: 400.0,
            max_stacking_order: 1000.0,
            block_depth: 16.0,
            max_elements: 4095,
        }
    }
}

/// Session configuration, usually handed over as JSON by the page script.
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub physics: PhysicsTuning,
    pub scan: ScanConfig,
    /// Spatial grid cell edge (px).
    pub cell_size: f32,
    /// How far above the goal's top face still counts as standing on it.
    pub goal_tolerance: f32,
    /// Period of the background rescan timer (ms).
    pub rescan_interval_ms: u32,
    /// Capacity of the block buffer exposed to JavaScript.
    pub max_blocks: usize,
    /// Maximum number of game events per frame.
    pub max_events: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            scan: ScanConfig::default(),
            cell_size: 128.0,
            goal_tolerance: 4.0,
            rescan_interval_ms: 1000,
            max_blocks: 4096,
            max_events: 32,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Scanner settings with the element cap tightened so the whole world,
    /// ground included, fits in `max_blocks`.
    pub fn bounded_scan(&self) -> ScanConfig {
        ScanConfig {
            max_elements: self.scan.max_elements.min(self.max_blocks.saturating_sub(1)),
            ..self.scan
        }
    }
}
