use bytemuck::{Pod, Zeroable};
use crate::components::block::Block;
use crate::components::player::Player;
use crate::systems::goal::goal_reached;

/// Per-frame player state for the presentation layer.
/// Must match the TypeScript reader: 12 floats = 48 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PlayerFrame {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub h: f32,
    pub d: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    /// 1.0 when grounded.
    pub grounded: f32,
    /// Surface height under the player, for the drop shadow.
    pub ground_z: f32,
    /// 1.0 while standing on the goal.
    pub goal_reached: f32,
}

impl PlayerFrame {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn is_grounded(&self) -> bool {
        self.grounded != 0.0
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached != 0.0
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Flatten the player (and the goal check against `goal`, if any) into a frame.
pub fn build_player_frame(player: &Player, goal: Option<&Block>, tolerance: f32) -> PlayerFrame {
    let reached = goal.is_some_and(|g| goal_reached(player, g, tolerance));
    PlayerFrame {
        x: player.pos.x,
        y: player.pos.y,
        z: player.pos.z,
        w: player.size(),
        h: player.size(),
        d: player.size(),
        vx: player.vel.x,
        vy: player.vel.y,
        vz: player.vel.z,
        grounded: flag(player.is_grounded),
        ground_z: player.ground_z,
        goal_reached: flag(reached),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_frame_is_12_floats() {
        assert_eq!(std::mem::size_of::<PlayerFrame>(), 48);
        assert_eq!(PlayerFrame::STRIDE_BYTES, 48);
    }

    #[test]
    fn frame_mirrors_player_state() {
        let goal = Block::new(0.0, 0.0, 30.0, 100.0, 100.0, 10.0);
        let mut player = Player::new(20.0);
        player.place_on(&goal);

        let frame = build_player_frame(&player, Some(&goal), 4.0);
        assert_eq!(frame.x, 40.0);
        assert_eq!(frame.y, 40.0);
        assert_eq!(frame.z, 40.0);
        assert_eq!(frame.w, 20.0);
        assert!(frame.is_grounded());
        assert_eq!(frame.ground_z, 40.0);
        assert!(frame.is_goal_reached());

        let no_goal = build_player_frame(&player, None, 4.0);
        assert!(!no_goal.is_goal_reached());
    }

    #[test]
    fn frame_casts_to_float_slice() {
        let frame = PlayerFrame { z: 7.0, grounded: 1.0, ..Default::default() };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&frame));
        assert_eq!(floats.len(), PlayerFrame::FLOATS);
        assert_eq!(floats[2], 7.0);
        assert_eq!(floats[9], 1.0);
    }
}
