use crate::components::block::Block;
use crate::components::player::Player;

const BELOW_TOP_SLACK: f32 = 1e-3;

/// The player stands on (or hovers just above) the goal block.
///
/// Footprints must overlap and the feet must sit within `tolerance` above
/// the goal's top face. Passing by at another height does not count.
pub fn goal_reached(player: &Player, goal: &Block, tolerance: f32) -> bool {
    let p = player.bounds();
    if !p.overlaps_xy(goal) {
        return false;
    }
    let top = goal.top();
    p.z >= top - BELOW_TOP_SLACK && p.z <= top + tolerance
}
