//! Player kinematics against a static world of axis-aligned blocks.
//!
//! Each step integrates input and gravity over a real `dt`, then resolves
//! collisions one axis at a time: X, then Y, then Z. A block only blocks an
//! axis when the player already overlaps it on the other two, so flying past
//! a block's side never registers as hitting it.

use crate::api::config::PhysicsTuning;
use crate::components::block::Block;
use crate::components::player::Player;
use crate::core::grid::SpatialGrid;
use crate::core::time::clamp_dt;
use crate::input::keys::MoveIntent;

/// Slack for "feet at or above a top surface" comparisons.
const SURFACE_EPSILON: f32 = 1e-3;

/// What happened during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Airborne at the start of the step, grounded at the end.
    pub landed: bool,
    /// A jump was injected this step.
    pub jumped: bool,
    /// A horizontal move climbed onto a low block.
    pub stepped_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Steps the player. Holds the tuning constants and a scratch buffer for
/// neighbor queries so a frame does not allocate.
pub struct PlayerPhysics {
    tuning: PhysicsTuning,
    candidates: Vec<usize>,
}

impl PlayerPhysics {
    pub fn new(tuning: PhysicsTuning) -> Self {
        Self {
            tuning,
            candidates: Vec::with_capacity(64),
        }
    }

    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    /// Advance `player` by `dt` seconds (clamped to `max_dt`).
    ///
    /// `grid` must index `blocks`; stale indices are skipped.
    pub fn step(
        &mut self,
        player: &mut Player,
        intent: MoveIntent,
        dt: f32,
        blocks: &[Block],
        grid: &SpatialGrid,
    ) -> StepOutcome {
        let t = self.tuning;
        let dt = clamp_dt(dt, t.max_dt);
        let was_grounded = player.is_grounded;
        let mut outcome = StepOutcome::default();

        // Right and down win when opposite keys are both held.
        player.vel.x = if intent.right {
            t.move_speed
        } else if intent.left {
            -t.move_speed
        } else {
            0.0
        };
        player.vel.y = if intent.down {
            t.move_speed
        } else if intent.up {
            -t.move_speed
        } else {
            0.0
        };

        if intent.jump && player.is_grounded {
            player.vel.z = t.jump_velocity;
            player.is_grounded = false;
            outcome.jumped = true;
        }

        // Always applied; the landing check below is what keeps a resting
        // player on its surface.
        player.vel.z -= t.gravity * dt;

        grid.query(&player.bounds(), t.query_margin, &mut self.candidates);
        let candidates = &self.candidates;

        let dx = player.vel.x * dt;
        player.pos.x += dx;
        outcome.stepped_up |=
            resolve_horizontal(player, Axis::X, dx, candidates, blocks, t.step_height);

        let dy = player.vel.y * dt;
        player.pos.y += dy;
        outcome.stepped_up |=
            resolve_horizontal(player, Axis::Y, dy, candidates, blocks, t.step_height);

        let prev_z = player.pos.z;
        player.pos.z += player.vel.z * dt;
        resolve_vertical(player, prev_z, candidates, blocks);

        player.ground_z = support_height(player, candidates, blocks);

        // Safety net for a world without a usable ground block.
        if player.pos.z < 0.0 {
            player.pos.z = 0.0;
            player.vel.z = 0.0;
            player.is_grounded = true;
        }

        outcome.landed = player.is_grounded && !was_grounded;
        outcome
    }
}

/// Push the player out of blocks along X or Y, or climb them when the ledge
/// is low enough. Returns whether a climb happened.
///
/// `moved` is this step's displacement on `axis`. A moving player is pushed
/// back to the side it came from, so a wall thinner than one step's travel
/// still blocks. Only a player that did not move on this axis is pushed out
/// along the smaller penetration.
fn resolve_horizontal(
    player: &mut Player,
    axis: Axis,
    moved: f32,
    candidates: &[usize],
    blocks: &[Block],
    step_height: f32,
) -> bool {
    let mut stepped = false;
    for block in candidates.iter().filter_map(|&i| blocks.get(i)) {
        let p = player.bounds();
        let overlapping = match axis {
            Axis::X => p.overlaps_y(block) && p.overlaps_z(block) && p.overlaps_x(block),
            Axis::Y => p.overlaps_x(block) && p.overlaps_z(block) && p.overlaps_y(block),
        };
        if !overlapping {
            continue;
        }

        let rise = block.top() - p.z;
        if rise > 0.0 && rise <= step_height {
            player.pos.z = block.top();
            stepped = true;
            continue;
        }

        match axis {
            Axis::X => {
                let into_near_side = p.right() - block.x;
                let into_far_side = block.right() - p.x;
                player.pos.x = if push_to_near_side(moved, into_near_side, into_far_side) {
                    block.x - p.w
                } else {
                    block.right()
                };
                player.vel.x = 0.0;
            }
            Axis::Y => {
                let into_near_side = p.bottom() - block.y;
                let into_far_side = block.bottom() - p.y;
                player.pos.y = if push_to_near_side(moved, into_near_side, into_far_side) {
                    block.y - p.h
                } else {
                    block.bottom()
                };
                player.vel.y = 0.0;
            }
        }
    }
    stepped
}

/// Whether to resolve an overlap onto the block's low-coordinate side.
fn push_to_near_side(moved: f32, into_near_side: f32, into_far_side: f32) -> bool {
    if moved > 0.0 {
        true
    } else if moved < 0.0 {
        false
    } else {
        into_near_side < into_far_side
    }
}

/// Land on or bump against blocks after the vertical move. `prev_z` is the
/// feet height before the move.
fn resolve_vertical(player: &mut Player, prev_z: f32, candidates: &[usize], blocks: &[Block]) {
    player.is_grounded = false;
    for block in candidates.iter().filter_map(|&i| blocks.get(i)) {
        let p = player.bounds();
        if !p.overlaps_xy(block) {
            continue;
        }
        let top = block.top();

        // Feet crossed the top surface this step. Catches thin and
        // zero-thickness blocks that a fast fall would otherwise skip.
        if player.vel.z <= 0.0 && prev_z >= top - SURFACE_EPSILON && p.z <= top {
            player.pos.z = top;
            player.vel.z = 0.0;
            player.is_grounded = true;
            continue;
        }

        if !p.overlaps_z(block) {
            continue;
        }
        let from_below = p.top() - block.z;
        let from_above = top - p.z;
        if push_to_near_side(p.z - prev_z, from_below, from_above) {
            player.pos.z = block.z - p.d;
            player.vel.z = 0.0;
        } else {
            player.pos.z = top;
            player.vel.z = 0.0;
            player.is_grounded = true;
        }
    }
}

/// Highest top surface under the player's footprint that is not above the
/// feet. Falls back to the absolute floor.
fn support_height(player: &Player, candidates: &[usize], blocks: &[Block]) -> f32 {
    let p = player.bounds();
    candidates
        .iter()
        .filter_map(|&i| blocks.get(i))
        .filter(|b| p.overlaps_xy(b) && b.top() <= p.z + SURFACE_EPSILON)
        .map(|b| b.top())
        .fold(0.0, f32::max)
}
