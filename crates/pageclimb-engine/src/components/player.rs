use glam::Vec3;
use crate::components::block::Block;

/// The cube avatar. Dimensions are fixed for the lifetime of a session;
/// only position, velocity and the grounded bookkeeping change.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left-low corner in world space (page pixels, z up).
    pub pos: Vec3,
    /// Velocity in pixels per second.
    pub vel: Vec3,
    /// Edge length of the cube.
    size: f32,
    /// A supporting surface was found at the player's feet this frame.
    pub is_grounded: bool,
    /// Top of the highest surface at or below the feet. Informational (shadow
    /// height); never fed back into collision.
    pub ground_z: f32,
}

impl Player {
    pub fn new(size: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            size,
            is_grounded: false,
            ground_z: 0.0,
        }
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Current extent as a block.
    pub fn bounds(&self) -> Block {
        Block::new(self.pos.x, self.pos.y, self.pos.z, self.size, self.size, self.size)
    }

    /// Stand the player on the center of `block`'s top face, at rest.
    pub fn place_on(&mut self, block: &Block) {
        self.pos = Vec3::new(
            block.x + (block.w - self.size) / 2.0,
            block.y + (block.h - self.size) / 2.0,
            block.top(),
        );
        self.vel = Vec3::ZERO;
        self.is_grounded = true;
        self.ground_z = block.top();
    }

    /// Height of the feet above the last supporting surface.
    pub fn height_above_ground(&self) -> f32 {
        (self.pos.z - self.ground_z).max(0.0)
    }
}
