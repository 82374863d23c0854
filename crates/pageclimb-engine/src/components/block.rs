use bytemuck::{Pod, Zeroable};

/// Axis-aligned solid: a 2D page footprint lifted into a vertical slab.
///
/// `(x, y)` is the top-left of the footprint in page pixels, `z` the height of
/// the lower face above the ground plane, `(w, h)` the footprint size and `d`
/// the vertical thickness. Laid out as 6 floats so the block list can be
/// handed to JavaScript without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Block {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub h: f32,
    pub d: f32,
}

impl Block {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(x: f32, y: f32, z: f32, w: f32, h: f32, d: f32) -> Self {
        Self { x, y, z, w, h, d }
    }

    /// Height of the upper face.
    pub fn top(&self) -> f32 {
        self.z + self.d
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Footprint grown by `margin` on every side. Depth is untouched.
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2.0,
            h: self.h + margin * 2.0,
            ..*self
        }
    }

    // Strict interval tests: touching faces do not count as overlap, so a
    // player resting exactly on a top surface is not "inside" that block.

    pub fn overlaps_x(&self, other: &Block) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    pub fn overlaps_y(&self, other: &Block) -> bool {
        self.y < other.bottom() && self.bottom() > other.y
    }

    pub fn overlaps_z(&self, other: &Block) -> bool {
        self.z < other.top() && self.top() > other.z
    }

    /// Footprints intersect (z ignored).
    pub fn overlaps_xy(&self, other: &Block) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}
