//! Uniform grid over block footprints.
//!
//! Each cell lists the indices of every block whose footprint touches it, so
//! a neighborhood query only inspects a handful of cells instead of the whole
//! page. Height is not gridded. Results may contain blocks that do not truly
//! overlap the query (exact tests happen downstream) but never miss one that
//! does.

use std::collections::HashMap;
use crate::components::block::Block;

/// Default cell edge in page pixels.
pub const DEFAULT_CELL_SIZE: f32 = 128.0;

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Number of blocks indexed by the last rebuild.
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Drop everything and index `blocks` from scratch.
    pub fn rebuild(&mut self, blocks: &[Block]) {
        self.cells.clear();
        for (index, block) in blocks.iter().enumerate() {
            let (c0, r0, c1, r1) = self.cell_range(block);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    self.cells.entry((col, row)).or_default().push(index);
                }
            }
        }
        self.len = blocks.len();
    }

    /// Collect the indices of blocks near `region` grown by `margin`.
    ///
    /// `out` is cleared first and comes back sorted and de-duplicated; pass
    /// the same vector every frame to avoid reallocating.
    pub fn query(&self, region: &Block, margin: f32, out: &mut Vec<usize>) {
        out.clear();
        let (c0, r0, c1, r1) = self.cell_range(&region.expanded(margin));
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(indices) = self.cells.get(&(col, row)) {
                    out.extend_from_slice(indices);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
    }

    /// Empty the grid and give its memory back.
    pub fn clear(&mut self) {
        self.cells = HashMap::new();
        self.len = 0;
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of blocks indexed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inclusive `(col_start, row_start, col_end, row_end)` covered by a footprint.
    fn cell_range(&self, block: &Block) -> (i32, i32, i32, i32) {
        let cell = |v: f32| (v / self.cell_size).floor() as i32;
        (
            cell(block.x),
            cell(block.y),
            cell(block.right()),
            cell(block.bottom()),
        )
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
