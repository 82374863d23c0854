use crate::components::block::Block;

/// Spawn and destination, as indices into the block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartGoal {
    pub start: usize,
    pub goal: usize,
}

/// Pick the lowest block as start and the highest as goal.
///
/// Ties go to the lowest index, which keeps a real element ahead of the
/// ground block (always last). When start and goal would coincide and there
/// is more than one block, the goal becomes the highest block other than the
/// start, so a flat page still has somewhere to go. A single block is both.
pub fn select_start_goal(blocks: &[Block]) -> Option<StartGoal> {
    let start = extreme_index(blocks, None, |candidate, best| candidate < best)?;
    let mut goal = extreme_index(blocks, None, |candidate, best| candidate > best)?;
    if goal == start && blocks.len() > 1 {
        goal = extreme_index(blocks, Some(start), |candidate, best| candidate > best)?;
    }
    Some(StartGoal { start, goal })
}

/// First index whose z beats every earlier one under `better`, skipping `exclude`.
fn extreme_index(
    blocks: &[Block],
    exclude: Option<usize>,
    better: impl Fn(f32, f32) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, block) in blocks.iter().enumerate() {
        if Some(index) == exclude {
            continue;
        }
        match best {
            Some((_, z)) if !better(block.z, z) => {}
            _ => best = Some((index, block.z)),
        }
    }
    best.map(|(index, _)| index)
}
