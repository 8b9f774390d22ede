//! Display cache computation
//!
//! Single linear pass over the program with a stack of open loops. Each frame
//! remembers where its `LoopStart` sits, so a block's position inside its
//! immediately enclosing loop is its distance from that start.

use super::types::{Block, BlockCache, ProgramBlock};

struct LoopFrame<'a> {
    label: &'a str,
    start_index: usize,
}

/// Recompute the cache of every block from scratch.
///
/// Existing cache values are discarded; blocks outside any loop (including
/// the brackets of top-level loops) end up with no cache.
pub fn calculate_cached_loop_data(program: &[ProgramBlock]) -> Vec<ProgramBlock> {
    let mut stack: Vec<LoopFrame> = Vec::new();
    let mut result = Vec::with_capacity(program.len());

    for (index, program_block) in program.iter().enumerate() {
        if let Block::LoopEnd { .. } = program_block.block {
            stack.pop();
        }

        let cache = stack.last().map(|frame| {
            BlockCache::new(frame.label, index - frame.start_index)
        });

        if let Block::LoopStart { label, .. } = &program_block.block {
            stack.push(LoopFrame {
                label,
                start_index: index,
            });
        }

        result.push(ProgramBlock {
            block: program_block.block.clone(),
            cache,
        });
    }

    result
}
