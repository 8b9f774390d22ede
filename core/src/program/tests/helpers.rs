//! Test helpers for Sequence Store tests
//!
//! Short constructors for blocks and sequences so the test tables stay readable

use crate::program::{Block, LoopIterationsLeft, ProgramBlock, ProgramSequence};

pub fn mv(command: &str) -> Block {
    Block::movement(command)
}

pub fn start(label: &str, iterations: u32) -> Block {
    Block::loop_start(label, iterations)
}

pub fn end(label: &str) -> Block {
    Block::loop_end(label)
}

/// Build a sequence the way the host would: cache recomputed, state as given
pub fn sequence(
    blocks: Vec<Block>,
    program_counter: usize,
    loop_counter: u32,
    loop_iterations_left: LoopIterationsLeft,
) -> ProgramSequence {
    let program = blocks.into_iter().map(ProgramBlock::new).collect();
    ProgramSequence::new(program, program_counter, loop_counter, loop_iterations_left)
}

/// The blocks of a sequence, without their cache
pub fn blocks_of(sequence: &ProgramSequence) -> Vec<Block> {
    sequence.blocks().cloned().collect()
}

/// Check that every bracket has exactly one partner and brackets never interleave
pub fn is_well_formed(sequence: &ProgramSequence) -> bool {
    let mut open: Vec<&str> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for block in sequence.blocks() {
        match block {
            Block::LoopStart { label, .. } => {
                if seen.contains(&label.as_str()) {
                    return false;
                }
                seen.push(label);
                open.push(label);
            }
            Block::LoopEnd { label } => {
                if open.pop() != Some(label.as_str()) {
                    return false;
                }
            }
            Block::Movement { .. } => {}
        }
    }
    open.is_empty()
}
