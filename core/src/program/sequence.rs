//! Sequence store state and queries
//!
//! A `ProgramSequence` is an immutable value: every edit returns a new one.

use super::cache::calculate_cached_loop_data;
use super::types::{Block, LoopIterationsLeft, Program, ProgramBlock};

/* ===================== Sequence Store ===================== */

/// A program together with its execution cursor and loop bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramSequence {
    pub(super) program: Program,
    /// Index of the next block to run; equal to the length when past the end
    pub(super) program_counter: usize,
    /// Highest loop number handed out, used to label new loops
    pub(super) loop_counter: u32,
    pub(super) loop_iterations_left: LoopIterationsLeft,
}

impl ProgramSequence {
    /// Create a sequence, recomputing the display cache of `program`
    pub fn new(
        program: Program,
        program_counter: usize,
        loop_counter: u32,
        loop_iterations_left: LoopIterationsLeft,
    ) -> Self {
        Self {
            program: calculate_cached_loop_data(&program),
            program_counter,
            loop_counter,
            loop_iterations_left,
        }
    }

    /// Create a sequence from bare blocks, with counter 0 and nothing tracked
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>, loop_counter: u32) -> Self {
        let program = blocks.into_iter().map(ProgramBlock::new).collect();
        Self::new(program, 0, loop_counter, LoopIterationsLeft::new())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn program(&self) -> &[ProgramBlock] {
        &self.program
    }

    /// The blocks of the program without their cache
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.program.iter().map(|program_block| &program_block.block)
    }

    pub fn program_length(&self) -> usize {
        self.program.len()
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn loop_counter(&self) -> u32 {
        self.loop_counter
    }

    pub fn loop_iterations_left(&self) -> &LoopIterationsLeft {
        &self.loop_iterations_left
    }

    /// Remaining iterations of `label`, if the loop is tracked
    pub fn iterations_left(&self, label: &str) -> Option<u32> {
        self.loop_iterations_left.get(label).copied()
    }

    pub fn step_at(&self, index: usize) -> Option<&Block> {
        self.program.get(index).map(|program_block| &program_block.block)
    }

    pub fn current_step(&self) -> Option<&Block> {
        self.step_at(self.program_counter)
    }

    pub fn at_end(&self) -> bool {
        self.program_counter >= self.program.len()
    }

    /* ===================== Counter Updates ===================== */

    pub fn update_program_counter(&self, program_counter: usize) -> Self {
        Self {
            program_counter,
            ..self.clone()
        }
    }

    pub fn increment_program_counter(&self) -> Self {
        self.update_program_counter(self.program_counter + 1)
    }

    /* ===================== Queries ===================== */

    pub fn has_loop_block(&self) -> bool {
        self.blocks().any(Block::is_loop_block)
    }

    pub fn step_is_end_loop_block(&self, index: usize) -> bool {
        matches!(self.step_at(index), Some(Block::LoopEnd { .. }))
    }

    /// Index of the partner bracket of the loop block at `index`.
    ///
    /// Scans forward from a `LoopStart` or backward from a `LoopEnd` for the
    /// bracket carrying the same label. `None` for movements and out of range.
    pub fn matching_loop_block_index(&self, index: usize) -> Option<usize> {
        match self.step_at(index)? {
            Block::LoopStart { label, .. } => self.program[index + 1..]
                .iter()
                .position(|program_block| {
                    matches!(&program_block.block, Block::LoopEnd { label: end } if end == label)
                })
                .map(|offset| index + 1 + offset),
            Block::LoopEnd { label } => self.program[..index]
                .iter()
                .rposition(|program_block| {
                    matches!(&program_block.block, Block::LoopStart { label: start, .. } if start == label)
                }),
            Block::Movement { .. } => None,
        }
    }

    pub fn are_matching_loop_blocks(&self, first: usize, second: usize) -> bool {
        self.matching_loop_block_index(first) == Some(second)
    }

    /// `(start, end)` indices of the loop bracketed by the block at `index`
    pub fn loop_bounds(&self, index: usize) -> Option<(usize, usize)> {
        let partner = self.matching_loop_block_index(index)?;
        Some((index.min(partner), index.max(partner)))
    }

    /// True if the block at `index` is a loop bracket with nothing between
    /// its `LoopStart` and `LoopEnd`
    pub fn loop_body_is_empty(&self, index: usize) -> bool {
        matches!(self.loop_bounds(index), Some((start, end)) if start + 1 == end)
    }

    /// True if any block answers to `command`; "loop" matches either bracket
    pub fn uses_action(&self, command: &str) -> bool {
        self.blocks().any(|block| block.command_name() == command)
    }

    pub fn move_to_next_step_disabled(&self, index: usize) -> bool {
        let Some(block) = self.step_at(index) else {
            return true;
        };
        let last = if block.is_loop_block() {
            match self.loop_bounds(index) {
                Some((_, end)) => end,
                None => return true,
            }
        } else {
            index
        };
        last + 1 >= self.program.len()
    }

    pub fn move_to_previous_step_disabled(&self, index: usize) -> bool {
        let Some(block) = self.step_at(index) else {
            return true;
        };
        let first = if block.is_loop_block() {
            match self.loop_bounds(index) {
                Some((start, _)) => start,
                None => return true,
            }
        } else {
            index
        };
        first == 0
    }
}
