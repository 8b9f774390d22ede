//! Program counter advancement
//!
//! Resolves where execution continues once the current block completes,
//! unwinding or re-entering loops along the way.

use super::sequence::ProgramSequence;
use super::types::{Block, LoopIterationsLeft};

impl ProgramSequence {
    /// Compute the counter and iteration map after the current block completes.
    ///
    /// Landing on a `LoopEnd` consumes one iteration of that loop. If any
    /// remain, the counter jumps back to the matching `LoopStart` and every
    /// loop nested inside is reset to its configured count. Otherwise the
    /// counter moves past the `LoopEnd` and the check repeats, so loops that
    /// end at the same point unwind together.
    ///
    /// With `advance_past_empty_loop_entirely`, a loop with an empty body is
    /// treated as exhausted and skipped in one call. A counter already past
    /// the last block stays where it is.
    pub fn advance_program_counter(&self, advance_past_empty_loop_entirely: bool) -> Self {
        if self.at_end() {
            return self.clone();
        }

        let mut program_counter = self.program_counter;
        let mut loop_iterations_left = self.loop_iterations_left.clone();

        if !self.step_is_end_loop_block(program_counter) {
            program_counter += 1;
        }

        while let Some(Block::LoopEnd { label }) = self.step_at(program_counter) {
            let (Some(start), Some(current)) = (
                self.matching_loop_block_index(program_counter),
                loop_iterations_left.get(label).copied(),
            ) else {
                // Untracked loop: nothing to repeat.
                program_counter += 1;
                continue;
            };

            let remaining = if advance_past_empty_loop_entirely && start + 1 == program_counter {
                0
            } else {
                current.saturating_sub(1)
            };
            loop_iterations_left.insert(label.clone(), remaining);

            if remaining > 0 {
                for block in self.program[start + 1..program_counter].iter() {
                    if let Block::LoopStart { label, iterations } = &block.block {
                        loop_iterations_left.insert(label.clone(), *iterations);
                    }
                }
                program_counter = start;
                break;
            }

            program_counter += 1;
        }

        Self {
            program_counter,
            loop_iterations_left,
            ..self.clone()
        }
    }

    /// Rewind to the first block and arm every loop with its configured count.
    ///
    /// Iteration state left over from an earlier run is discarded.
    pub fn initiate_program_run(&self) -> Self {
        let loop_iterations_left: LoopIterationsLeft = self
            .blocks()
            .filter_map(|block| match block {
                Block::LoopStart { label, iterations } => Some((label.clone(), *iterations)),
                _ => None,
            })
            .collect();

        Self {
            program_counter: 0,
            loop_iterations_left,
            ..self.clone()
        }
    }
}
