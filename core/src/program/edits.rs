//! Structural edits
//!
//! Every edit returns a new sequence and keeps the program counter pointing
//! at the same logical step. Illegal arguments return an unchanged clone.

use super::labels::{generate_loop_label, MAX_LOOP_NUMBER};
use super::sequence::ProgramSequence;
use super::types::{Block, ProgramBlock, LOOP_COMMAND, LOOP_ITERATIONS_RANGE};

impl ProgramSequence {
    /// Insert `command` before `index`. "loop" inserts an empty loop pair.
    ///
    /// The counter shifts when `index <= program_counter`. A loop is refused
    /// once no two-letter label is left for it.
    pub fn insert_step(&self, index: usize, command: &str) -> Self {
        if index > self.program.len() {
            return self.clone();
        }

        let mut program = self.program.clone();
        let mut loop_counter = self.loop_counter;
        let mut loop_iterations_left = self.loop_iterations_left.clone();

        let inserted = if command == LOOP_COMMAND {
            let Some((number, label)) = self.next_loop_label() else {
                return self.clone();
            };
            loop_counter = number;
            loop_iterations_left.insert(label.clone(), 1);
            let [start, end] = new_loop_pair(&label);
            program.insert(index, end);
            program.insert(index, start);
            2
        } else {
            program.insert(index, ProgramBlock::new(Block::movement(command)));
            1
        };

        let program_counter = if index <= self.program_counter {
            self.program_counter + inserted
        } else {
            self.program_counter
        };

        Self::new(program, program_counter, loop_counter, loop_iterations_left)
    }

    /// Replace the movement at `index` with `command`.
    ///
    /// Replacing with "loop" grows the program by one block, shifting the
    /// counter only when `index < program_counter`. Loop brackets are never
    /// overwritten.
    pub fn overwrite_step(&self, index: usize, command: &str) -> Self {
        match self.step_at(index) {
            Some(Block::Movement { .. }) => {}
            _ => return self.clone(),
        }

        let mut program = self.program.clone();

        if command == LOOP_COMMAND {
            let Some((number, label)) = self.next_loop_label() else {
                return self.clone();
            };
            let mut loop_iterations_left = self.loop_iterations_left.clone();
            loop_iterations_left.insert(label.clone(), 1);
            let [start, end] = new_loop_pair(&label);
            program[index] = start;
            program.insert(index + 1, end);

            let program_counter = if index < self.program_counter {
                self.program_counter + 1
            } else {
                self.program_counter
            };
            Self::new(program, program_counter, number, loop_iterations_left)
        } else {
            program[index] = ProgramBlock::new(Block::movement(command));
            Self::new(
                program,
                self.program_counter,
                self.loop_counter,
                self.loop_iterations_left.clone(),
            )
        }
    }

    /// Delete the block at `index`; a loop bracket takes its partner with it.
    ///
    /// The loop body stays in place. Deleting the step under the counter (or
    /// its partner) first advances the counter past it.
    pub fn delete_step(&self, index: usize) -> Self {
        let Some(block) = self.step_at(index) else {
            return self.clone();
        };

        let partner = if block.is_loop_block() {
            self.matching_loop_block_index(index)
        } else {
            None
        };

        let advanced = if index == self.program_counter || partner == Some(self.program_counter) {
            self.advance_program_counter(true)
        } else {
            self.clone()
        };

        let removed: Vec<usize> = std::iter::once(index).chain(partner).collect();

        let program = self
            .program
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, program_block)| program_block.clone())
            .collect();

        let shift = removed
            .iter()
            .filter(|&&i| i < advanced.program_counter)
            .count();

        Self::new(
            program,
            advanced.program_counter - shift,
            self.loop_counter,
            advanced.loop_iterations_left,
        )
    }

    /// Move the block at `index` one place later.
    ///
    /// A loop bracket moves the whole loop; the block after the loop hops to
    /// before it.
    pub fn move_step_next(&self, index: usize) -> Self {
        if self.move_to_next_step_disabled(index) {
            return self.clone();
        }

        let mut program = self.program.clone();
        match self.loop_bounds(index) {
            Some((start, end)) => {
                let neighbor = program.remove(end + 1);
                program.insert(start, neighbor);
            }
            None => program.swap(index, index + 1),
        }

        Self::new(
            program,
            self.program_counter,
            self.loop_counter,
            self.loop_iterations_left.clone(),
        )
    }

    /// Move the block at `index` one place earlier.
    ///
    /// A loop bracket moves the whole loop; the block before the loop hops to
    /// after it.
    pub fn move_step_previous(&self, index: usize) -> Self {
        if self.move_to_previous_step_disabled(index) {
            return self.clone();
        }

        let mut program = self.program.clone();
        match self.loop_bounds(index) {
            Some((start, end)) => {
                let neighbor = program.remove(start - 1);
                program.insert(end, neighbor);
            }
            None => program.swap(index - 1, index),
        }

        Self::new(
            program,
            self.program_counter,
            self.loop_counter,
            self.loop_iterations_left.clone(),
        )
    }

    /// Set the configured iterations of the loop started at `index`.
    ///
    /// With `run_active` the remaining iterations restart at the new count,
    /// so the change takes effect in the current run. Counts outside
    /// `LOOP_ITERATIONS_RANGE` are ignored.
    pub fn change_loop_iterations(&self, index: usize, iterations: u32, run_active: bool) -> Self {
        if !LOOP_ITERATIONS_RANGE.contains(&iterations) {
            return self.clone();
        }
        let Some(Block::LoopStart { label, .. }) = self.step_at(index) else {
            return self.clone();
        };
        let label = label.clone();

        let mut program = self.program.clone();
        program[index].block = Block::LoopStart {
            label: label.clone(),
            iterations,
        };

        let mut loop_iterations_left = self.loop_iterations_left.clone();
        if run_active {
            loop_iterations_left.insert(label, iterations);
        }

        Self::new(
            program,
            self.program_counter,
            self.loop_counter,
            loop_iterations_left,
        )
    }

    /// Number and label for a new loop.
    ///
    /// Numbering restarts at 1 when the program holds no loops; labels
    /// already in use are skipped. `None` past `MAX_LOOP_NUMBER`.
    fn next_loop_label(&self) -> Option<(u32, String)> {
        let mut number = if self.has_loop_block() {
            self.loop_counter + 1
        } else {
            1
        };
        let mut label = generate_loop_label(number);
        while self.blocks().any(|block| block.loop_label() == Some(label.as_str())) {
            number += 1;
            label = generate_loop_label(number);
        }
        (number <= MAX_LOOP_NUMBER).then_some((number, label))
    }
}

fn new_loop_pair(label: &str) -> [ProgramBlock; 2] {
    [
        ProgramBlock::new(Block::loop_start(label, 1)),
        ProgramBlock::new(Block::loop_end(label)),
    ]
}
