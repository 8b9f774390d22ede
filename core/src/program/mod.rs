//! Sequence Store
//!
//! An immutable program of movement and loop blocks, with the execution
//! cursor and per-loop iteration bookkeeping that the interpreter drives.
//! All structural edits live here and keep the cursor consistent.

pub mod cache;
pub mod counter;
pub mod edits;
pub mod labels;
pub mod sequence;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::calculate_cached_loop_data;
pub use labels::{generate_loop_label, parse_loop_label, MAX_LOOP_LABEL_LENGTH, MAX_LOOP_NUMBER};
pub use sequence::ProgramSequence;
pub use types::{
    Block, BlockCache, LoopIterationsLeft, Program, ProgramBlock, LOOP_COMMAND,
    LOOP_ITERATIONS_RANGE,
};
