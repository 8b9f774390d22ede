//! Type definitions for the sequence store
//!
//! - Blocks and their display cache
//! - Loop iteration bookkeeping

pub mod block;

use std::collections::HashMap;

pub use block::{Block, BlockCache, Program, ProgramBlock, LOOP_COMMAND, LOOP_ITERATIONS_RANGE};

/// Remaining iterations per loop label
pub type LoopIterationsLeft = HashMap<String, u32>;
