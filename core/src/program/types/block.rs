//! Program block types

use serde::{Deserialize, Serialize};

/// Command name that stands for a loop when inserting or querying blocks.
///
/// A loop is two blocks in the program (`LoopStart` and `LoopEnd`), but the
/// editor treats it as a single command.
pub const LOOP_COMMAND: &str = "loop";

/// Accepted iteration counts of a loop
pub const LOOP_ITERATIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=99;

/// One instruction of a program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "camelCase")]
pub enum Block {
    /// A command executed by the registered handlers (e.g. "forward1")
    Movement { command: String },
    /// Opens the loop `label`, repeated `iterations` times
    LoopStart { label: String, iterations: u32 },
    /// Closes the loop `label`
    LoopEnd { label: String },
}

impl Block {
    pub fn movement(command: impl Into<String>) -> Self {
        Block::Movement {
            command: command.into(),
        }
    }

    pub fn loop_start(label: impl Into<String>, iterations: u32) -> Self {
        Block::LoopStart {
            label: label.into(),
            iterations,
        }
    }

    pub fn loop_end(label: impl Into<String>) -> Self {
        Block::LoopEnd {
            label: label.into(),
        }
    }

    pub fn is_loop_block(&self) -> bool {
        matches!(self, Block::LoopStart { .. } | Block::LoopEnd { .. })
    }

    /// Loop label for either bracket, `None` for movements
    pub fn loop_label(&self) -> Option<&str> {
        match self {
            Block::Movement { .. } => None,
            Block::LoopStart { label, .. } | Block::LoopEnd { label } => Some(label),
        }
    }

    /// Name this block answers to in `uses_action` queries
    pub fn command_name(&self) -> &str {
        match self {
            Block::Movement { command } => command,
            Block::LoopStart { .. } | Block::LoopEnd { .. } => LOOP_COMMAND,
        }
    }
}

/// Display data derived from the program structure.
///
/// Records the immediately enclosing loop of a block and the block's 1-based
/// position inside that loop body. Never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockCache {
    pub containing_loop_label: String,
    pub containing_loop_position: usize,
}

impl BlockCache {
    pub fn new(containing_loop_label: impl Into<String>, containing_loop_position: usize) -> Self {
        Self {
            containing_loop_label: containing_loop_label.into(),
            containing_loop_position,
        }
    }
}

/// A block as stored in a program, with its derived cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramBlock {
    #[serde(flatten)]
    pub block: Block,
    #[serde(skip)]
    pub cache: Option<BlockCache>,
}

impl ProgramBlock {
    pub fn new(block: Block) -> Self {
        Self { block, cache: None }
    }

    pub fn with_cache(block: Block, cache: BlockCache) -> Self {
        Self {
            block,
            cache: Some(cache),
        }
    }
}

impl From<Block> for ProgramBlock {
    fn from(block: Block) -> Self {
        ProgramBlock::new(block)
    }
}

/// An ordered sequence of blocks
pub type Program = Vec<ProgramBlock>;
